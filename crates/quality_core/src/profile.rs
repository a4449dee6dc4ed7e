//! Profiling jobs.
//!
//! A [`Profile`] is one run of metric collection for a table. It is created
//! by the caller, moved through its [`JobStatus`] lifecycle by the engine and
//! carries the total record count found by the statistics stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a profile or audit job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Created,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Created => "created",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One metric-collection run for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,

    /// Table being profiled
    pub urn: String,

    /// Row filter applied to the measurement (SQL expression)
    #[serde(default)]
    pub filter: String,

    /// Expression used to group rows (e.g. a partition column)
    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub status: JobStatus,

    /// Latest human-readable progress or failure message
    #[serde(default)]
    pub message: String,

    /// Number of records found by the statistics stage
    #[serde(default)]
    pub total_records: u64,

    /// Logical time of the data being profiled
    pub event_timestamp: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a new profile for a table.
    pub fn new(urn: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            urn: urn.into(),
            filter: String::new(),
            group: String::new(),
            status: JobStatus::Created,
            message: String::new(),
            total_records: 0,
            event_timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the row filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the grouping expression.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Sets the event timestamp.
    pub fn with_event_timestamp(mut self, event_timestamp: DateTime<Utc>) -> Self {
        self.event_timestamp = event_timestamp;
        self
    }

    /// Moves the profile to a new status with a progress message.
    pub fn transition(&mut self, status: JobStatus, message: impl Into<String>) {
        self.status = status;
        self.message = message.into();
        self.updated_at = Utc::now();
    }
}

/// Measurement request handed to the table and field delegates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub urn: String,
    pub filter: String,
    pub group: String,
}

impl From<&Profile> for Entry {
    fn from(profile: &Profile) -> Self {
        Self {
            urn: profile.urn.clone(),
            filter: profile.filter.clone(),
            group: profile.group.clone(),
        }
    }
}

/// Output of the statistics stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStatistics {
    pub total_records: u64,
}

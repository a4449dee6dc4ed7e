//! Audit jobs and their results.

use crate::{JobStatus, Metadata, Metric, MetricType, Profile, ToleranceRule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quality metric annotated with the outcome of its tolerance rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedMetric {
    pub metric: Metric,
    pub tolerance_rules: Vec<ToleranceRule>,
    pub pass_flag: bool,
}

/// One audited metric of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub audit_id: String,
    pub group_value: String,
    pub table_urn: String,
    pub field_id: String,
    pub metric_name: MetricType,
    pub metric_value: f64,
    pub condition: String,
    pub metadata: Metadata,
    pub tolerance_rules: Vec<ToleranceRule>,
    pub pass_flag: bool,

    /// Timestamp of the audit run, shared by every report of the run
    pub event_timestamp: DateTime<Utc>,
}

impl AuditReport {
    /// Builds the report of a validated metric within an audit run.
    pub fn from_validated(audit: &Audit, validated: ValidatedMetric) -> Self {
        let ValidatedMetric {
            metric,
            tolerance_rules,
            pass_flag,
        } = validated;

        Self {
            audit_id: audit.id.clone(),
            group_value: metric.group_value,
            table_urn: audit.urn.clone(),
            field_id: metric.field_id,
            metric_name: metric.metric_type,
            metric_value: metric.value,
            condition: metric.condition,
            metadata: metric.metadata,
            tolerance_rules,
            pass_flag,
            event_timestamp: audit.event_timestamp,
        }
    }
}

/// Pass/fail reduction of a set of audit reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub is_pass: bool,
    pub message: String,
}

impl AuditSummary {
    pub fn new(is_pass: bool, message: impl Into<String>) -> Self {
        Self {
            is_pass,
            message: message.into(),
        }
    }
}

/// One audit run over the metrics of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: String,
    pub profile_id: String,
    pub urn: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total_records: u64,

    /// Timestamp stamped onto every report of this run
    pub event_timestamp: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    /// Creates an audit of a profile, timestamped now.
    pub fn new(profile: &Profile) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id: profile.id.clone(),
            urn: profile.urn.clone(),
            status: JobStatus::Created,
            message: String::new(),
            total_records: profile.total_records,
            event_timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the event timestamp.
    pub fn with_event_timestamp(mut self, event_timestamp: DateTime<Utc>) -> Self {
        self.event_timestamp = event_timestamp;
        self
    }

    /// Moves the audit to a new status with a message.
    pub fn transition(&mut self, status: JobStatus, message: impl Into<String>) {
        self.status = status;
        self.message = message.into();
        self.updated_at = Utc::now();
    }
}

/// Everything an audit run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub audit: Audit,
    pub reports: Vec<AuditReport>,
    pub summary: AuditSummary,
}

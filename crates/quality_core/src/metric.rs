//! Metric types and metric specifications.
//!
//! A [`Metric`] is a single measured value, either a raw *basic* count taken
//! from the data source or a *quality* ratio derived from those counts. A
//! [`MetricSpec`] describes a metric that still has to be produced.

use crate::QualityError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque key/value metadata attached to metrics, specs and tolerances.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key holding the unique-field list of a duplication check.
pub const UNIQUE_FIELDS_KEY: &str = "unique_fields";

/// Kind of measurement a metric carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricType {
    /// Percentage of null values of a field
    #[serde(rename = "nullness_pct")]
    NullnessPct,
    /// Percentage of duplicated rows of a table
    #[serde(rename = "duplication_pct")]
    DuplicationPct,
    /// Percentage of rows matching an invalidity condition
    #[serde(rename = "invalid_pct")]
    InvalidPct,
    /// Number of rows of a table
    #[serde(rename = "row_count")]
    RowCount,
    /// Percentage of inconsistent values across partitions
    #[serde(rename = "trend_inconsistency_pct")]
    TrendInconsistencyPct,
    /// Number of null values
    #[serde(rename = "nullcount")]
    NullCount,
    /// Number of rows
    #[serde(rename = "count")]
    Count,
    /// Number of distinct rows (or distinct unique-field combinations)
    #[serde(rename = "uniquecount")]
    UniqueCount,
    /// Sum of a numeric field
    #[serde(rename = "sum")]
    Sum,
    /// Number of rows matching an invalidity condition
    #[serde(rename = "invalidcount")]
    InvalidCount,
}

impl MetricType {
    /// Every metric type, in declaration order.
    pub const ALL: [MetricType; 10] = [
        MetricType::NullnessPct,
        MetricType::DuplicationPct,
        MetricType::InvalidPct,
        MetricType::RowCount,
        MetricType::TrendInconsistencyPct,
        MetricType::NullCount,
        MetricType::Count,
        MetricType::UniqueCount,
        MetricType::Sum,
        MetricType::InvalidCount,
    ];

    /// Returns the wire name of the metric type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::NullnessPct => "nullness_pct",
            MetricType::DuplicationPct => "duplication_pct",
            MetricType::InvalidPct => "invalid_pct",
            MetricType::RowCount => "row_count",
            MetricType::TrendInconsistencyPct => "trend_inconsistency_pct",
            MetricType::NullCount => "nullcount",
            MetricType::Count => "count",
            MetricType::UniqueCount => "uniquecount",
            MetricType::Sum => "sum",
            MetricType::InvalidCount => "invalidcount",
        }
    }

    /// Returns the category implied by the metric type.
    pub fn category(&self) -> Category {
        match self {
            MetricType::NullnessPct
            | MetricType::DuplicationPct
            | MetricType::InvalidPct
            | MetricType::RowCount
            | MetricType::TrendInconsistencyPct => Category::Quality,
            MetricType::NullCount
            | MetricType::Count
            | MetricType::UniqueCount
            | MetricType::Sum
            | MetricType::InvalidCount => Category::Basic,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricType::ALL
            .into_iter()
            .find(|metric_type| metric_type.as_str() == s)
            .ok_or_else(|| QualityError::UnknownMetricType(s.to_string()))
    }
}

/// Whether a metric is a raw measurement or a derived ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Raw measurement taken from the data source
    Basic,
    /// Ratio derived from basic measurements
    Quality,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Basic => f.write_str("basic"),
            Category::Quality => f.write_str("quality"),
        }
    }
}

/// Whether a metric belongs to a whole table or to one of its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    /// Table-level metric
    Table,
    /// Field-level metric
    Field,
}

impl Owner {
    /// Derives the owner from a field ID; an empty ID means the table.
    pub fn from_field_id(field_id: &str) -> Self {
        if field_id.is_empty() {
            Owner::Table
        } else {
            Owner::Field
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Table => f.write_str("table"),
            Owner::Field => f.write_str("field"),
        }
    }
}

/// A measured metric value.
///
/// `category()` and `owner()` are derived from the metric type and field ID,
/// so a metric can never carry a category or owner that contradicts them.
///
/// # Example
///
/// ```rust
/// use quality_core::{Category, Metric, MetricType, Owner};
///
/// let metric = Metric::new(MetricType::NullCount, "email", 20.0);
/// assert_eq!(metric.category(), Category::Basic);
/// assert_eq!(metric.owner(), Owner::Field);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Unique identifier of this metric instance
    #[serde(default = "new_id")]
    pub id: String,

    /// Field the metric belongs to; empty for table-level metrics
    #[serde(default)]
    pub field_id: String,

    /// Kind of measurement
    #[serde(rename = "type")]
    pub metric_type: MetricType,

    /// Partition/group bucket the metric was computed for
    #[serde(default)]
    pub group_value: String,

    /// Measured value
    pub value: f64,

    /// Invalidity condition, only meaningful for invalid metrics
    #[serde(default)]
    pub condition: String,

    /// Additional metadata (e.g. unique-field list)
    #[serde(default)]
    pub metadata: Metadata,

    /// When the metric was produced
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Metric {
    /// Creates a new metric with a fresh ID and the current timestamp.
    pub fn new(metric_type: MetricType, field_id: impl Into<String>, value: f64) -> Self {
        Self {
            id: new_id(),
            field_id: field_id.into(),
            metric_type,
            group_value: String::new(),
            value,
            condition: String::new(),
            metadata: Metadata::new(),
            timestamp: Utc::now(),
        }
    }

    /// Returns the category implied by the metric type.
    pub fn category(&self) -> Category {
        self.metric_type.category()
    }

    /// Returns the owner implied by the field ID.
    pub fn owner(&self) -> Owner {
        Owner::from_field_id(&self.field_id)
    }

    /// Sets the invalidity condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Sets the group value.
    pub fn with_group(mut self, group_value: impl Into<String>) -> Self {
        self.group_value = group_value.into();
        self
    }

    /// Replaces the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Description of a metric that must be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric to produce
    pub name: MetricType,

    /// Table the metric is measured on
    pub table_id: String,

    /// Field the metric is measured on; empty for table-level specs
    #[serde(default)]
    pub field_id: String,

    /// Invalidity condition for invalid metrics
    #[serde(default)]
    pub condition: String,

    /// Additional metadata (e.g. unique-field list)
    #[serde(default)]
    pub metadata: Metadata,

    /// Whether a missing result is acceptable downstream
    #[serde(default)]
    pub optional: bool,
}

impl MetricSpec {
    /// Creates a table-level spec.
    pub fn table(name: MetricType, table_id: impl Into<String>) -> Self {
        Self {
            name,
            table_id: table_id.into(),
            field_id: String::new(),
            condition: String::new(),
            metadata: Metadata::new(),
            optional: false,
        }
    }

    /// Creates a field-level spec.
    pub fn field(name: MetricType, table_id: impl Into<String>, field_id: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            ..Self::table(name, table_id)
        }
    }

    /// Sets the invalidity condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Replaces the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Marks the spec as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Returns the owner implied by the field ID.
    pub fn owner(&self) -> Owner {
        Owner::from_field_id(&self.field_id)
    }
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} of {}", self.owner(), self.name, self.table_id)?;
        if !self.field_id.is_empty() {
            write!(f, ".{}", self.field_id)?;
        }
        if !self.condition.is_empty() {
            write!(f, " where '{}'", self.condition)?;
        }
        Ok(())
    }
}

//! Builder pattern for creating metrics, tolerances and table metadata.
//!
//! This module provides fluent builders used by fixtures, tests and
//! measurement delegates.

use crate::{
    Comparator, FieldSpec, Metadata, Metric, MetricType, TableSpec, Tolerance, ToleranceRule,
    UNIQUE_FIELDS_KEY,
};
use chrono::{DateTime, Utc};

/// Builder for creating a `Metric`.
///
/// # Example
///
/// ```rust
/// use quality_core::{MetricBuilder, MetricType, Owner};
///
/// let metric = MetricBuilder::new(MetricType::InvalidCount, 3.0)
///     .field("age")
///     .condition("age < 0")
///     .group("2024-01-01")
///     .build();
///
/// assert_eq!(metric.owner(), Owner::Field);
/// assert_eq!(metric.condition, "age < 0");
/// ```
#[derive(Debug)]
pub struct MetricBuilder {
    metric_type: MetricType,
    value: f64,
    field_id: String,
    group_value: String,
    condition: String,
    metadata: Metadata,
    timestamp: Option<DateTime<Utc>>,
}

impl MetricBuilder {
    /// Creates a new table-level metric builder.
    pub fn new(metric_type: MetricType, value: f64) -> Self {
        Self {
            metric_type,
            value,
            field_id: String::new(),
            group_value: String::new(),
            condition: String::new(),
            metadata: Metadata::new(),
            timestamp: None,
        }
    }

    /// Scopes the metric to a field.
    pub fn field(mut self, field_id: impl Into<String>) -> Self {
        self.field_id = field_id.into();
        self
    }

    /// Sets the group value.
    pub fn group(mut self, group_value: impl Into<String>) -> Self {
        self.group_value = group_value.into();
        self
    }

    /// Sets the invalidity condition.
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the timestamp; defaults to now.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builds the metric.
    pub fn build(self) -> Metric {
        let mut metric = Metric::new(self.metric_type, self.field_id, self.value)
            .with_group(self.group_value)
            .with_condition(self.condition)
            .with_metadata(self.metadata);
        if let Some(timestamp) = self.timestamp {
            metric.timestamp = timestamp;
        }
        metric
    }
}

/// Builder for creating a `Tolerance`.
///
/// # Example
///
/// ```rust
/// use quality_core::{Comparator, MetricType, ToleranceBuilder};
///
/// let tolerance = ToleranceBuilder::field("p.d.t", "email", MetricType::NullnessPct)
///     .rule(Comparator::LessThan, 5.0)
///     .build();
///
/// assert!(tolerance.is_passed(1.0));
/// assert!(!tolerance.is_passed(5.0));
/// ```
#[derive(Debug)]
pub struct ToleranceBuilder {
    table_urn: String,
    field_id: String,
    metric_name: MetricType,
    condition: String,
    metadata: Metadata,
    rules: Vec<ToleranceRule>,
}

impl ToleranceBuilder {
    /// Creates a builder for a table-level tolerance.
    pub fn table(table_urn: impl Into<String>, metric_name: MetricType) -> Self {
        Self {
            table_urn: table_urn.into(),
            field_id: String::new(),
            metric_name,
            condition: String::new(),
            metadata: Metadata::new(),
            rules: Vec::new(),
        }
    }

    /// Creates a builder for a field-level tolerance.
    pub fn field(
        table_urn: impl Into<String>,
        field_id: impl Into<String>,
        metric_name: MetricType,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            ..Self::table(table_urn, metric_name)
        }
    }

    /// Sets the invalidity condition.
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the unique-field list of a duplication tolerance.
    pub fn unique_fields<S: Into<String>>(self, fields: impl IntoIterator<Item = S>) -> Self {
        let fields: Vec<serde_json::Value> = fields
            .into_iter()
            .map(|field| serde_json::Value::String(field.into()))
            .collect();
        self.metadata(UNIQUE_FIELDS_KEY, fields)
    }

    /// Adds a rule.
    pub fn rule(mut self, comparator: Comparator, value: f64) -> Self {
        self.rules.push(ToleranceRule::new(comparator, value));
        self
    }

    /// Builds the tolerance.
    pub fn build(self) -> Tolerance {
        Tolerance {
            table_urn: self.table_urn,
            field_id: self.field_id,
            metric_name: self.metric_name,
            condition: self.condition,
            metadata: self.metadata,
            tolerance_rules: self.rules,
        }
    }
}

/// Builder for creating a `TableSpec`.
#[derive(Debug, Default)]
pub struct TableSpecBuilder {
    name: String,
    partition_field: Option<String>,
    fields: Vec<FieldSpec>,
}

impl TableSpecBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the partition field.
    pub fn partition_field(mut self, field: impl Into<String>) -> Self {
        self.partition_field = Some(field.into());
        self
    }

    /// Adds a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds the table metadata.
    pub fn build(self) -> TableSpec {
        TableSpec {
            name: self.name,
            partition_field: self.partition_field,
            fields: self.fields,
        }
    }
}

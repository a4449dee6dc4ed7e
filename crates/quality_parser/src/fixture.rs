//! Audit fixtures: everything needed to run the pipeline without a warehouse.
//!
//! A fixture bundles the table metadata, its tolerances and the raw basic
//! counts a measurement delegate would have produced.

use crate::{InputFormat, Result, detect_format, parse_str};
use quality_core::{Metadata, Metric, MetricType, TableSpec, Tolerance, ToleranceSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A raw basic count as written in a fixture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureMetric {
    #[serde(alias = "type")]
    pub metric_type: MetricType,

    #[serde(default)]
    pub field_id: String,

    #[serde(default)]
    pub condition: String,

    #[serde(default)]
    pub group_value: String,

    pub value: f64,

    #[serde(default)]
    pub metadata: Metadata,
}

impl FixtureMetric {
    /// Converts into a freshly identified metric.
    pub fn to_metric(&self) -> Metric {
        Metric::new(self.metric_type, &self.field_id, self.value)
            .with_condition(&self.condition)
            .with_group(&self.group_value)
            .with_metadata(self.metadata.clone())
    }
}

/// Table, tolerances and measured counts of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFixture {
    /// Table URN
    pub urn: String,

    /// Record count reported by the statistics stage
    pub total_records: u64,

    /// Table metadata
    #[serde(default)]
    pub table: TableSpec,

    /// Tolerances; `table_urn` defaults to `urn`
    #[serde(default)]
    pub tolerances: Vec<Tolerance>,

    /// Raw basic counts answered by the fixture delegates
    #[serde(default)]
    pub metrics: Vec<FixtureMetric>,
}

impl AuditFixture {
    /// Returns the tolerance spec of the fixture.
    pub fn tolerance_spec(&self) -> ToleranceSpec {
        ToleranceSpec::new(&self.urn, self.tolerances.clone())
    }

    /// Returns the basic metrics of the fixture.
    pub fn basic_metrics(&self) -> Vec<Metric> {
        self.metrics.iter().map(FixtureMetric::to_metric).collect()
    }
}

/// Parse and check an audit fixture in the given format.
pub fn parse_fixture(content: &str, format: InputFormat) -> Result<AuditFixture> {
    let fixture: AuditFixture = parse_str(content, format)?;
    fixture.tolerance_spec().validate()?;
    Ok(fixture)
}

/// Load and check an audit fixture file.
pub fn load_fixture(path: &Path) -> Result<AuditFixture> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_fixture(&content, format)
}

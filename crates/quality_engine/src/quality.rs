//! Quality metric calculation.
//!
//! Quality metrics are ratios over the basic metrics of the same group:
//! - Row count: the table `count`
//! - Duplication: `(count - uniquecount) / count`, carrying the metadata of
//!   the `uniquecount` metric
//! - Invalidity: `invalidcount / count` for the matching field and condition
//! - Nullness: `nullcount / count` of the field
//!
//! Percentages are 0 when the table count is 0.

use crate::{EngineError, Result};
use quality_core::{
    Category, Metric, MetricFinder, MetricSpec, MetricStore, MetricType, Owner, Profile,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Derives quality metrics from the stored basic metrics of a profile.
pub struct QualityMetricCalculator {
    metric_store: Arc<dyn MetricStore>,
}

impl QualityMetricCalculator {
    pub fn new(metric_store: Arc<dyn MetricStore>) -> Self {
        Self { metric_store }
    }

    /// Calculates every quality spec for every group of the profile.
    ///
    /// Returns nothing when the profile found no records.
    pub async fn calculate(&self, profile: &Profile, specs: &[MetricSpec]) -> Result<Vec<Metric>> {
        if profile.total_records == 0 {
            info!("No records in {}, skipping quality metrics", profile.urn);
            return Ok(Vec::new());
        }

        let metrics = self
            .metric_store
            .get_metrics_by_profile_id(&profile.id)
            .await
            .map_err(|source| EngineError::MetricLookup {
                profile_id: profile.id.clone(),
                source,
            })?;

        calculate_quality_metrics(&metrics, specs)
    }
}

/// Groups basic metrics by group value and scores every spec in each group.
///
/// Groups are processed in sorted order; output follows group order, then
/// spec order.
pub fn calculate_quality_metrics(metrics: &[Metric], specs: &[MetricSpec]) -> Result<Vec<Metric>> {
    let mut groups: BTreeMap<&str, Vec<Metric>> = BTreeMap::new();
    for metric in metrics {
        if metric.category() == Category::Basic {
            groups
                .entry(metric.group_value.as_str())
                .or_default()
                .push(metric.clone());
        }
    }

    // With nothing measured, required specs still have to report what is missing.
    if groups.is_empty() && specs.iter().any(|spec| !spec.optional) {
        groups.insert("", Vec::new());
    }

    let mut quality = Vec::new();
    for (group, basics) in &groups {
        quality.extend(score_group(group, basics, specs)?);
    }

    Ok(quality)
}

fn score_group(group: &str, basics: &[Metric], specs: &[MetricSpec]) -> Result<Vec<Metric>> {
    let mut scored = Vec::with_capacity(specs.len());

    for spec in specs {
        let mut metadata = spec.metadata.clone();
        let value = match (spec.name, spec.owner()) {
            (MetricType::RowCount, Owner::Table) => table_count(group, basics, spec)?,
            (MetricType::DuplicationPct, Owner::Table) => {
                let count = table_count(group, basics, spec)?;
                let unique = require(
                    group,
                    spec,
                    MetricType::UniqueCount,
                    MetricFinder::new(basics)
                        .with_type(MetricType::UniqueCount)
                        .with_owner(Owner::Table),
                )?;
                metadata = unique.metadata.clone();
                percentage(count - unique.value, count)
            }
            (MetricType::InvalidPct, _) => {
                let count = table_count(group, basics, spec)?;
                let invalid = require(
                    group,
                    spec,
                    MetricType::InvalidCount,
                    MetricFinder::new(basics)
                        .with_type(MetricType::InvalidCount)
                        .with_field_id(&spec.field_id)
                        .with_condition(&spec.condition),
                )?
                .value;
                percentage(invalid, count)
            }
            (MetricType::NullnessPct, Owner::Field) => {
                let count = table_count(group, basics, spec)?;
                let nulls = require(
                    group,
                    spec,
                    MetricType::NullCount,
                    MetricFinder::new(basics)
                        .with_type(MetricType::NullCount)
                        .with_field_id(&spec.field_id),
                )?
                .value;
                percentage(nulls, count)
            }
            _ if spec.optional => {
                debug!("Skipping optional spec {}", spec);
                continue;
            }
            (other, _) => return Err(EngineError::UnsupportedQualityMetric(other)),
        };

        scored.push(
            Metric::new(spec.name, &spec.field_id, value)
                .with_group(group)
                .with_condition(&spec.condition)
                .with_metadata(metadata),
        );
    }

    Ok(scored)
}

fn table_count(group: &str, basics: &[Metric], spec: &MetricSpec) -> Result<f64> {
    let count = require(
        group,
        spec,
        MetricType::Count,
        MetricFinder::new(basics)
            .with_type(MetricType::Count)
            .with_owner(Owner::Table),
    )?;
    Ok(count.value)
}

fn require<'a>(
    group: &str,
    spec: &MetricSpec,
    metric: MetricType,
    finder: MetricFinder<'a>,
) -> Result<&'a Metric> {
    finder.find_one().ok_or_else(|| EngineError::MissingMetric {
            metric,
            spec: spec.to_string(),
            group: group.to_string(),
        })
}

fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

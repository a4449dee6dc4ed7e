//! Tolerance rule validation.

use crate::{EngineError, Result};
use quality_core::{Category, Metric, MetricFinder, Tolerance, ValidatedMetric};

/// Matches quality metrics against tolerances and evaluates their rules.
#[derive(Debug, Default)]
pub struct RuleValidator;

impl RuleValidator {
    /// Creates a new rule validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates every quality metric matched by each tolerance.
    ///
    /// A tolerance matches the quality metrics with the same field, type and
    /// condition, one per group. Output follows tolerance order, then the
    /// order of the metrics. A tolerance with no matching metric fails the
    /// whole validation.
    pub fn validate(
        &self,
        metrics: &[Metric],
        tolerances: &[Tolerance],
    ) -> Result<Vec<ValidatedMetric>> {
        let mut validated = Vec::new();

        for tolerance in tolerances {
            let matched = MetricFinder::new(metrics)
                .with_category(Category::Quality)
                .with_field_id(&tolerance.field_id)
                .with_type(tolerance.metric_name)
                .with_condition(&tolerance.condition)
                .find();

            if matched.is_empty() {
                return Err(EngineError::MissingQualityScore {
                    urn: tolerance.table_urn.clone(),
                    field_id: tolerance.field_id.clone(),
                    metric: tolerance.metric_name,
                    condition: tolerance.condition.clone(),
                });
            }

            validated.extend(matched.into_iter().map(|metric| ValidatedMetric {
                metric: metric.clone(),
                tolerance_rules: tolerance.tolerance_rules.clone(),
                pass_flag: tolerance.is_passed(metric.value),
            }));
        }

        Ok(validated)
    }
}

//! Metric spec generation.
//!
//! Tolerances describe what must hold; the generators here turn them into the
//! list of metrics that must be produced to check it:
//! - Basic specs: raw measurements the delegates compute on the warehouse
//! - Quality specs: ratios the calculator derives from the basic metrics

use crate::{EngineError, Result};
use async_trait::async_trait;
use quality_core::{
    Metadata, MetadataStore, MetricSpec, MetricType, TableSpec, Tolerance, ToleranceStore,
    UNIQUE_FIELDS_KEY,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Produces the metric specs a stage must fulfil for a table.
#[async_trait]
pub trait MetricSpecGenerator: Send + Sync {
    async fn generate(&self, urn: &str) -> Result<Vec<MetricSpec>>;
}

/// Derives basic metric specs from the tolerances and metadata of a table.
pub struct BasicSpecGenerator {
    tolerance_store: Arc<dyn ToleranceStore>,
    metadata_store: Arc<dyn MetadataStore>,
}

impl BasicSpecGenerator {
    pub fn new(
        tolerance_store: Arc<dyn ToleranceStore>,
        metadata_store: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            tolerance_store,
            metadata_store,
        }
    }
}

#[async_trait]
impl MetricSpecGenerator for BasicSpecGenerator {
    async fn generate(&self, urn: &str) -> Result<Vec<MetricSpec>> {
        let spec = self
            .tolerance_store
            .get_by_table_id(urn)
            .await
            .map_err(|source| EngineError::ToleranceLookup {
                urn: urn.to_string(),
                source,
            })?;

        let table = self
            .metadata_store
            .get_metadata(urn)
            .await
            .map_err(|source| EngineError::MetadataLookup {
                urn: urn.to_string(),
                source,
            })?;

        basic_metric_specs(urn, &table, &spec.tolerances)
    }
}

/// Maps tolerances onto the basic metrics they depend on.
///
/// Table specs come first, then field specs in tolerance order. Every field
/// referenced by a tolerance gets exactly one `count` spec, emitted when the
/// field is first seen. When anything was generated, a table-level `count`
/// spec is appended last since every ratio is computed against it.
///
/// `sum` specs are only produced for numeric fields; a field missing from the
/// metadata counts as non-numeric.
pub fn basic_metric_specs(
    urn: &str,
    table: &TableSpec,
    tolerances: &[Tolerance],
) -> Result<Vec<MetricSpec>> {
    let mut table_specs = Vec::new();
    let mut field_specs = Vec::new();
    let mut counted_fields = HashSet::new();
    let mut needs_row_count = false;

    for tolerance in tolerances {
        if tolerance.is_table_level() {
            match tolerance.metric_name {
                MetricType::DuplicationPct => {
                    let mut metadata = Metadata::new();
                    if let Some(value) = tolerance.metadata.get(UNIQUE_FIELDS_KEY) {
                        if !is_string_list(value) {
                            return Err(EngineError::InvalidUniqueFields {
                                urn: urn.to_string(),
                            });
                        }
                        metadata.insert(UNIQUE_FIELDS_KEY.to_string(), value.clone());
                    }
                    table_specs.push(
                        MetricSpec::table(MetricType::UniqueCount, urn).with_metadata(metadata),
                    );
                }
                MetricType::InvalidPct => {
                    table_specs.push(
                        MetricSpec::table(MetricType::InvalidCount, urn)
                            .with_condition(&tolerance.condition),
                    );
                }
                MetricType::RowCount => needs_row_count = true,
                other => debug!("No basic metric derived from table tolerance {}", other),
            }
            continue;
        }

        let field_id = tolerance.field_id.as_str();
        if counted_fields.insert(field_id) {
            field_specs.push(MetricSpec::field(MetricType::Count, urn, field_id));
        }

        match tolerance.metric_name {
            MetricType::InvalidPct => field_specs.push(
                MetricSpec::field(MetricType::InvalidCount, urn, field_id)
                    .with_condition(&tolerance.condition),
            ),
            MetricType::NullnessPct => {
                field_specs.push(MetricSpec::field(MetricType::NullCount, urn, field_id))
            }
            MetricType::Sum => {
                if table.is_numeric_field(field_id) {
                    field_specs.push(MetricSpec::field(MetricType::Sum, urn, field_id));
                } else {
                    warn!(
                        "Skipping sum of non-numeric field '{}' in {}",
                        field_id, urn
                    );
                }
            }
            other => debug!(
                "No basic metric derived from field tolerance {} of '{}'",
                other, field_id
            ),
        }
    }

    let mut specs = table_specs;
    specs.append(&mut field_specs);
    if !specs.is_empty() || needs_row_count {
        specs.push(MetricSpec::table(MetricType::Count, urn));
    }

    Ok(specs)
}

fn is_string_list(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}

/// Maps tolerances directly onto the quality metrics they bound.
pub struct QualitySpecGenerator {
    tolerance_store: Arc<dyn ToleranceStore>,
}

impl QualitySpecGenerator {
    pub fn new(tolerance_store: Arc<dyn ToleranceStore>) -> Self {
        Self { tolerance_store }
    }
}

#[async_trait]
impl MetricSpecGenerator for QualitySpecGenerator {
    async fn generate(&self, urn: &str) -> Result<Vec<MetricSpec>> {
        let spec = self
            .tolerance_store
            .get_by_table_id(urn)
            .await
            .map_err(|source| EngineError::ToleranceLookup {
                urn: urn.to_string(),
                source,
            })?;

        Ok(quality_metric_specs(urn, &spec.tolerances))
    }
}

/// One quality spec per tolerance with a quality metric, in tolerance order.
///
/// Trend inconsistency is marked optional: it has no basic-metric formula and
/// is skipped by the calculator. Tolerances on basic metrics (`sum`) produce
/// no quality spec.
pub fn quality_metric_specs(urn: &str, tolerances: &[Tolerance]) -> Vec<MetricSpec> {
    tolerances
        .iter()
        .filter_map(|tolerance| {
            let spec = match (tolerance.metric_name, tolerance.is_table_level()) {
                (
                    MetricType::DuplicationPct | MetricType::RowCount | MetricType::InvalidPct,
                    true,
                ) => MetricSpec::table(tolerance.metric_name, urn),
                (MetricType::NullnessPct | MetricType::InvalidPct, false) => {
                    MetricSpec::field(tolerance.metric_name, urn, &tolerance.field_id)
                }
                (MetricType::TrendInconsistencyPct, false) => {
                    MetricSpec::field(tolerance.metric_name, urn, &tolerance.field_id).optional()
                }
                (metric, _) => {
                    debug!("No quality spec for {} tolerance of {}", metric, urn);
                    return None;
                }
            };

            Some(
                spec.with_condition(&tolerance.condition)
                    .with_metadata(tolerance.metadata.clone()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryMetadataStore, InMemoryToleranceStore};
    use pretty_assertions::assert_eq;
    use quality_core::{
        Comparator, FieldSpec, FieldType, TableSpecBuilder, ToleranceBuilder, ToleranceSpec,
    };

    const URN: &str = "project.dataset.orders";

    fn orders() -> TableSpec {
        TableSpecBuilder::new("orders")
            .field(FieldSpec::new("id", FieldType::String))
            .field(FieldSpec::new("email", FieldType::String))
            .field(FieldSpec::new("amount", FieldType::Numeric))
            .field(FieldSpec::new("age", FieldType::Integer))
            .build()
    }

    fn names(specs: &[MetricSpec]) -> Vec<(MetricType, &str)> {
        specs
            .iter()
            .map(|spec| (spec.name, spec.field_id.as_str()))
            .collect()
    }

    #[test]
    fn test_basic_specs_ordering() {
        let tolerances = vec![
            ToleranceBuilder::field(URN, "email", MetricType::NullnessPct)
                .rule(Comparator::LessThan, 5.0)
                .build(),
            ToleranceBuilder::table(URN, MetricType::DuplicationPct)
                .unique_fields(["id"])
                .rule(Comparator::LessThanEq, 0.0)
                .build(),
            ToleranceBuilder::field(URN, "age", MetricType::InvalidPct)
                .condition("age < 0")
                .rule(Comparator::LessThan, 1.0)
                .build(),
            ToleranceBuilder::field(URN, "email", MetricType::InvalidPct)
                .condition("email NOT LIKE '%@%'")
                .rule(Comparator::LessThan, 1.0)
                .build(),
        ];

        let specs = basic_metric_specs(URN, &orders(), &tolerances).unwrap();

        assert_eq!(
            names(&specs),
            vec![
                (MetricType::UniqueCount, ""),
                (MetricType::Count, "email"),
                (MetricType::NullCount, "email"),
                (MetricType::Count, "age"),
                (MetricType::InvalidCount, "age"),
                (MetricType::InvalidCount, "email"),
                (MetricType::Count, ""),
            ]
        );
        assert_eq!(specs[0].metadata[UNIQUE_FIELDS_KEY], serde_json::json!(["id"]));
        assert_eq!(specs[4].condition, "age < 0");
        assert_eq!(specs[5].condition, "email NOT LIKE '%@%'");
    }

    #[tokio::test]
    async fn test_basic_specs_are_deterministic() {
        let tolerances = vec![
            ToleranceBuilder::field(URN, "amount", MetricType::Sum)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
            ToleranceBuilder::field(URN, "email", MetricType::NullnessPct)
                .rule(Comparator::LessThan, 5.0)
                .build(),
            ToleranceBuilder::table(URN, MetricType::DuplicationPct)
                .unique_fields(["id", "email"])
                .rule(Comparator::LessThanEq, 0.0)
                .build(),
            ToleranceBuilder::field(URN, "age", MetricType::InvalidPct)
                .condition("age < 0")
                .rule(Comparator::LessThan, 1.0)
                .build(),
            ToleranceBuilder::table(URN, MetricType::RowCount)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
        ];

        let first = basic_metric_specs(URN, &orders(), &tolerances).unwrap();
        let second = basic_metric_specs(URN, &orders(), &tolerances).unwrap();
        assert_eq!(first, second);

        let tolerance_store = Arc::new(InMemoryToleranceStore::new());
        tolerance_store.insert(ToleranceSpec::new(URN, tolerances));
        let metadata_store = Arc::new(InMemoryMetadataStore::new());
        metadata_store.insert(URN, orders());
        let generator = BasicSpecGenerator::new(tolerance_store, metadata_store);

        assert_eq!(generator.generate(URN).await.unwrap(), first);
        assert_eq!(generator.generate(URN).await.unwrap(), first);
    }

    #[test]
    fn test_one_count_per_field() {
        let tolerances = vec![
            ToleranceBuilder::field(URN, "email", MetricType::NullnessPct)
                .rule(Comparator::LessThan, 5.0)
                .build(),
            ToleranceBuilder::field(URN, "email", MetricType::InvalidPct)
                .condition("email = ''")
                .rule(Comparator::LessThan, 5.0)
                .build(),
        ];

        let specs = basic_metric_specs(URN, &orders(), &tolerances).unwrap();
        let field_counts = specs
            .iter()
            .filter(|spec| spec.name == MetricType::Count && spec.field_id == "email")
            .count();

        assert_eq!(field_counts, 1);
    }

    #[test]
    fn test_sum_only_for_numeric_fields() {
        let tolerances = vec![
            ToleranceBuilder::field(URN, "amount", MetricType::Sum)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
            ToleranceBuilder::field(URN, "email", MetricType::Sum)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
            ToleranceBuilder::field(URN, "missing", MetricType::Sum)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
        ];

        let specs = basic_metric_specs(URN, &orders(), &tolerances).unwrap();

        assert_eq!(
            names(&specs),
            vec![
                (MetricType::Count, "amount"),
                (MetricType::Sum, "amount"),
                (MetricType::Count, "email"),
                (MetricType::Count, "missing"),
                (MetricType::Count, ""),
            ]
        );
    }

    #[test]
    fn test_invalid_unique_fields() {
        let tolerances = vec![
            ToleranceBuilder::table(URN, MetricType::DuplicationPct)
                .metadata(UNIQUE_FIELDS_KEY, "id")
                .rule(Comparator::LessThanEq, 0.0)
                .build(),
        ];

        let err = basic_metric_specs(URN, &orders(), &tolerances).unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid unique fields type in project.dataset.orders tolerance spec"
        );
    }

    #[test]
    fn test_no_tolerances_no_specs() {
        let specs = basic_metric_specs(URN, &orders(), &[]).unwrap();
        assert!(specs.is_empty());
    }

    #[test]
    fn test_row_count_requires_table_count() {
        let tolerances = vec![
            ToleranceBuilder::table(URN, MetricType::RowCount)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
        ];

        let specs = basic_metric_specs(URN, &orders(), &tolerances).unwrap();

        assert_eq!(names(&specs), vec![(MetricType::Count, "")]);
    }

    #[test]
    fn test_quality_specs_follow_tolerances() {
        let tolerances = vec![
            ToleranceBuilder::table(URN, MetricType::RowCount)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
            ToleranceBuilder::field(URN, "age", MetricType::InvalidPct)
                .condition("age < 0")
                .rule(Comparator::LessThan, 1.0)
                .build(),
            ToleranceBuilder::field(URN, "amount", MetricType::Sum)
                .rule(Comparator::MoreThan, 0.0)
                .build(),
            ToleranceBuilder::field(URN, "email", MetricType::TrendInconsistencyPct)
                .rule(Comparator::LessThan, 10.0)
                .build(),
        ];

        let specs = quality_metric_specs(URN, &tolerances);

        assert_eq!(
            names(&specs),
            vec![
                (MetricType::RowCount, ""),
                (MetricType::InvalidPct, "age"),
                (MetricType::TrendInconsistencyPct, "email"),
            ]
        );
        assert_eq!(specs[1].condition, "age < 0");
        assert!(!specs[1].optional);
        assert!(specs[2].optional);
    }
}

//! Audit of a profile's quality metrics against the table tolerances.

use crate::{EngineError, Result, RuleValidator};
use quality_core::{Audit, AuditReport, MetricStore, Profile, ToleranceStore};
use std::sync::Arc;
use tracing::{debug, info};

/// Produces the audit reports of a profile.
pub struct Auditor {
    tolerance_store: Arc<dyn ToleranceStore>,
    metric_store: Arc<dyn MetricStore>,
    rule_validator: RuleValidator,
}

impl Auditor {
    pub fn new(tolerance_store: Arc<dyn ToleranceStore>, metric_store: Arc<dyn MetricStore>) -> Self {
        Self {
            tolerance_store,
            metric_store,
            rule_validator: RuleValidator::new(),
        }
    }

    /// Validates the stored metrics of `profile` and builds one report per
    /// validated metric.
    ///
    /// Returns `None` when the profile found no records. A profile with
    /// records must produce at least one report.
    pub async fn audit(&self, audit: &Audit, profile: &Profile) -> Result<Option<Vec<AuditReport>>> {
        if profile.total_records == 0 {
            info!("No records in {}, nothing to audit", audit.urn);
            return Ok(None);
        }

        let spec = self
            .tolerance_store
            .get_by_table_id(&audit.urn)
            .await
            .map_err(|source| EngineError::ToleranceLookup {
                urn: audit.urn.clone(),
                source,
            })?;

        let metrics = self
            .metric_store
            .get_metrics_by_profile_id(&profile.id)
            .await
            .map_err(|source| EngineError::MetricLookup {
                profile_id: profile.id.clone(),
                source,
            })?;

        let validated = self
            .rule_validator
            .validate(&metrics, &spec.tolerances)
            .map_err(|err| EngineError::Validation {
                urn: audit.urn.clone(),
                source: Box::new(err),
            })?;

        let reports: Vec<AuditReport> = validated
            .into_iter()
            .map(|metric| AuditReport::from_validated(audit, metric))
            .collect();

        if reports.is_empty() {
            return Err(EngineError::EmptyAuditResult {
                urn: audit.urn.clone(),
            });
        }

        debug!("Audited {} metrics of {}", reports.len(), audit.urn);
        Ok(Some(reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryMetricStore, InMemoryToleranceStore};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quality_core::{Comparator, MetricBuilder, MetricType, ToleranceBuilder, ToleranceSpec};

    const URN: &str = "p.d.t";

    async fn setup(tolerances: Vec<quality_core::Tolerance>) -> (Auditor, Profile) {
        let tolerance_store = Arc::new(InMemoryToleranceStore::new());
        tolerance_store.insert(ToleranceSpec::new(URN, tolerances));

        let mut profile = Profile::new(URN);
        profile.total_records = 200;

        let metric_store = Arc::new(InMemoryMetricStore::new());
        metric_store
            .store(
                &profile,
                &[
                    MetricBuilder::new(MetricType::NullnessPct, 10.0)
                        .field("email")
                        .build(),
                    MetricBuilder::new(MetricType::NullCount, 20.0)
                        .field("email")
                        .build(),
                ],
            )
            .await
            .unwrap();

        (Auditor::new(tolerance_store, metric_store), profile)
    }

    #[tokio::test]
    async fn test_audit_reports() {
        let (auditor, profile) = setup(vec![
            ToleranceBuilder::field(URN, "email", MetricType::NullnessPct)
                .rule(Comparator::LessThan, 5.0)
                .build(),
        ])
        .await;
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let audit = Audit::new(&profile).with_event_timestamp(at);

        let reports = auditor.audit(&audit, &profile).await.unwrap().unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].metric_value, 10.0);
        assert!(!reports[0].pass_flag);
        assert_eq!(reports[0].event_timestamp, at);
        assert_eq!(reports[0].audit_id, audit.id);
    }

    #[tokio::test]
    async fn test_zero_records_returns_none() {
        let (auditor, mut profile) = setup(Vec::new()).await;
        profile.total_records = 0;
        let audit = Audit::new(&profile);

        let reports = auditor.audit(&audit, &profile).await.unwrap();

        assert!(reports.is_none());
    }

    #[tokio::test]
    async fn test_empty_audit_result() {
        let (auditor, profile) = setup(Vec::new()).await;
        let audit = Audit::new(&profile);

        let err = auditor.audit(&audit, &profile).await.unwrap_err();

        assert_eq!(err.to_string(), "failed to audit result of p.d.t");
    }

    #[tokio::test]
    async fn test_missing_score_wrapped() {
        let (auditor, profile) = setup(vec![
            ToleranceBuilder::table(URN, MetricType::DuplicationPct)
                .rule(Comparator::LessThanEq, 0.0)
                .build(),
        ])
        .await;
        let audit = Audit::new(&profile);

        let err = auditor.audit(&audit, &profile).await.unwrap_err();

        match err {
            EngineError::Validation { source, .. } => assert!(matches!(
                *source,
                EngineError::MissingQualityScore {
                    metric: MetricType::DuplicationPct,
                    ..
                }
            )),
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Reduction of audit reports into a pass/fail summary.

use crate::{EngineError, Result};
use quality_core::{
    AuditReport, AuditSummary, Comparator, MetricType, Tolerance, ToleranceStore,
};
use std::sync::Arc;

pub const NO_AUDIT_RESULT_MESSAGE: &str = "EXPECT SOME AUDIT RESULT BUT NO AUDIT RESULT FOUND";
pub const ALL_PASSED_MESSAGE: &str = "ALL METRICS PASSED THE TOLERANCE";
pub const MISSING_RECORDS_MESSAGE: &str = "EXPECT SOME RECORDS BUT NO RECORDS FOUND";
pub const NO_RECORDS_MESSAGE: &str = "NO RECORDS PROFILED AND AUDITED";

/// Builds audit summaries, fetching tolerances when a table had no records.
pub struct AuditSummaryFactory {
    tolerance_store: Arc<dyn ToleranceStore>,
}

impl AuditSummaryFactory {
    pub fn new(tolerance_store: Arc<dyn ToleranceStore>) -> Self {
        Self { tolerance_store }
    }

    /// Summarizes an audit run of `urn`.
    pub async fn create(
        &self,
        urn: &str,
        total_records: u64,
        reports: &[AuditReport],
    ) -> Result<AuditSummary> {
        if total_records > 0 {
            return Ok(summarize(total_records, reports, &[]));
        }

        let spec = self
            .tolerance_store
            .get_by_table_id(urn)
            .await
            .map_err(|source| EngineError::ToleranceLookup {
                urn: urn.to_string(),
                source,
            })?;

        Ok(summarize(total_records, reports, &spec.tolerances))
    }
}

/// Reduces reports into a summary.
///
/// With records, the run passes only if every report passes; the message
/// lists one block per failed report. Without records, the run fails only if
/// a table-level `row_count` tolerance demands at least one record.
/// `tolerances` is only consulted when there are no records.
pub fn summarize(
    total_records: u64,
    reports: &[AuditReport],
    tolerances: &[Tolerance],
) -> AuditSummary {
    if total_records == 0 {
        return if tolerances.iter().any(expects_records) {
            AuditSummary::new(false, MISSING_RECORDS_MESSAGE)
        } else {
            AuditSummary::new(true, NO_RECORDS_MESSAGE)
        };
    }

    if reports.is_empty() {
        return AuditSummary::new(false, NO_AUDIT_RESULT_MESSAGE);
    }

    let issues: Vec<String> = reports
        .iter()
        .filter(|report| !report.pass_flag)
        .map(issue)
        .collect();

    if issues.is_empty() {
        AuditSummary::new(true, ALL_PASSED_MESSAGE)
    } else {
        AuditSummary::new(false, issues.join("\n"))
    }
}

/// A `row_count` tolerance that zero records cannot satisfy.
fn expects_records(tolerance: &Tolerance) -> bool {
    tolerance.metric_name == MetricType::RowCount
        && tolerance.is_table_level()
        && tolerance
            .tolerance_rules
            .iter()
            .any(|rule| match rule.comparator {
                Comparator::MoreThan => rule.value >= 0.0,
                Comparator::MoreThanEq => rule.value >= 1.0,
                _ => false,
            })
}

fn issue(report: &AuditReport) -> String {
    let mut message = report.metric_name.as_str().to_uppercase();
    if !report.field_id.is_empty() {
        message.push_str(&format!(" OF {}", report.field_id));
    }
    message.push_str(" IS NOT PASSED THE TOLERANCE");
    if !report.group_value.is_empty() {
        message.push_str(&format!(" IN GROUP {}", report.group_value));
    }
    if report.metric_name == MetricType::InvalidPct && !report.condition.is_empty() {
        message.push_str(&format!("\nCONDITION: {}", report.condition));
    }

    let rules: Vec<String> = report
        .tolerance_rules
        .iter()
        .map(|rule| format!("{} {:.2}", rule.comparator.as_str().to_uppercase(), rule.value))
        .collect();
    message.push_str(&format!("\nTolerance: {}", rules.join(", ")));
    message.push_str(&format!("\nACTUAL VALUE: {:.2}", report.metric_value));

    message
}

//! End-to-end runs of the profile and audit services over in-memory stores.
//!
//! Each test wires the full pipeline the way a deployment would:
//! - Basic stage: spec generation, concurrent profiling, storage
//! - Quality stage: spec generation, calculation, storage
//! - Audit: rule validation, report storage, summary

use pretty_assertions::assert_eq;
use quality_core::{
    Audit, Comparator, FieldSpec, FieldType, JobStatus, Metric, MetricBuilder, MetricStore,
    MetricType, Profile, TableSpecBuilder, Tolerance, ToleranceBuilder, ToleranceSpec,
};
use quality_engine::memory::{
    InMemoryAuditResultStore, InMemoryMetadataStore, InMemoryMetricProfiler, InMemoryMetricStore,
    InMemoryStatistics, InMemoryStatusStore, InMemoryToleranceStore,
};
use quality_engine::{
    ALL_PASSED_MESSAGE, AuditService, AuditSummaryFactory, Auditor, BasicMetricGenerator,
    BasicSpecGenerator, EngineError, MISSING_RECORDS_MESSAGE, MetricGenerator, MultistageGenerator,
    NO_RECORDS_MESSAGE, Profiler, ProfileService, QualityMetricCalculator, QualityMetricGenerator,
    QualitySpecGenerator,
};
use std::sync::Arc;

const URN: &str = "project.dataset.orders";

struct Pipeline {
    profiles: ProfileService,
    audits: AuditService,
    metric_store: Arc<InMemoryMetricStore>,
    statuses: Arc<InMemoryStatusStore>,
    results: Arc<InMemoryAuditResultStore>,
}

fn pipeline(total_records: u64, tolerances: Vec<Tolerance>, measured: Vec<Metric>) -> Pipeline {
    let tolerance_store = Arc::new(InMemoryToleranceStore::new());
    tolerance_store.insert(ToleranceSpec::new(URN, tolerances));

    let metadata_store = Arc::new(InMemoryMetadataStore::new());
    metadata_store.insert(
        URN,
        TableSpecBuilder::new("orders")
            .field(FieldSpec::new("id", FieldType::String))
            .field(FieldSpec::new("email", FieldType::String))
            .field(FieldSpec::new("age", FieldType::Integer))
            .build(),
    );

    let metric_store = Arc::new(InMemoryMetricStore::new());
    let statuses = Arc::new(InMemoryStatusStore::new());
    let results = Arc::new(InMemoryAuditResultStore::new());
    let delegate = Arc::new(InMemoryMetricProfiler::new(measured));

    let basic = BasicMetricGenerator::new(
        Arc::new(BasicSpecGenerator::new(
            tolerance_store.clone(),
            metadata_store,
        )),
        Profiler::new(delegate.clone(), delegate, statuses.clone()),
        metric_store.clone(),
    );
    let quality = QualityMetricGenerator::new(
        Arc::new(QualitySpecGenerator::new(tolerance_store.clone())),
        QualityMetricCalculator::new(metric_store.clone()),
        metric_store.clone(),
    );
    let stages: Vec<Arc<dyn MetricGenerator>> = vec![Arc::new(basic), Arc::new(quality)];
    let generator =
        MultistageGenerator::new(Arc::new(InMemoryStatistics::new(total_records)), stages);

    Pipeline {
        profiles: ProfileService::new(generator, statuses.clone()),
        audits: AuditService::new(
            Auditor::new(tolerance_store.clone(), metric_store.clone()),
            AuditSummaryFactory::new(tolerance_store),
            results.clone(),
            statuses.clone(),
        ),
        metric_store,
        statuses,
        results,
    }
}

fn measured(group: &str) -> Vec<Metric> {
    vec![
        MetricBuilder::new(MetricType::Count, 200.0).group(group).build(),
        MetricBuilder::new(MetricType::UniqueCount, 200.0)
            .group(group)
            .build(),
        MetricBuilder::new(MetricType::Count, 200.0)
            .field("email")
            .group(group)
            .build(),
        MetricBuilder::new(MetricType::NullCount, 20.0)
            .field("email")
            .group(group)
            .build(),
        MetricBuilder::new(MetricType::Count, 200.0)
            .field("age")
            .group(group)
            .build(),
        MetricBuilder::new(MetricType::InvalidCount, 1.0)
            .field("age")
            .condition("age < 0")
            .group(group)
            .build(),
    ]
}

fn tolerances() -> Vec<Tolerance> {
    vec![
        ToleranceBuilder::table(URN, MetricType::RowCount)
            .rule(Comparator::MoreThan, 0.0)
            .build(),
        ToleranceBuilder::table(URN, MetricType::DuplicationPct)
            .unique_fields(["id"])
            .rule(Comparator::LessThanEq, 0.0)
            .build(),
        ToleranceBuilder::field(URN, "email", MetricType::NullnessPct)
            .rule(Comparator::LessThan, 5.0)
            .build(),
        ToleranceBuilder::field(URN, "age", MetricType::InvalidPct)
            .condition("age < 0")
            .rule(Comparator::MoreThanEq, 0.0)
            .rule(Comparator::LessThan, 1.0)
            .build(),
    ]
}

#[tokio::test]
async fn test_full_audit_reports_failures() {
    let pipeline = pipeline(200, tolerances(), measured(""));
    let mut profile = Profile::new(URN);

    pipeline.profiles.run(&mut profile).await.unwrap();
    let result = pipeline
        .audits
        .run(Audit::new(&profile), &profile)
        .await
        .unwrap();

    let outcomes: Vec<(MetricType, &str, f64, bool)> = result
        .reports
        .iter()
        .map(|r| (r.metric_name, r.field_id.as_str(), r.metric_value, r.pass_flag))
        .collect();
    assert_eq!(
        outcomes,
        vec![
            (MetricType::RowCount, "", 200.0, true),
            (MetricType::DuplicationPct, "", 0.0, true),
            (MetricType::NullnessPct, "email", 10.0, false),
            (MetricType::InvalidPct, "age", 0.5, true),
        ]
    );

    assert!(!result.summary.is_pass);
    assert_eq!(
        result.summary.message,
        "NULLNESS_PCT OF email IS NOT PASSED THE TOLERANCE\n\
         Tolerance: LESS_THAN 5.00\n\
         ACTUAL VALUE: 10.00"
    );
    assert_eq!(result.audit.status, JobStatus::Completed);
    assert_eq!(pipeline.results.reports(&result.audit.id), result.reports);
    assert!(
        result
            .reports
            .iter()
            .all(|r| r.event_timestamp == result.audit.event_timestamp)
    );
}

#[tokio::test]
async fn test_profile_status_lifecycle() {
    let pipeline = pipeline(200, tolerances(), measured(""));
    let mut profile = Profile::new(URN);

    let metrics = pipeline.profiles.run(&mut profile).await.unwrap();

    let stored = pipeline
        .metric_store
        .get_metrics_by_profile_id(&profile.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), metrics.len());
    assert_eq!(profile.total_records, 200);

    let statuses: Vec<JobStatus> = pipeline
        .statuses
        .history(&profile.id)
        .into_iter()
        .map(|(status, _)| status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            JobStatus::InProgress,
            JobStatus::InProgress,
            JobStatus::InProgress,
            JobStatus::Completed,
        ]
    );
}

#[tokio::test]
async fn test_passing_audit_per_group() {
    let mut measured_groups = measured("2024-01-02");
    measured_groups.extend(measured("2024-01-01"));
    let tolerances = vec![
        ToleranceBuilder::field(URN, "email", MetricType::NullnessPct)
            .rule(Comparator::LessThanEq, 10.0)
            .build(),
    ];
    let pipeline = pipeline(400, tolerances, measured_groups);
    let mut profile = Profile::new(URN).with_group("DATE(created_at)");

    pipeline.profiles.run(&mut profile).await.unwrap();
    let result = pipeline
        .audits
        .run(Audit::new(&profile), &profile)
        .await
        .unwrap();

    let groups: Vec<&str> = result
        .reports
        .iter()
        .map(|r| r.group_value.as_str())
        .collect();
    assert_eq!(groups, vec!["2024-01-01", "2024-01-02"]);
    assert!(result.summary.is_pass);
    assert_eq!(result.summary.message, ALL_PASSED_MESSAGE);
}

#[tokio::test]
async fn test_audit_is_idempotent() {
    let pipeline = pipeline(200, tolerances(), measured(""));
    let mut profile = Profile::new(URN);
    pipeline.profiles.run(&mut profile).await.unwrap();

    let first = pipeline
        .audits
        .run(Audit::new(&profile), &profile)
        .await
        .unwrap();
    let second = pipeline
        .audits
        .run(Audit::new(&profile), &profile)
        .await
        .unwrap();

    let flags = |reports: &[quality_core::AuditReport]| -> Vec<(f64, bool)> {
        reports
            .iter()
            .map(|r| (r.metric_value, r.pass_flag))
            .collect()
    };
    assert_eq!(flags(&first.reports), flags(&second.reports));
    assert_eq!(first.summary, second.summary);
}

#[tokio::test]
async fn test_zero_records_with_row_count_expectation() {
    let pipeline = pipeline(0, tolerances(), measured(""));
    let mut profile = Profile::new(URN);

    pipeline.profiles.run(&mut profile).await.unwrap();
    let result = pipeline
        .audits
        .run(Audit::new(&profile), &profile)
        .await
        .unwrap();

    assert!(result.reports.is_empty());
    assert!(!result.summary.is_pass);
    assert_eq!(result.summary.message, MISSING_RECORDS_MESSAGE);
}

#[tokio::test]
async fn test_zero_records_without_expectation() {
    let tolerances = vec![
        ToleranceBuilder::field(URN, "email", MetricType::NullnessPct)
            .rule(Comparator::LessThan, 5.0)
            .build(),
    ];
    let pipeline = pipeline(0, tolerances, measured(""));
    let mut profile = Profile::new(URN);

    pipeline.profiles.run(&mut profile).await.unwrap();
    let result = pipeline
        .audits
        .run(Audit::new(&profile), &profile)
        .await
        .unwrap();

    assert!(result.summary.is_pass);
    assert_eq!(result.summary.message, NO_RECORDS_MESSAGE);
}

#[tokio::test]
async fn test_missing_measurement_fails_profile() {
    let measured: Vec<Metric> = measured("")
        .into_iter()
        .filter(|m| m.metric_type != MetricType::NullCount)
        .collect();
    let pipeline = pipeline(200, tolerances(), measured);
    let mut profile = Profile::new(URN);

    let err = pipeline.profiles.run(&mut profile).await.unwrap_err();

    assert!(matches!(err, EngineError::Profiling { .. }));
    assert_eq!(profile.status, JobStatus::Failed);
    assert!(profile.message.contains("no measurement for field nullcount"));
    let (last_status, _) = pipeline.statuses.history(&profile.id).pop().unwrap();
    assert_eq!(last_status, JobStatus::Failed);
}

#[tokio::test]
async fn test_sum_tolerance_has_no_quality_score() {
    let tolerances = vec![
        ToleranceBuilder::field(URN, "age", MetricType::Sum)
            .rule(Comparator::MoreThan, 0.0)
            .build(),
    ];
    let mut measured = measured("");
    measured.push(MetricBuilder::new(MetricType::Sum, 5000.0).field("age").build());
    let pipeline = pipeline(200, tolerances, measured);
    let mut profile = Profile::new(URN);
    pipeline.profiles.run(&mut profile).await.unwrap();

    let audit = Audit::new(&profile);
    let audit_id = audit.id.clone();
    let err = pipeline.audits.run(audit, &profile).await.unwrap_err();

    assert_eq!(
        err.display_chain(),
        "failed to validate quality metrics of project.dataset.orders: \
         failed to find quality score for table project.dataset.orders field 'age' metric sum"
    );
    let (last_status, message) = pipeline.statuses.history(&audit_id).pop().unwrap();
    assert_eq!(last_status, JobStatus::Failed);
    assert_eq!(message, err.display_chain());
}

use anyhow::{Context, Result};
use quality_core::{Audit, Metric, Profile};
use quality_engine::memory::{
    InMemoryAuditResultStore, InMemoryMetadataStore, InMemoryMetricProfiler, InMemoryMetricStore,
    InMemoryStatistics, InMemoryStatusStore, InMemoryToleranceStore,
};
use quality_engine::{
    AuditService, AuditSummaryFactory, Auditor, BasicMetricGenerator, BasicSpecGenerator,
    MetricGenerator, MultistageGenerator, ProfileService, Profiler, QualityMetricCalculator,
    QualityMetricGenerator, QualitySpecGenerator,
};
use quality_parser::{AuditFixture, load_fixture};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::output;

pub async fn execute(fixture_path: &str, format: &str, group: Option<&str>) -> Result<()> {
    info!("Auditing fixture: {}", fixture_path);

    let fixture = load_fixture(Path::new(fixture_path))
        .with_context(|| format!("Failed to load audit fixture: {}", fixture_path))?;

    let mut measured = fixture.basic_metrics();
    let mut profile = Profile::new(&fixture.urn);
    if let Some(group) = group {
        measured.retain(|metric| metric.group_value == group);
        profile = profile.with_filter(format!("group_value = '{}'", group));
        info!("Restricted to group {}: {} measurements", group, measured.len());
    }

    let (profiles, audits) = build_services(&fixture, measured);

    profiles
        .run(&mut profile)
        .await
        .with_context(|| format!("Failed to profile {}", fixture.urn))?;

    let result = audits
        .run(Audit::new(&profile), &profile)
        .await
        .with_context(|| format!("Failed to audit {}", fixture.urn))?;

    output::print_audit_result(&result, format)?;

    if !result.summary.is_pass {
        std::process::exit(1);
    }

    Ok(())
}

/// Wires the profile and audit services over in-memory stores seeded from the
/// fixture. Both measurement delegates answer from the fixture counts.
fn build_services(fixture: &AuditFixture, measured: Vec<Metric>) -> (ProfileService, AuditService) {
    let tolerance_store = Arc::new(InMemoryToleranceStore::new());
    tolerance_store.insert(fixture.tolerance_spec());

    let metadata_store = Arc::new(InMemoryMetadataStore::new());
    metadata_store.insert(&fixture.urn, fixture.table.clone());

    let metric_store = Arc::new(InMemoryMetricStore::new());
    let status_store = Arc::new(InMemoryStatusStore::new());
    let delegate = Arc::new(InMemoryMetricProfiler::new(measured));

    let basic = BasicMetricGenerator::new(
        Arc::new(BasicSpecGenerator::new(
            tolerance_store.clone(),
            metadata_store,
        )),
        Profiler::new(delegate.clone(), delegate, status_store.clone()),
        metric_store.clone(),
    );
    let quality = QualityMetricGenerator::new(
        Arc::new(QualitySpecGenerator::new(tolerance_store.clone())),
        QualityMetricCalculator::new(metric_store.clone()),
        metric_store.clone(),
    );
    let stages: Vec<Arc<dyn MetricGenerator>> = vec![Arc::new(basic), Arc::new(quality)];
    let generator =
        MultistageGenerator::new(Arc::new(InMemoryStatistics::new(fixture.total_records)), stages);

    let profiles = ProfileService::new(generator, status_store.clone());
    let audits = AuditService::new(
        Auditor::new(tolerance_store.clone(), metric_store),
        AuditSummaryFactory::new(tolerance_store),
        Arc::new(InMemoryAuditResultStore::new()),
        status_store,
    );

    (profiles, audits)
}

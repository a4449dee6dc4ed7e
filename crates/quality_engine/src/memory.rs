//! In-memory implementations of the collaborator traits.
//!
//! Used by the command line tool and by tests. Stores that write can be told
//! to fail, so error paths can be driven without a real backend.

use async_trait::async_trait;
use quality_core::{
    Audit, AuditReport, AuditResultStore, AuditStatusStore, Entry, JobStatus, MetadataStore,
    Metric, MetricFinder, MetricProfiler, MetricSpec, MetricStore, Profile, ProfileStatistics,
    ProfileStatusStore, QualityError, Result, StatisticsGenerator, TableSpec, ToleranceSpec,
    ToleranceStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tolerance specs keyed by table URN.
#[derive(Debug, Default)]
pub struct InMemoryToleranceStore {
    specs: Mutex<HashMap<String, ToleranceSpec>>,
}

impl InMemoryToleranceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the spec of `spec.urn`.
    pub fn insert(&self, spec: ToleranceSpec) {
        lock(&self.specs).insert(spec.urn.clone(), spec);
    }
}

#[async_trait]
impl ToleranceStore for InMemoryToleranceStore {
    async fn get_by_table_id(&self, urn: &str) -> Result<ToleranceSpec> {
        lock(&self.specs)
            .get(urn)
            .cloned()
            .ok_or_else(|| QualityError::not_found("tolerance spec", urn))
    }
}

/// Table metadata keyed by table URN.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    tables: Mutex<HashMap<String, TableSpec>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, urn: impl Into<String>, table: TableSpec) {
        lock(&self.tables).insert(urn.into(), table);
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn get_metadata(&self, urn: &str) -> Result<TableSpec> {
        lock(&self.tables)
            .get(urn)
            .cloned()
            .ok_or_else(|| QualityError::not_found("table metadata", urn))
    }
}

/// Metrics keyed by profile ID, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMetricStore {
    metrics: Mutex<HashMap<String, Vec<Metric>>>,
    fail_writes: AtomicBool,
}

impl InMemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `store` call fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn store(&self, profile: &Profile, metrics: &[Metric]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(QualityError::storage(format!(
                "metric store rejected {} metrics of profile {}",
                metrics.len(),
                profile.id
            )));
        }
        lock(&self.metrics)
            .entry(profile.id.clone())
            .or_default()
            .extend_from_slice(metrics);
        Ok(())
    }

    async fn get_metrics_by_profile_id(&self, profile_id: &str) -> Result<Vec<Metric>> {
        Ok(lock(&self.metrics)
            .get(profile_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Status history of profiles and audits keyed by job ID.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    history: Mutex<HashMap<String, Vec<(JobStatus, String)>>>,
    fail_updates: AtomicBool,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent update fail.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    /// Every `(status, message)` recorded for a job, oldest first.
    pub fn history(&self, id: &str) -> Vec<(JobStatus, String)> {
        lock(&self.history).get(id).cloned().unwrap_or_default()
    }

    fn record(&self, id: &str, status: JobStatus, message: &str) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(QualityError::storage(format!(
                "status store rejected update of {id}"
            )));
        }
        lock(&self.history)
            .entry(id.to_string())
            .or_default()
            .push((status, message.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ProfileStatusStore for InMemoryStatusStore {
    async fn update(&self, profile: &Profile) -> Result<()> {
        self.record(&profile.id, profile.status, &profile.message)
    }
}

#[async_trait]
impl AuditStatusStore for InMemoryStatusStore {
    async fn update(&self, audit: &Audit) -> Result<()> {
        self.record(&audit.id, audit.status, &audit.message)
    }
}

/// Audit reports keyed by audit ID.
#[derive(Debug, Default)]
pub struct InMemoryAuditResultStore {
    reports: Mutex<HashMap<String, Vec<AuditReport>>>,
}

impl InMemoryAuditResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self, audit_id: &str) -> Vec<AuditReport> {
        lock(&self.reports).get(audit_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AuditResultStore for InMemoryAuditResultStore {
    async fn store(&self, audit: &Audit, reports: &[AuditReport]) -> Result<()> {
        lock(&self.reports)
            .entry(audit.id.clone())
            .or_default()
            .extend_from_slice(reports);
        Ok(())
    }
}

/// Measurement delegate answering specs from a fixed set of basic metrics.
///
/// Each spec is answered with every metric of the same type, field and
/// condition, one per group. Measurements without metadata report the spec
/// metadata, as a warehouse delegate reports the unique fields it grouped by.
/// A spec with no such metric fails the measurement.
#[derive(Debug, Default)]
pub struct InMemoryMetricProfiler {
    metrics: Vec<Metric>,
}

impl InMemoryMetricProfiler {
    pub fn new(metrics: Vec<Metric>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl MetricProfiler for InMemoryMetricProfiler {
    async fn profile(
        &self,
        entry: &Entry,
        _profile: &Profile,
        specs: &[MetricSpec],
    ) -> Result<Vec<Metric>> {
        let mut measured = Vec::new();
        for spec in specs {
            let matched = MetricFinder::new(&self.metrics)
                .with_type(spec.name)
                .with_field_id(&spec.field_id)
                .with_condition(&spec.condition)
                .find();
            if matched.is_empty() {
                return Err(QualityError::measurement(
                    &entry.urn,
                    format!("no measurement for {spec}"),
                ));
            }
            measured.extend(matched.into_iter().map(|found| {
                let mut metric = found.clone();
                if metric.metadata.is_empty() {
                    metric.metadata = spec.metadata.clone();
                }
                metric
            }));
        }
        Ok(measured)
    }
}

/// Statistics stage reporting a fixed record count.
#[derive(Debug, Default)]
pub struct InMemoryStatistics {
    total_records: u64,
}

impl InMemoryStatistics {
    pub fn new(total_records: u64) -> Self {
        Self { total_records }
    }
}

#[async_trait]
impl StatisticsGenerator for InMemoryStatistics {
    async fn generate(&self, _entry: &Entry, _profile: &Profile) -> Result<ProfileStatistics> {
        Ok(ProfileStatistics {
            total_records: self.total_records,
        })
    }
}

//! Collaborator traits.
//!
//! The engine never talks to a warehouse, a database or a message bus
//! directly. Everything outside the auditing pipeline is reached through the
//! traits below, injected at construction as `Arc<dyn Trait>`.

use crate::{
    Audit, AuditReport, Entry, Metric, MetricSpec, Profile, ProfileStatistics, Result, TableSpec,
    ToleranceSpec,
};
use async_trait::async_trait;

/// Source of configured tolerances.
#[async_trait]
pub trait ToleranceStore: Send + Sync {
    /// Returns the tolerance spec of a table.
    async fn get_by_table_id(&self, urn: &str) -> Result<ToleranceSpec>;
}

/// Source of table metadata (field names and types).
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Returns the metadata of a table.
    async fn get_metadata(&self, urn: &str) -> Result<TableSpec>;
}

/// Persistence of produced metrics.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Stores the metrics produced for a profile.
    async fn store(&self, profile: &Profile, metrics: &[Metric]) -> Result<()>;

    /// Returns every metric stored for a profile.
    async fn get_metrics_by_profile_id(&self, profile_id: &str) -> Result<Vec<Metric>>;
}

/// Measurement delegate producing basic metrics.
///
/// There are two implementations in a deployment, one answering table-owned
/// specs and one answering field-owned specs; the profiler runs them
/// concurrently.
#[async_trait]
pub trait MetricProfiler: Send + Sync {
    /// Measures the given specs.
    async fn profile(
        &self,
        entry: &Entry,
        profile: &Profile,
        specs: &[MetricSpec],
    ) -> Result<Vec<Metric>>;
}

/// Sink for profile progress.
#[async_trait]
pub trait ProfileStatusStore: Send + Sync {
    /// Persists the current status and message of a profile.
    async fn update(&self, profile: &Profile) -> Result<()>;
}

/// Statistics stage computing the total record count of a profile.
#[async_trait]
pub trait StatisticsGenerator: Send + Sync {
    /// Computes (and persists) the statistics of the profiled table.
    async fn generate(&self, entry: &Entry, profile: &Profile) -> Result<ProfileStatistics>;
}

/// Persistence of audit reports.
#[async_trait]
pub trait AuditResultStore: Send + Sync {
    /// Stores the reports of an audit run.
    async fn store(&self, audit: &Audit, reports: &[AuditReport]) -> Result<()>;
}

/// Sink for audit progress.
#[async_trait]
pub trait AuditStatusStore: Send + Sync {
    /// Persists the current status and message of an audit.
    async fn update(&self, audit: &Audit) -> Result<()>;
}

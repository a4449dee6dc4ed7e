//! Concurrent basic-metric measurement.
//!
//! Specs are split by owner and handed to the table and field delegates,
//! which run as two tokio tasks and report back over a channel.

use crate::{EngineError, Result};
use quality_core::{
    Entry, JobStatus, Metric, MetricProfiler, MetricSpec, Owner, Profile, ProfileStatusStore,
    QualityError,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

type TaggedResult = (Owner, quality_core::Result<Vec<Metric>>);

/// Fans specs out to the table and field delegates and merges their results.
pub struct Profiler {
    table_profiler: Arc<dyn MetricProfiler>,
    field_profiler: Arc<dyn MetricProfiler>,
    status_store: Arc<dyn ProfileStatusStore>,
}

impl Profiler {
    pub fn new(
        table_profiler: Arc<dyn MetricProfiler>,
        field_profiler: Arc<dyn MetricProfiler>,
        status_store: Arc<dyn ProfileStatusStore>,
    ) -> Self {
        Self {
            table_profiler,
            field_profiler,
            status_store,
        }
    }

    /// Measures `specs` and returns table metrics followed by field metrics.
    ///
    /// Both delegates are always awaited. If either fails, the first failure
    /// to arrive is returned and every partial result is discarded. A subset
    /// with no specs is never dispatched.
    pub async fn profile(
        &self,
        entry: &Entry,
        profile: &Profile,
        specs: &[MetricSpec],
    ) -> Result<Vec<Metric>> {
        let started = Instant::now();
        let result = self.run(entry, profile, specs).await;

        info!(
            urn = %entry.urn,
            elapsed_ms = started.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "Basic metric profiling finished"
        );

        result
    }

    async fn run(
        &self,
        entry: &Entry,
        profile: &Profile,
        specs: &[MetricSpec],
    ) -> Result<Vec<Metric>> {
        let (table_specs, field_specs): (Vec<MetricSpec>, Vec<MetricSpec>) = specs
            .iter()
            .cloned()
            .partition(|spec| spec.owner() == Owner::Table);

        let mut progress = profile.clone();
        progress.transition(
            JobStatus::InProgress,
            format!(
                "profiling {} table and {} field metrics",
                table_specs.len(),
                field_specs.len()
            ),
        );
        self.update_status(&progress).await?;

        let (tx, mut rx) = mpsc::channel::<TaggedResult>(2);
        let mut dispatched = 0;

        for (owner, delegate, subset) in [
            (Owner::Table, &self.table_profiler, table_specs),
            (Owner::Field, &self.field_profiler, field_specs),
        ] {
            if subset.is_empty() {
                continue;
            }
            dispatched += 1;

            let tx = tx.clone();
            let delegate = Arc::clone(delegate);
            let entry = entry.clone();
            let profile = profile.clone();
            tokio::spawn(async move {
                let result = delegate.profile(&entry, &profile, &subset).await;
                // The receiver outlives every sender.
                let _ = tx.send((owner, result)).await;
            });
        }
        drop(tx);

        let mut table_metrics = Vec::new();
        let mut field_metrics = Vec::new();
        let mut first_error: Option<EngineError> = None;
        let mut received = 0;

        while let Some((owner, result)) = rx.recv().await {
            received += 1;
            match result {
                Ok(metrics) => match owner {
                    Owner::Table => table_metrics = metrics,
                    Owner::Field => field_metrics = metrics,
                },
                Err(source) => {
                    if first_error.is_some() {
                        warn!("{} profiling of {} also failed: {}", owner, entry.urn, source);
                        continue;
                    }
                    first_error = Some(EngineError::Profiling {
                        urn: entry.urn.clone(),
                        owner,
                        source,
                    });
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        if received < dispatched {
            return Err(EngineError::ProfilingAborted {
                urn: entry.urn.clone(),
            });
        }

        let mut metrics = table_metrics;
        metrics.append(&mut field_metrics);

        progress.transition(
            JobStatus::InProgress,
            format!("{} basic metrics profiled", metrics.len()),
        );
        self.update_status(&progress).await?;

        Ok(metrics)
    }

    async fn update_status(&self, profile: &Profile) -> Result<()> {
        self.status_store
            .update(profile)
            .await
            .map_err(|source: QualityError| EngineError::StatusUpdate {
                id: profile.id.clone(),
                source,
            })
    }
}

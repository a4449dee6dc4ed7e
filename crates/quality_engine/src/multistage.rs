//! Staged metric generation.
//!
//! A profile run first computes table statistics, then executes each metric
//! stage in order. Basic metrics must be stored before the quality stage
//! runs, since quality metrics are computed from the stored basic metrics.

use crate::{EngineError, MetricSpecGenerator, Profiler, QualityMetricCalculator, Result};
use async_trait::async_trait;
use quality_core::{Entry, Metric, MetricStore, Profile, StatisticsGenerator};
use std::sync::Arc;
use tracing::info;

/// One stage of a profile run.
#[async_trait]
pub trait MetricGenerator: Send + Sync {
    async fn generate(&self, entry: &Entry, profile: &Profile) -> Result<Vec<Metric>>;
}

/// Runs the statistics stage followed by every metric stage.
pub struct MultistageGenerator {
    statistics: Arc<dyn StatisticsGenerator>,
    stages: Vec<Arc<dyn MetricGenerator>>,
}

impl MultistageGenerator {
    pub fn new(
        statistics: Arc<dyn StatisticsGenerator>,
        stages: Vec<Arc<dyn MetricGenerator>>,
    ) -> Self {
        Self { statistics, stages }
    }

    /// Sets `profile.total_records` from the statistics stage, then runs the
    /// metric stages in order. The first failing stage aborts the run.
    pub async fn generate(&self, profile: &mut Profile) -> Result<Vec<Metric>> {
        let entry = Entry::from(&*profile);

        let statistics = self
            .statistics
            .generate(&entry, profile)
            .await
            .map_err(|source| EngineError::Statistics {
                urn: profile.urn.clone(),
                source,
            })?;
        profile.total_records = statistics.total_records;
        info!("{} has {} records", profile.urn, profile.total_records);

        let mut metrics = Vec::new();
        for stage in &self.stages {
            metrics.extend(stage.generate(&entry, profile).await?);
        }

        Ok(metrics)
    }
}

/// Measures and stores the basic metrics of a profile.
pub struct BasicMetricGenerator {
    spec_generator: Arc<dyn MetricSpecGenerator>,
    profiler: Profiler,
    metric_store: Arc<dyn MetricStore>,
}

impl BasicMetricGenerator {
    pub fn new(
        spec_generator: Arc<dyn MetricSpecGenerator>,
        profiler: Profiler,
        metric_store: Arc<dyn MetricStore>,
    ) -> Self {
        Self {
            spec_generator,
            profiler,
            metric_store,
        }
    }
}

#[async_trait]
impl MetricGenerator for BasicMetricGenerator {
    async fn generate(&self, entry: &Entry, profile: &Profile) -> Result<Vec<Metric>> {
        let specs = self.spec_generator.generate(&profile.urn).await?;
        if specs.is_empty() {
            info!("No basic metrics to profile for {}", profile.urn);
            return Ok(Vec::new());
        }

        let metrics = self.profiler.profile(entry, profile, &specs).await?;
        store(self.metric_store.as_ref(), profile, &metrics).await?;

        Ok(metrics)
    }
}

/// Calculates and stores the quality metrics of a profile.
pub struct QualityMetricGenerator {
    spec_generator: Arc<dyn MetricSpecGenerator>,
    calculator: QualityMetricCalculator,
    metric_store: Arc<dyn MetricStore>,
}

impl QualityMetricGenerator {
    pub fn new(
        spec_generator: Arc<dyn MetricSpecGenerator>,
        calculator: QualityMetricCalculator,
        metric_store: Arc<dyn MetricStore>,
    ) -> Self {
        Self {
            spec_generator,
            calculator,
            metric_store,
        }
    }
}

#[async_trait]
impl MetricGenerator for QualityMetricGenerator {
    async fn generate(&self, _entry: &Entry, profile: &Profile) -> Result<Vec<Metric>> {
        let specs = self.spec_generator.generate(&profile.urn).await?;
        let metrics = self.calculator.calculate(profile, &specs).await?;
        if !metrics.is_empty() {
            store(self.metric_store.as_ref(), profile, &metrics).await?;
        }

        Ok(metrics)
    }
}

async fn store(metric_store: &dyn MetricStore, profile: &Profile, metrics: &[Metric]) -> Result<()> {
    metric_store
        .store(profile, metrics)
        .await
        .map_err(|source| EngineError::MetricStore {
            profile_id: profile.id.clone(),
            source,
        })
}

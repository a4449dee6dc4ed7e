//! Profile and audit job services.
//!
//! Both services move their job through `in_progress` to `completed` or
//! `failed`, persisting every transition through the status store. A failed
//! job records the full error chain as its message.

use crate::{AuditSummaryFactory, Auditor, EngineError, MultistageGenerator, Result};
use quality_core::{
    Audit, AuditReport, AuditResult, AuditResultStore, AuditStatusStore, AuditSummary, JobStatus,
    Metric, Profile, ProfileStatusStore,
};
use std::sync::Arc;
use tracing::{error, info};

/// Runs a profile job over the staged metric generator.
pub struct ProfileService {
    generator: MultistageGenerator,
    status_store: Arc<dyn ProfileStatusStore>,
}

impl ProfileService {
    pub fn new(generator: MultistageGenerator, status_store: Arc<dyn ProfileStatusStore>) -> Self {
        Self {
            generator,
            status_store,
        }
    }

    /// Generates every metric of `profile`.
    pub async fn run(&self, profile: &mut Profile) -> Result<Vec<Metric>> {
        info!("Profiling {}", profile.urn);
        profile.transition(JobStatus::InProgress, "profiling started");
        self.update(profile).await?;

        match self.generator.generate(profile).await {
            Ok(metrics) => {
                profile.transition(
                    JobStatus::Completed,
                    format!("{} metrics generated", metrics.len()),
                );
                self.update(profile).await?;
                Ok(metrics)
            }
            Err(err) => {
                error!("Profiling {} failed: {}", profile.urn, err.display_chain());
                profile.transition(JobStatus::Failed, err.display_chain());
                if let Err(status_err) = self.update(profile).await {
                    error!("{}", status_err.display_chain());
                }
                Err(err)
            }
        }
    }

    async fn update(&self, profile: &Profile) -> Result<()> {
        self.status_store
            .update(profile)
            .await
            .map_err(|source| EngineError::StatusUpdate {
                id: profile.id.clone(),
                source,
            })
    }
}

/// Runs an audit job: report, store, summarize.
pub struct AuditService {
    auditor: Auditor,
    summary_factory: AuditSummaryFactory,
    result_store: Arc<dyn AuditResultStore>,
    status_store: Arc<dyn AuditStatusStore>,
}

impl AuditService {
    pub fn new(
        auditor: Auditor,
        summary_factory: AuditSummaryFactory,
        result_store: Arc<dyn AuditResultStore>,
        status_store: Arc<dyn AuditStatusStore>,
    ) -> Self {
        Self {
            auditor,
            summary_factory,
            result_store,
            status_store,
        }
    }

    /// Audits a completed profile.
    pub async fn run(&self, mut audit: Audit, profile: &Profile) -> Result<AuditResult> {
        info!("Auditing {}", audit.urn);
        audit.total_records = profile.total_records;
        audit.transition(JobStatus::InProgress, "audit started");
        self.update(&audit).await?;

        match self.execute(&audit, profile).await {
            Ok((reports, summary)) => {
                audit.transition(JobStatus::Completed, summary.message.clone());
                self.update(&audit).await?;
                Ok(AuditResult {
                    audit,
                    reports,
                    summary,
                })
            }
            Err(err) => {
                error!("Auditing {} failed: {}", audit.urn, err.display_chain());
                audit.transition(JobStatus::Failed, err.display_chain());
                if let Err(status_err) = self.update(&audit).await {
                    error!("{}", status_err.display_chain());
                }
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        audit: &Audit,
        profile: &Profile,
    ) -> Result<(Vec<AuditReport>, AuditSummary)> {
        let reports = self
            .auditor
            .audit(audit, profile)
            .await?
            .unwrap_or_default();

        if !reports.is_empty() {
            self.result_store
                .store(audit, &reports)
                .await
                .map_err(|source| EngineError::AuditResultStore {
                    audit_id: audit.id.clone(),
                    source,
                })?;
        }

        let summary = self
            .summary_factory
            .create(&audit.urn, profile.total_records, &reports)
            .await?;

        Ok((reports, summary))
    }

    async fn update(&self, audit: &Audit) -> Result<()> {
        self.status_store
            .update(audit)
            .await
            .map_err(|source| EngineError::StatusUpdate {
                id: audit.id.clone(),
                source,
            })
    }
}

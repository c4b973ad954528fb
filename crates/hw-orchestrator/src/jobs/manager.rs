//! Job manager: submission, status and progress

use std::sync::Arc;

use hw_checks::panic_message;
use hw_core::api::ScanOptions;
use hw_core::{Job, JobId, Target, ValidationError};

use super::store::JobStore;
use crate::orchestrator::{Orchestrator, SharedReport};

/// Runs each submitted job as an independent background task
#[derive(Clone)]
pub struct JobManager {
    store: Arc<dyn JobStore>,
    orchestrator: Arc<Orchestrator>,
}

impl JobManager {
    pub fn new(store: Arc<dyn JobStore>, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    /// Register a job and start it in the background
    ///
    /// Returns as soon as the job record exists. Must be called from within
    /// a tokio runtime.
    pub fn submit(
        &self,
        targets: Vec<Target>,
        options: ScanOptions,
    ) -> Result<JobId, ValidationError> {
        if targets.is_empty() {
            return Err(ValidationError::NoTargets);
        }

        let id = JobId::generate();
        self.store.insert(Job::new(id.clone()));
        tracing::info!("Job {} submitted with {} target(s)", id.short(), targets.len());

        let report = SharedReport::new();
        let sink = {
            let store = Arc::clone(&self.store);
            let id = id.clone();
            Box::new(move |percent: u8| {
                store.set_progress(&id, percent);
            })
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let task_report = report.clone();
        let scan = tokio::spawn(async move {
            orchestrator.run(targets, options, task_report, sink).await
        });

        let store = Arc::clone(&self.store);
        let job_id = id.clone();
        tokio::spawn(async move {
            match scan.await {
                Ok(final_report) => {
                    store.complete(&job_id, final_report);
                    tracing::info!("Job {} completed", job_id.short());
                }
                Err(e) => {
                    let error = if e.is_panic() {
                        panic_message(e.into_panic().as_ref())
                    } else {
                        "Scan task cancelled".to_string()
                    };
                    tracing::error!("Job {} failed: {}", job_id.short(), error);
                    store.fail(&job_id, error, Some(report.snapshot()));
                }
            }
        });

        Ok(id)
    }

    /// Current record of a job
    pub fn status(&self, id: &JobId) -> Option<Job> {
        self.store.get(id)
    }

    /// Raise a running job's progress
    ///
    /// Unknown and terminal jobs are ignored, as are values that would lower
    /// progress.
    pub fn progress_update(&self, id: &JobId, percent: u8) -> bool {
        self.store.set_progress(id, percent)
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }
}

//! Shared server state

use std::sync::Arc;

use hw_core::config::ScannerConfig;
use hw_core::traits::{SessionProvider, ToolRunner};
use hw_ssh::SshSessionProvider;
use hw_tools::LocalToolRunner;

use crate::jobs::{InMemoryJobStore, JobManager, JobStore};
use crate::orchestrator::Orchestrator;
use crate::report::ReportService;

/// State handed to every HTTP handler
#[derive(Clone)]
pub struct ServerState {
    /// Configuration
    pub config: Arc<ScannerConfig>,
    /// Job submission and lookup
    pub jobs: JobManager,
    /// Report rendering and artifact storage
    pub reports: Arc<ReportService>,
}

impl ServerState {
    /// Production state: SSH sessions, local tools, in-memory job table
    pub fn new(config: ScannerConfig) -> Self {
        let sessions = Arc::new(SshSessionProvider::new(config.ssh.clone()));
        let tools = Arc::new(LocalToolRunner::new(config.tools.clone()));
        Self::with_parts(config, sessions, tools, Arc::new(InMemoryJobStore::new()))
    }

    /// State over caller-supplied collaborators
    pub fn with_parts(
        config: ScannerConfig,
        sessions: Arc<dyn SessionProvider>,
        tools: Arc<dyn ToolRunner>,
        store: Arc<dyn JobStore>,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            sessions,
            tools,
            config.max_concurrent_targets,
        ));
        let reports = Arc::new(ReportService::new(
            Arc::clone(&store),
            config.reports_dir.clone(),
        ));

        Self {
            config: Arc::new(config),
            jobs: JobManager::new(store, orchestrator),
            reports,
        }
    }
}

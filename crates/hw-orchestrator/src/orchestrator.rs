//! Per-job scan orchestration
//!
//! One [`Orchestrator::run`] call executes a whole job:
//!
//! 1. **Planning**: keep complete targets, derive the [`ScanPlan`] and the
//!    step budget
//! 2. **Dispatching**: scan targets with bounded concurrency (connect, host
//!    checks, extended audit, close), then run each runnable network tool
//!    once
//! 3. **Aggregating**: results land in a [`SharedReport`] as they are
//!    produced, so whatever was collected survives a fault mid-job

use std::sync::{Arc, Mutex, MutexGuard};

use futures::stream::{self, StreamExt};
use hw_core::api::ScanOptions;
use hw_core::traits::{SessionProvider, ToolRunner};
use hw_core::{NetworkScanResult, ScanReport, ServerReport, Target};

use crate::plan::ScanPlan;
use crate::progress::{ProgressSink, ProgressTracker};

/// Report under construction, shared between a job's task and its supervisor
#[derive(Clone, Default)]
pub struct SharedReport(Arc<Mutex<ScanReport>>);

impl SharedReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScanReport> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record (or replace) the entry for a target's display name
    pub fn put_server(&self, name: &str, server: ServerReport) {
        self.lock().servers.insert(name.to_string(), server);
    }

    pub fn put_network_scan(&self, tool: &str, result: NetworkScanResult) {
        self.lock().network_scans.insert(tool.to_string(), result);
    }

    /// Copy of everything collected so far
    pub fn snapshot(&self) -> ScanReport {
        self.lock().clone()
    }
}

/// Drives sessions and tool runners for a job
pub struct Orchestrator {
    sessions: Arc<dyn SessionProvider>,
    tools: Arc<dyn ToolRunner>,
    max_concurrent_targets: usize,
}

impl Orchestrator {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        tools: Arc<dyn ToolRunner>,
        max_concurrent_targets: usize,
    ) -> Self {
        Self {
            sessions,
            tools,
            max_concurrent_targets: max_concurrent_targets.max(1),
        }
    }

    /// Execute a job, publishing progress through `sink`
    pub async fn run(
        &self,
        targets: Vec<Target>,
        options: ScanOptions,
        report: SharedReport,
        sink: ProgressSink,
    ) -> ScanReport {
        let submitted = targets.len();
        let targets: Vec<Target> = targets.into_iter().filter(Target::is_complete).collect();
        if targets.len() < submitted {
            tracing::debug!(
                "Skipping {} target(s) without host or credential",
                submitted - targets.len()
            );
        }

        let plan = ScanPlan::derive(&targets, &options);
        let tracker = ProgressTracker::new(plan.total_steps(targets.len()), sink);
        tracing::debug!(
            "Plan: {} target(s), {} check(s), audit={}, tools={:?}, {} step(s)",
            targets.len(),
            plan.checks.len(),
            plan.extended_audit,
            plan.tools,
            tracker.total()
        );

        stream::iter(targets)
            .map(|target| self.scan_target(target, &plan, &tracker, &report))
            .buffer_unordered(self.max_concurrent_targets)
            .collect::<Vec<()>>()
            .await;

        for tool in plan.runnable_tools() {
            tracing::debug!("Dispatching {}", tool);
            let result = self.tools.run(tool, &plan.inputs).await;
            report.put_network_scan(tool.name(), result);
            tracker.advance(1);
        }

        report.snapshot()
    }

    async fn scan_target(
        &self,
        target: Target,
        plan: &ScanPlan,
        tracker: &ProgressTracker,
        report: &SharedReport,
    ) {
        let name = target.display_name();
        let host = target.host.trim();
        let mut session = self.sessions.open(&target);

        if let Err(e) = session.connect().await {
            tracing::warn!("Target {} ({}) unreachable: {}", name, host, e);
            session.close().await;
            report.put_server(name, ServerReport::unreachable(host, &target.user, e.to_string()));
            tracker.advance(plan.steps_per_target());
            return;
        }

        tracing::debug!("Connected to {} ({})", name, host);
        let mut server = ServerReport::reachable(host, &target.user);
        report.put_server(name, server.clone());

        if plan.has_checks() {
            server.checks = hw_checks::run_checks(session.as_mut(), &plan.checks).await;
            report.put_server(name, server.clone());
            tracker.advance(1);
        }

        if plan.extended_audit {
            server.extended_audit = Some(hw_checks::run_extended_audit(session.as_mut()).await);
            report.put_server(name, server);
            tracker.advance(1);
        }

        session.close().await;
    }
}

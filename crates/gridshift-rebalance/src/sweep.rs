//! The rebalancing control loop.
//!
//! One trigger produces one sequential sweep; all state except the
//! external cluster is sweep-local. Overlapping sweeps are tolerated
//! rather than serialized — eviction idempotency and deterministically
//! keyed audit records make duplicate work harmless.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use gridshift_cluster::ClusterApi;
use gridshift_placement::{best_target, commit_placement, select_candidates};
use gridshift_usage::{Classification, Thresholds, UsageSnapshot, analyze, classify};

use crate::error::RebalanceResult;
use crate::executor::{EvictionExecutor, RelocationOutcome};

/// Default pause between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Default termination grace handed to the eviction request.
pub const DEFAULT_EVICTION_GRACE: Duration = Duration::from_secs(30);

/// Policy knobs for the rebalancer.
#[derive(Debug, Clone)]
pub struct BalancerConfig {
    pub thresholds: Thresholds,
    pub sweep_interval: Duration,
    pub eviction_grace: Duration,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            eviction_grace: DEFAULT_EVICTION_GRACE,
        }
    }
}

/// Tallies from one sweep, for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Machines carrying the opt-in marker.
    pub machines_seen: usize,
    pub overloaded: usize,
    pub underutilized: usize,
    pub relocated: u32,
    pub already_gone: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// The rebalancer drives sweeps over the cluster.
pub struct Rebalancer<C: ClusterApi> {
    cluster: C,
    config: BalancerConfig,
}

impl<C: ClusterApi> Rebalancer<C> {
    /// Create a rebalancer with the reference policy.
    pub fn new(cluster: C) -> Self {
        Self {
            cluster,
            config: BalancerConfig::default(),
        }
    }

    /// Replace the policy configuration.
    pub fn with_config(mut self, config: BalancerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one full sweep: list → analyze → classify → select → relocate.
    ///
    /// Read failures while listing machines or workloads abort the sweep
    /// (the next trigger retries); a failure on a single relocation only
    /// abandons that workload.
    pub async fn sweep(&self) -> RebalanceResult<SweepReport> {
        let machines: Vec<_> = self
            .cluster
            .list_machines()
            .await?
            .into_iter()
            .filter(|m| m.balancing_enabled())
            .collect();

        let mut report = SweepReport {
            machines_seen: machines.len(),
            ..SweepReport::default()
        };

        if machines.is_empty() {
            info!("no machines opted into rebalancing");
            return Ok(report);
        }

        let mut overloaded = Vec::new();
        let mut targets: Vec<UsageSnapshot> = Vec::new();
        for machine in &machines {
            let workloads = self.cluster.list_workloads_on(&machine.id).await?;
            let snapshot = analyze(machine, workloads);
            debug!(
                machine = %snapshot.machine_id,
                cpu_pct = snapshot.cpu_pct,
                memory_pct = snapshot.memory_pct,
                "machine analyzed"
            );
            match classify(&snapshot, &self.config.thresholds) {
                Classification::Overloaded => overloaded.push(snapshot),
                Classification::Underutilized => targets.push(snapshot),
                Classification::Balanced => {}
            }
        }
        report.overloaded = overloaded.len();
        report.underutilized = targets.len();

        if overloaded.is_empty() || targets.is_empty() {
            info!(
                overloaded = report.overloaded,
                underutilized = report.underutilized,
                "no rebalancing needed"
            );
            return Ok(report);
        }

        let executor = EvictionExecutor::new(&self.cluster, self.config.eviction_grace);

        for source in &overloaded {
            info!(
                machine = %source.machine_id,
                cpu_pct = source.cpu_pct,
                memory_pct = source.memory_pct,
                "processing overloaded machine"
            );

            let candidates = select_candidates(&source.workloads);
            if candidates.is_empty() {
                info!(machine = %source.machine_id, "no evictable workloads");
                continue;
            }

            for candidate in &candidates {
                if targets.is_empty() {
                    debug!("no underutilized machines remain this sweep");
                    break;
                }

                let Some(idx) = best_target(candidate, &targets) else {
                    info!(
                        workload = %candidate.id(),
                        "no suitable destination, leaving in place"
                    );
                    report.skipped += 1;
                    continue;
                };

                let target_id = targets[idx].machine_id.clone();

                // The placement is decided: charge the destination now so
                // later candidates see the filled capacity, and retire it
                // once it leaves the underutilized band.
                commit_placement(candidate, &mut targets[idx]);
                if classify(&targets[idx], &self.config.thresholds)
                    != Classification::Underutilized
                {
                    targets.remove(idx);
                }

                match executor.relocate(candidate, &target_id).await {
                    Ok(RelocationOutcome::Relocated) => report.relocated += 1,
                    Ok(RelocationOutcome::AlreadyGone) => report.already_gone += 1,
                    Ok(RelocationOutcome::SkippedBudget)
                    | Ok(RelocationOutcome::SkippedIneligible) => report.skipped += 1,
                    Err(e) => {
                        error!(workload = %candidate.id(), error = %e, "relocation failed");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            relocated = report.relocated,
            skipped = report.skipped,
            failed = report.failed,
            "sweep completed"
        );
        Ok(report)
    }

    /// Run sweeps on the configured interval until shutdown.
    ///
    /// Sweep-level errors are logged and recovered by the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.config.sweep_interval.as_secs(),
            "rebalancer started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.sweep_interval) => {
                    match self.sweep().await {
                        Ok(report) => debug!(?report, "sweep finished"),
                        Err(e) => error!(error = %e, "sweep aborted"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("rebalancer shutting down");
                    break;
                }
            }
        }
    }
}

//! Eviction executor — re-validate, gate on budgets, relocate, classify.
//!
//! The executor only removes a workload from its source machine; the
//! external orchestrator reschedules it. Every attempt resolves to a
//! [`RelocationOutcome`] or a fatal [`crate::RebalanceError`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use gridshift_cluster::{
    AuditOutcome, AuditRecord, ClusterApi, ClusterError, MachineId, WorkloadSpec,
};
use gridshift_placement::is_evictable;

use crate::error::{RebalanceError, RebalanceResult};

/// How a single relocation attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// The eviction request was accepted.
    Relocated,
    /// The workload no longer exists; idempotent success.
    AlreadyGone,
    /// A disruption budget permits no disruption right now.
    SkippedBudget,
    /// Re-validation failed — the workload is no longer safe to move.
    SkippedIneligible,
}

/// Executes one relocation decision against the cluster.
pub struct EvictionExecutor<'a, C: ClusterApi> {
    cluster: &'a C,
    grace: Duration,
}

impl<'a, C: ClusterApi> EvictionExecutor<'a, C> {
    pub fn new(cluster: &'a C, grace: Duration) -> Self {
        Self { cluster, grace }
    }

    /// Run the relocation state machine for one decided placement.
    ///
    /// Steps: re-validate against fresh cluster state, check disruption
    /// budgets, issue the eviction, classify the result, and write the
    /// audit record for success-equivalent outcomes.
    pub async fn relocate(
        &self,
        workload: &WorkloadSpec,
        target: &MachineId,
    ) -> RebalanceResult<RelocationOutcome> {
        // 1. Re-validate: the workload may have changed since selection.
        let fresh = match self
            .cluster
            .get_workload(&workload.namespace, &workload.name)
            .await?
        {
            Some(w) => w,
            None => {
                debug!(workload = %workload.id(), "gone before eviction, nothing to do");
                return Ok(RelocationOutcome::AlreadyGone);
            }
        };

        if fresh.machine_id != workload.machine_id || !is_evictable(&fresh) {
            debug!(workload = %workload.id(), "no longer eligible, abandoning for this sweep");
            return Ok(RelocationOutcome::SkippedIneligible);
        }

        // 2. Disruption check against current budget state.
        let budgets = self.cluster.list_budgets(&fresh.namespace).await?;
        if let Some(budget) = budgets
            .iter()
            .find(|b| b.matches(&fresh) && !b.allows_disruption())
        {
            debug!(
                workload = %fresh.id(),
                budget = %budget.name,
                "disruption budget exhausted, skipping"
            );
            return Ok(RelocationOutcome::SkippedBudget);
        }

        // 3–4. Relocate and classify the result.
        match self
            .cluster
            .evict(&fresh.namespace, &fresh.name, self.grace)
            .await
        {
            Ok(()) => {
                info!(
                    workload = %fresh.id(),
                    from = %fresh.machine_id,
                    toward = %target,
                    grace_secs = self.grace.as_secs(),
                    "workload evicted for rebalancing"
                );
                self.audit(&fresh, target, AuditOutcome::Relocated).await;
                Ok(RelocationOutcome::Relocated)
            }
            Err(ClusterError::DisruptionDenied(msg)) => {
                debug!(workload = %fresh.id(), %msg, "eviction denied by budget");
                Ok(RelocationOutcome::SkippedBudget)
            }
            Err(ClusterError::NotFound(_)) => {
                debug!(workload = %fresh.id(), "already deleted");
                self.audit(&fresh, target, AuditOutcome::AlreadyGone).await;
                Ok(RelocationOutcome::AlreadyGone)
            }
            Err(e @ ClusterError::Forbidden(_)) => Err(RebalanceError::Forbidden {
                workload: fresh.id(),
                source: e,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the deterministically-keyed audit record. Failures are logged
    /// and never fail the relocation itself.
    async fn audit(&self, workload: &WorkloadSpec, target: &MachineId, outcome: AuditOutcome) {
        let now = epoch_secs();
        let record = AuditRecord {
            namespace: workload.namespace.clone(),
            workload: workload.name.clone(),
            source_machine: workload.machine_id.clone(),
            target_machine: target.clone(),
            outcome,
            reason: format!("evicted for rebalancing toward {target}"),
            count: 1,
            first_seen: now,
            last_seen: now,
        };

        if let Err(e) = self.cluster.upsert_audit(&record).await {
            warn!(workload = %workload.id(), error = %e, "failed to write audit record");
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

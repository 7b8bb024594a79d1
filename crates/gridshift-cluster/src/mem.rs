//! In-memory cluster — an in-process [`ClusterApi`] double.
//!
//! Serves tests and the daemon's standalone mode the way a real client
//! serves production: same trait, same error taxonomy. Eviction enforces
//! disruption budgets server-side, mirroring the real API, and failure
//! injection covers the forbidden/transport error paths.
//!
//! The handle is `Clone` and shares one mutex-guarded state object; there
//! are no globals.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::client::ClusterApi;
use crate::error::{ClusterError, ClusterResult};
use crate::types::{
    AuditRecord, DisruptionBudget, MachineId, MachineInfo, WorkloadId, WorkloadSpec,
};

#[derive(Default)]
struct Inner {
    machines: BTreeMap<MachineId, MachineInfo>,
    workloads: BTreeMap<WorkloadId, WorkloadSpec>,
    budgets: Vec<DisruptionBudget>,
    audits: BTreeMap<String, AuditRecord>,
    evicted: Vec<WorkloadId>,
    forbid_evictions: bool,
    fail_reads: bool,
}

/// Shared-handle in-memory cluster.
#[derive(Clone, Default)]
pub struct InMemoryCluster {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        // Recover the guard if a panicking test poisoned the lock.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a machine.
    pub fn add_machine(&self, machine: MachineInfo) {
        self.locked().machines.insert(machine.id.clone(), machine);
    }

    /// Insert or replace a workload.
    pub fn add_workload(&self, workload: WorkloadSpec) {
        self.locked().workloads.insert(workload.id(), workload);
    }

    /// Register a disruption budget.
    pub fn add_budget(&self, budget: DisruptionBudget) {
        self.locked().budgets.push(budget);
    }

    /// Make subsequent evictions fail with [`ClusterError::Forbidden`].
    pub fn set_forbid_evictions(&self, forbid: bool) {
        self.locked().forbid_evictions = forbid;
    }

    /// Make subsequent reads fail with [`ClusterError::Transport`].
    pub fn set_fail_reads(&self, fail: bool) {
        self.locked().fail_reads = fail;
    }

    /// Ids of workloads evicted so far, in order.
    pub fn evicted(&self) -> Vec<WorkloadId> {
        self.locked().evicted.clone()
    }

    /// All audit records, ordered by key.
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.locked().audits.values().cloned().collect()
    }

    /// Number of workloads still resident in the cluster.
    pub fn workload_count(&self) -> usize {
        self.locked().workloads.len()
    }
}

#[async_trait]
impl ClusterApi for InMemoryCluster {
    async fn list_machines(&self) -> ClusterResult<Vec<MachineInfo>> {
        let inner = self.locked();
        if inner.fail_reads {
            return Err(ClusterError::Transport("injected read failure".into()));
        }
        Ok(inner.machines.values().cloned().collect())
    }

    async fn list_workloads_on(&self, machine: &str) -> ClusterResult<Vec<WorkloadSpec>> {
        let inner = self.locked();
        if inner.fail_reads {
            return Err(ClusterError::Transport("injected read failure".into()));
        }
        Ok(inner
            .workloads
            .values()
            .filter(|w| w.machine_id == machine)
            .cloned()
            .collect())
    }

    async fn get_workload(
        &self,
        namespace: &str,
        name: &str,
    ) -> ClusterResult<Option<WorkloadSpec>> {
        let inner = self.locked();
        if inner.fail_reads {
            return Err(ClusterError::Transport("injected read failure".into()));
        }
        Ok(inner.workloads.get(&format!("{namespace}/{name}")).cloned())
    }

    async fn list_budgets(&self, namespace: &str) -> ClusterResult<Vec<DisruptionBudget>> {
        let inner = self.locked();
        if inner.fail_reads {
            return Err(ClusterError::Transport("injected read failure".into()));
        }
        Ok(inner
            .budgets
            .iter()
            .filter(|b| b.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn evict(&self, namespace: &str, name: &str, grace: Duration) -> ClusterResult<()> {
        let mut inner = self.locked();
        let id = format!("{namespace}/{name}");

        if inner.forbid_evictions {
            return Err(ClusterError::Forbidden(format!("eviction of {id}")));
        }

        let Some(workload) = inner.workloads.get(&id) else {
            return Err(ClusterError::NotFound(id));
        };

        // Server-side budget enforcement, same as the real eviction API.
        for budget in &inner.budgets {
            if budget.namespace == namespace
                && budget.matches(workload)
                && !budget.allows_disruption()
            {
                return Err(ClusterError::DisruptionDenied(format!(
                    "{} blocks eviction of {id}",
                    budget.name
                )));
            }
        }

        inner.workloads.remove(&id);
        inner.evicted.push(id.clone());
        debug!(workload = %id, grace_secs = grace.as_secs(), "workload evicted");
        Ok(())
    }

    async fn upsert_audit(&self, record: &AuditRecord) -> ClusterResult<()> {
        let mut inner = self.locked();
        if inner.fail_reads {
            return Err(ClusterError::Transport("injected write failure".into()));
        }
        let key = record.record_key();
        inner
            .audits
            .entry(key.clone())
            .and_modify(|existing| {
                existing.count += 1;
                existing.last_seen = record.last_seen;
                existing.target_machine = record.target_machine.clone();
                existing.outcome = record.outcome;
                existing.reason = record.reason.clone();
            })
            .or_insert_with(|| record.clone());
        debug!(%key, "audit record upserted");
        Ok(())
    }
}

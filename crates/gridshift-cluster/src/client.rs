//! The cluster API trait consumed by the rebalancer.
//!
//! Implementations wrap the real cluster client; [`crate::InMemoryCluster`]
//! backs tests and standalone mode. Watch/event delivery and
//! optimistic-concurrency retry live with the implementation, not here.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClusterResult;
use crate::types::{AuditRecord, DisruptionBudget, MachineInfo, WorkloadSpec};

/// Operations GridShift needs from the cluster.
///
/// All calls are logically synchronous from the sweep's point of view: the
/// loop awaits each result before moving on, so a sweep can be delayed by
/// latency but never preempted mid-flight.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List every machine in the cluster.
    async fn list_machines(&self) -> ClusterResult<Vec<MachineInfo>>;

    /// List the workloads currently resident on a machine.
    async fn list_workloads_on(&self, machine: &str) -> ClusterResult<Vec<WorkloadSpec>>;

    /// Fetch a single workload, or `None` if it no longer exists.
    async fn get_workload(
        &self,
        namespace: &str,
        name: &str,
    ) -> ClusterResult<Option<WorkloadSpec>>;

    /// List disruption budgets in a namespace.
    async fn list_budgets(&self, namespace: &str) -> ClusterResult<Vec<DisruptionBudget>>;

    /// Issue an eviction request with the given grace period.
    ///
    /// Removal only — the external orchestrator reschedules the workload.
    async fn evict(&self, namespace: &str, name: &str, grace: Duration) -> ClusterResult<()>;

    /// Create or update an audit record, keyed by
    /// [`AuditRecord::record_key`]. Never duplicates.
    async fn upsert_audit(&self, record: &AuditRecord) -> ClusterResult<()>;
}

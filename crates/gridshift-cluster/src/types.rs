//! Domain types for the GridShift cluster surface.
//!
//! These mirror what the external cluster API serves: machines, workloads,
//! disruption budgets, and the audit records GridShift writes back. All
//! types are serializable and treated as read-only snapshots within a
//! sweep.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a machine.
pub type MachineId = String;

/// Unique identifier for a workload (`{namespace}/{name}`).
pub type WorkloadId = String;

/// Label key that opts a machine into rebalancing.
pub const BALANCING_LABEL: &str = "gridshift/enabled";

/// Annotation key for the tri-state evictability override on a workload.
pub const EVICTABLE_ANNOTATION: &str = "gridshift/evictable";

// ── Machine ───────────────────────────────────────────────────────

/// A machine as reported by the cluster API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineInfo {
    pub id: MachineId,
    /// Total CPU on the machine, in millicores.
    pub capacity_cpu_millis: u64,
    /// Total memory on the machine, in bytes.
    pub capacity_memory_bytes: u64,
    /// CPU available for workload scheduling, in millicores.
    pub allocatable_cpu_millis: u64,
    /// Memory available for workload scheduling, in bytes.
    pub allocatable_memory_bytes: u64,
    /// Arbitrary labels, including the opt-in marker.
    pub labels: HashMap<String, String>,
}

impl MachineInfo {
    /// Whether this machine carries the opt-in marker for rebalancing.
    pub fn balancing_enabled(&self) -> bool {
        self.labels.contains_key(BALANCING_LABEL)
    }
}

// ── Workload ──────────────────────────────────────────────────────

/// Declared resource requests for one sub-component of a workload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    /// Declared CPU request in millicores.
    pub cpu_request_millis: u64,
    /// Declared memory request in bytes.
    pub memory_request_bytes: u64,
}

/// A schedulable workload resident on a machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadSpec {
    pub namespace: String,
    pub name: String,
    /// The machine this workload currently runs on.
    pub machine_id: MachineId,
    /// Sub-components whose declared requests are summed for accounting.
    pub containers: Vec<ContainerSpec>,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    /// Termination already in progress; such workloads are never touched.
    pub terminating: bool,
    /// Hard placement constraint — the workload must not move.
    pub pinned: bool,
}

impl WorkloadSpec {
    /// Composite `{namespace}/{name}` identifier.
    pub fn id(&self) -> WorkloadId {
        format!("{}/{}", self.namespace, self.name)
    }

    /// Summed declared CPU request across all containers, in millicores.
    pub fn cpu_request_millis(&self) -> u64 {
        self.containers.iter().map(|c| c.cpu_request_millis).sum()
    }

    /// Summed declared memory request across all containers, in bytes.
    pub fn memory_request_bytes(&self) -> u64 {
        self.containers.iter().map(|c| c.memory_request_bytes).sum()
    }

    /// The explicit evictability override, if the annotation is set.
    ///
    /// An unparseable value counts as `false`.
    pub fn evictable_override(&self) -> Option<bool> {
        self.annotations
            .get(EVICTABLE_ANNOTATION)
            .map(|v| v.trim().parse::<bool>().unwrap_or(false))
    }
}

// ── Disruption budget ─────────────────────────────────────────────

/// External availability policy limiting simultaneous disruptions.
///
/// Read-only during a sweep; consulted, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisruptionBudget {
    pub namespace: String,
    pub name: String,
    /// Label selector: every pair must match the workload's labels.
    /// An empty selector matches nothing.
    pub selector: HashMap<String, String>,
    pub min_available: u32,
    pub current_healthy: u32,
}

impl DisruptionBudget {
    /// Whether this budget covers the given workload.
    pub fn matches(&self, workload: &WorkloadSpec) -> bool {
        if self.selector.is_empty() {
            return false;
        }
        self.selector
            .iter()
            .all(|(k, v)| workload.labels.get(k).is_some_and(|wv| wv == v))
    }

    /// Whether one more disruption is currently permitted.
    pub fn allows_disruption(&self) -> bool {
        self.current_healthy > self.min_available
    }
}

// ── Audit ─────────────────────────────────────────────────────────

/// Outcome recorded for a relocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The eviction request was accepted.
    Relocated,
    /// The workload was already gone when the eviction was issued.
    AlreadyGone,
}

/// Structured audit record describing a relocation, exposed for external
/// observability tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditRecord {
    pub namespace: String,
    /// Name of the relocated workload.
    pub workload: String,
    pub source_machine: MachineId,
    pub target_machine: MachineId,
    pub outcome: AuditOutcome,
    pub reason: String,
    /// How many times this record has been written.
    pub count: u32,
    /// Unix timestamp (seconds) of the first write.
    pub first_seen: u64,
    /// Unix timestamp (seconds) of the most recent write.
    pub last_seen: u64,
}

impl AuditRecord {
    /// Deterministic key for create-or-update semantics. Repeated sweeps
    /// touching the same workload update one record instead of duplicating.
    pub fn record_key(&self) -> String {
        format!("{}/{}-rebalance", self.namespace, self.workload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_workload(namespace: &str, name: &str) -> WorkloadSpec {
        WorkloadSpec {
            namespace: namespace.to_string(),
            name: name.to_string(),
            machine_id: "m1".to_string(),
            containers: vec![
                ContainerSpec {
                    name: "app".to_string(),
                    cpu_request_millis: 500,
                    memory_request_bytes: 256 * 1024 * 1024,
                },
                ContainerSpec {
                    name: "sidecar".to_string(),
                    cpu_request_millis: 100,
                    memory_request_bytes: 64 * 1024 * 1024,
                },
            ],
            labels: HashMap::new(),
            annotations: HashMap::new(),
            terminating: false,
            pinned: false,
        }
    }

    #[test]
    fn requests_sum_across_containers() {
        let w = make_workload("default", "api");
        assert_eq!(w.cpu_request_millis(), 600);
        assert_eq!(w.memory_request_bytes(), 320 * 1024 * 1024);
    }

    #[test]
    fn balancing_marker_is_presence_based() {
        let mut machine = MachineInfo {
            id: "m1".to_string(),
            capacity_cpu_millis: 4000,
            capacity_memory_bytes: 8_000_000_000,
            allocatable_cpu_millis: 4000,
            allocatable_memory_bytes: 8_000_000_000,
            labels: HashMap::new(),
        };
        assert!(!machine.balancing_enabled());

        // Any value counts — the marker is presence, not truthiness.
        machine
            .labels
            .insert(BALANCING_LABEL.to_string(), String::new());
        assert!(machine.balancing_enabled());
    }

    #[test]
    fn evictable_override_tri_state() {
        let mut w = make_workload("default", "api");
        assert_eq!(w.evictable_override(), None);

        w.annotations
            .insert(EVICTABLE_ANNOTATION.to_string(), "true".to_string());
        assert_eq!(w.evictable_override(), Some(true));

        w.annotations
            .insert(EVICTABLE_ANNOTATION.to_string(), "false".to_string());
        assert_eq!(w.evictable_override(), Some(false));

        w.annotations
            .insert(EVICTABLE_ANNOTATION.to_string(), "maybe".to_string());
        assert_eq!(w.evictable_override(), Some(false));
    }

    #[test]
    fn budget_matches_on_full_selector_subset() {
        let mut w = make_workload("default", "api");
        w.labels.insert("app".to_string(), "api".to_string());
        w.labels.insert("tier".to_string(), "web".to_string());

        let mut budget = DisruptionBudget {
            namespace: "default".to_string(),
            name: "api-budget".to_string(),
            selector: HashMap::from([("app".to_string(), "api".to_string())]),
            min_available: 1,
            current_healthy: 2,
        };
        assert!(budget.matches(&w));

        budget
            .selector
            .insert("tier".to_string(), "batch".to_string());
        assert!(!budget.matches(&w));
    }

    #[test]
    fn empty_selector_matches_nothing() {
        let w = make_workload("default", "api");
        let budget = DisruptionBudget {
            namespace: "default".to_string(),
            name: "broad".to_string(),
            selector: HashMap::new(),
            min_available: 0,
            current_healthy: 5,
        };
        assert!(!budget.matches(&w));
    }

    #[test]
    fn budget_allows_disruption_only_above_minimum() {
        let budget = DisruptionBudget {
            namespace: "default".to_string(),
            name: "b".to_string(),
            selector: HashMap::from([("app".to_string(), "api".to_string())]),
            min_available: 2,
            current_healthy: 2,
        };
        assert!(!budget.allows_disruption());

        let roomy = DisruptionBudget {
            current_healthy: 3,
            ..budget
        };
        assert!(roomy.allows_disruption());
    }

    #[test]
    fn audit_key_is_deterministic() {
        let record = AuditRecord {
            namespace: "default".to_string(),
            workload: "api".to_string(),
            source_machine: "over".to_string(),
            target_machine: "under".to_string(),
            outcome: AuditOutcome::Relocated,
            reason: "rebalanced".to_string(),
            count: 1,
            first_seen: 1000,
            last_seen: 1000,
        };
        assert_eq!(record.record_key(), "default/api-rebalance");
    }
}

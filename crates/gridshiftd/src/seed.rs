//! TOML seed files for standalone mode.
//!
//! Describes machines, workloads, and budgets to preload into the
//! in-memory cluster:
//!
//! ```text
//! [[machines]]
//! id = "over"
//! cpu_millis = 4000
//! memory_bytes = 8000000000
//!
//! [[workloads]]
//! name = "big"
//! machine = "over"
//! cpu_millis = 2000
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use gridshift_cluster::{
    BALANCING_LABEL, ContainerSpec, DisruptionBudget, InMemoryCluster, MachineInfo, WorkloadSpec,
};

#[derive(Debug, Default, Deserialize)]
pub struct ClusterSeed {
    #[serde(default)]
    machines: Vec<MachineSeed>,
    #[serde(default)]
    workloads: Vec<WorkloadSeed>,
    #[serde(default)]
    budgets: Vec<BudgetSeed>,
}

#[derive(Debug, Deserialize)]
struct MachineSeed {
    id: String,
    cpu_millis: u64,
    memory_bytes: u64,
    #[serde(default)]
    labels: HashMap<String, String>,
    /// Whether the machine opts into rebalancing. Defaults to true.
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct WorkloadSeed {
    #[serde(default = "default_namespace")]
    namespace: String,
    name: String,
    machine: String,
    #[serde(default)]
    cpu_millis: u64,
    #[serde(default)]
    memory_bytes: u64,
    #[serde(default)]
    labels: HashMap<String, String>,
    #[serde(default)]
    annotations: HashMap<String, String>,
    #[serde(default)]
    terminating: bool,
    #[serde(default)]
    pinned: bool,
}

#[derive(Debug, Deserialize)]
struct BudgetSeed {
    #[serde(default = "default_namespace")]
    namespace: String,
    name: String,
    #[serde(default)]
    selector: HashMap<String, String>,
    min_available: u32,
    current_healthy: u32,
}

fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    "default".to_string()
}

impl ClusterSeed {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let seed: ClusterSeed = toml::from_str(&content)?;
        Ok(seed)
    }

    /// Load the seed into an in-memory cluster.
    pub fn populate(&self, cluster: &InMemoryCluster) {
        for m in &self.machines {
            let mut labels = m.labels.clone();
            if m.enabled {
                labels
                    .entry(BALANCING_LABEL.to_string())
                    .or_insert_with(|| "true".to_string());
            }
            cluster.add_machine(MachineInfo {
                id: m.id.clone(),
                capacity_cpu_millis: m.cpu_millis,
                capacity_memory_bytes: m.memory_bytes,
                allocatable_cpu_millis: m.cpu_millis,
                allocatable_memory_bytes: m.memory_bytes,
                labels,
            });
        }

        for w in &self.workloads {
            cluster.add_workload(WorkloadSpec {
                namespace: w.namespace.clone(),
                name: w.name.clone(),
                machine_id: w.machine.clone(),
                containers: vec![ContainerSpec {
                    name: "main".to_string(),
                    cpu_request_millis: w.cpu_millis,
                    memory_request_bytes: w.memory_bytes,
                }],
                labels: w.labels.clone(),
                annotations: w.annotations.clone(),
                terminating: w.terminating,
                pinned: w.pinned,
            });
        }

        for b in &self.budgets {
            cluster.add_budget(DisruptionBudget {
                namespace: b.namespace.clone(),
                name: b.name.clone(),
                selector: b.selector.clone(),
                min_available: b.min_available,
                current_healthy: b.current_healthy,
            });
        }
    }
}

//! Per-machine usage analysis over declared reservations.

use gridshift_cluster::{MachineId, MachineInfo, WorkloadSpec};

/// Ephemeral per-machine usage aggregate.
///
/// Computed fresh every sweep and never persisted. The placement pass
/// mutates the percentages in place to reflect placements that have been
/// decided within the same sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSnapshot {
    pub machine_id: MachineId,
    /// CPU available for scheduling on this machine, in millicores.
    pub allocatable_cpu_millis: u64,
    /// Memory available for scheduling on this machine, in bytes.
    pub allocatable_memory_bytes: u64,
    /// Percentage of allocatable CPU committed by requests, in [0, 100].
    pub cpu_pct: f64,
    /// Percentage of allocatable memory committed by requests, in [0, 100].
    pub memory_pct: f64,
    /// Workloads resident on the machine when the snapshot was taken.
    pub workloads: Vec<WorkloadSpec>,
}

/// Build a usage snapshot for one machine and its resident workloads.
///
/// Sums declared requests across every container of every workload and
/// expresses each dimension as a percentage of the machine's allocatable
/// capacity. Pure; no side effects.
pub fn analyze(machine: &MachineInfo, workloads: Vec<WorkloadSpec>) -> UsageSnapshot {
    let cpu_total: u64 = workloads.iter().map(|w| w.cpu_request_millis()).sum();
    let memory_total: u64 = workloads.iter().map(|w| w.memory_request_bytes()).sum();

    UsageSnapshot {
        machine_id: machine.id.clone(),
        allocatable_cpu_millis: machine.allocatable_cpu_millis,
        allocatable_memory_bytes: machine.allocatable_memory_bytes,
        cpu_pct: percentage(cpu_total, machine.allocatable_cpu_millis),
        memory_pct: percentage(memory_total, machine.allocatable_memory_bytes),
        workloads,
    }
}

/// Committed fraction of allocatable capacity, clamped to [0, 100].
///
/// Zero allocatable capacity reports 0 — the dimension carries no
/// constraint rather than dividing by zero.
fn percentage(requested: u64, allocatable: u64) -> f64 {
    if allocatable == 0 {
        return 0.0;
    }
    (requested as f64 / allocatable as f64 * 100.0).clamp(0.0, 100.0)
}

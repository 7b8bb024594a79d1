//! Best-fit destination scoring for one relocation candidate.
//!
//! For each underutilized machine, project what its usage would look like
//! with the candidate placed on it; the lowest combined projection wins.
//! The chosen snapshot is charged immediately once the placement is
//! decided, so later candidates in the same sweep never pile onto an
//! already-filled machine.

use tracing::debug;

use gridshift_cluster::WorkloadSpec;
use gridshift_usage::UsageSnapshot;

/// Hypothetical (cpu%, memory%) on `target` after placing `workload`.
///
/// The request is converted into an additive percentage of the target's
/// own allocatable capacity; a zero-capacity dimension adds nothing.
pub fn projected_usage(workload: &WorkloadSpec, target: &UsageSnapshot) -> (f64, f64) {
    let cpu = target.cpu_pct
        + additive_pct(workload.cpu_request_millis(), target.allocatable_cpu_millis);
    let memory = target.memory_pct
        + additive_pct(
            workload.memory_request_bytes(),
            target.allocatable_memory_bytes,
        );
    (cpu, memory)
}

fn additive_pct(request: u64, allocatable: u64) -> f64 {
    if allocatable == 0 {
        return 0.0;
    }
    request as f64 / allocatable as f64 * 100.0
}

/// Pick the destination with the best remaining headroom after placement.
///
/// Returns the index into `targets` of the minimum-score machine, ties
/// going to the first one encountered. The workload's own machine is never
/// a destination. `None` means the workload stays put for this sweep.
pub fn best_target(workload: &WorkloadSpec, targets: &[UsageSnapshot]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, target) in targets.iter().enumerate() {
        if target.machine_id == workload.machine_id {
            continue;
        }

        let (cpu, memory) = projected_usage(workload, target);
        let score = cpu + memory;

        // Strict less-than keeps the first-encountered target on ties.
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((idx, score));
        }
    }

    best.map(|(idx, score)| {
        debug!(
            workload = %workload.id(),
            machine = %targets[idx].machine_id,
            score,
            "destination scored"
        );
        idx
    })
}

/// Charge a decided placement against the destination snapshot.
///
/// Called once the destination is chosen and before the eviction is
/// attempted; the snapshot keeps its clamped-percentage invariant.
pub fn commit_placement(workload: &WorkloadSpec, target: &mut UsageSnapshot) {
    let (cpu, memory) = projected_usage(workload, target);
    target.cpu_pct = cpu.clamp(0.0, 100.0);
    target.memory_pct = memory.clamp(0.0, 100.0);
    debug!(
        workload = %workload.id(),
        machine = %target.machine_id,
        cpu_pct = target.cpu_pct,
        memory_pct = target.memory_pct,
        "placement committed"
    );
}

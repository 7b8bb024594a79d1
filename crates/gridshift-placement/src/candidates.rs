//! Eviction candidate selection.

use gridshift_cluster::WorkloadSpec;

/// Namespaces whose workloads are never relocated absent an explicit
/// override.
pub const RESERVED_NAMESPACES: &[&str] = &["grid-system"];

/// Whether a workload may be relocated.
///
/// A terminating workload is never touched, even with an override. The
/// explicit override, when set, decides directly; otherwise the workload
/// must be outside reserved namespaces and carry no hard placement
/// constraint.
pub fn is_evictable(workload: &WorkloadSpec) -> bool {
    if workload.terminating {
        return false;
    }

    if let Some(forced) = workload.evictable_override() {
        return forced;
    }

    if RESERVED_NAMESPACES.contains(&workload.namespace.as_str()) {
        return false;
    }

    !workload.pinned
}

/// Coarse relocation weight: CPU millicores plus memory in MiB.
///
/// The two dimensions are summed into one figure, not ranked separately.
pub fn combined_weight(workload: &WorkloadSpec) -> u64 {
    workload.cpu_request_millis() + workload.memory_request_bytes() / (1024 * 1024)
}

/// Filter an overloaded machine's workloads to relocation candidates,
/// ordered largest consumer first. The sort is stable, so equal weights
/// keep their original order.
pub fn select_candidates(workloads: &[WorkloadSpec]) -> Vec<WorkloadSpec> {
    let mut candidates: Vec<WorkloadSpec> = workloads
        .iter()
        .filter(|w| is_evictable(w))
        .cloned()
        .collect();
    candidates.sort_by(|a, b| combined_weight(b).cmp(&combined_weight(a)));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridshift_cluster::{ContainerSpec, EVICTABLE_ANNOTATION};
    use std::collections::HashMap;

    fn make_workload(name: &str, cpu_millis: u64, memory_bytes: u64) -> WorkloadSpec {
        WorkloadSpec {
            namespace: "default".to_string(),
            name: name.to_string(),
            machine_id: "over".to_string(),
            containers: vec![ContainerSpec {
                name: "main".to_string(),
                cpu_request_millis: cpu_millis,
                memory_request_bytes: memory_bytes,
            }],
            labels: HashMap::new(),
            annotations: HashMap::new(),
            terminating: false,
            pinned: false,
        }
    }

    #[test]
    fn terminating_workload_is_never_evictable() {
        let mut w = make_workload("a", 100, 0);
        w.terminating = true;
        assert!(!is_evictable(&w));

        // Not even with a forced-true override.
        w.annotations
            .insert(EVICTABLE_ANNOTATION.to_string(), "true".to_string());
        assert!(!is_evictable(&w));
    }

    #[test]
    fn override_decides_directly() {
        let mut pinned = make_workload("a", 100, 0);
        pinned.pinned = true;
        assert!(!is_evictable(&pinned));

        pinned
            .annotations
            .insert(EVICTABLE_ANNOTATION.to_string(), "true".to_string());
        assert!(is_evictable(&pinned));

        let mut plain = make_workload("b", 100, 0);
        plain
            .annotations
            .insert(EVICTABLE_ANNOTATION.to_string(), "false".to_string());
        assert!(!is_evictable(&plain));
    }

    #[test]
    fn reserved_namespace_is_excluded() {
        let mut w = make_workload("core-dns", 100, 0);
        w.namespace = "grid-system".to_string();
        assert!(!is_evictable(&w));

        // The override still wins over the namespace rule.
        w.annotations
            .insert(EVICTABLE_ANNOTATION.to_string(), "true".to_string());
        assert!(is_evictable(&w));
    }

    #[test]
    fn plain_workload_is_evictable() {
        assert!(is_evictable(&make_workload("a", 100, 0)));
    }

    #[test]
    fn candidates_ordered_largest_first() {
        let workloads = vec![
            make_workload("small", 100, 64 * 1024 * 1024),
            make_workload("big", 2000, 1024 * 1024 * 1024),
            make_workload("medium", 1000, 128 * 1024 * 1024),
        ];

        let candidates = select_candidates(&workloads);
        let names: Vec<&str> = candidates.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["big", "medium", "small"]);
    }

    #[test]
    fn weight_sums_cpu_and_memory_coarsely() {
        // 500m CPU + 512 MiB memory → 500 + 512.
        let w = make_workload("a", 500, 512 * 1024 * 1024);
        assert_eq!(combined_weight(&w), 1012);
    }

    #[test]
    fn equal_weights_keep_original_order() {
        let workloads = vec![
            make_workload("first", 500, 0),
            make_workload("second", 500, 0),
        ];
        let candidates = select_candidates(&workloads);
        let names: Vec<&str> = candidates.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn filtered_workloads_are_dropped() {
        let mut terminating = make_workload("gone", 5000, 0);
        terminating.terminating = true;
        let workloads = vec![terminating, make_workload("stays", 100, 0)];

        let candidates = select_candidates(&workloads);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "stays");
    }
}

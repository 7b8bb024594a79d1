//! Machine classification against fixed usage thresholds.

use serde::{Deserialize, Serialize};

use crate::usage::UsageSnapshot;

/// Usage thresholds (percentages) for the classification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub cpu_high: f64,
    pub cpu_low: f64,
    pub memory_high: f64,
    pub memory_low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_high: 60.0,
            cpu_low: 40.0,
            memory_high: 60.0,
            memory_low: 40.0,
        }
    }
}

/// Load classification of a machine for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Either dimension exceeds its high threshold.
    Overloaded,
    /// Both dimensions are below their low thresholds.
    Underutilized,
    /// Neither; inert for this sweep.
    Balanced,
}

/// Classify a usage snapshot.
///
/// The rule is asymmetric on purpose: one hot dimension flags a machine as
/// overloaded, while both dimensions must be cold before the machine is
/// treated as having spare room. Given high > low the two classes cannot
/// overlap. Pure function of the snapshot; idempotent.
pub fn classify(snapshot: &UsageSnapshot, thresholds: &Thresholds) -> Classification {
    if snapshot.cpu_pct > thresholds.cpu_high || snapshot.memory_pct > thresholds.memory_high {
        Classification::Overloaded
    } else if snapshot.cpu_pct < thresholds.cpu_low && snapshot.memory_pct < thresholds.memory_low {
        Classification::Underutilized
    } else {
        Classification::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(cpu_pct: f64, memory_pct: f64) -> UsageSnapshot {
        UsageSnapshot {
            machine_id: "m1".to_string(),
            allocatable_cpu_millis: 4000,
            allocatable_memory_bytes: 8_000_000_000,
            cpu_pct,
            memory_pct,
            workloads: vec![],
        }
    }

    #[test]
    fn either_hot_dimension_means_overloaded() {
        let t = Thresholds::default();
        assert_eq!(classify(&snapshot(75.0, 10.0), &t), Classification::Overloaded);
        assert_eq!(classify(&snapshot(10.0, 75.0), &t), Classification::Overloaded);
        assert_eq!(classify(&snapshot(75.0, 75.0), &t), Classification::Overloaded);
    }

    #[test]
    fn underutilized_requires_both_dimensions_cold() {
        let t = Thresholds::default();
        assert_eq!(
            classify(&snapshot(30.0, 30.0), &t),
            Classification::Underutilized
        );
        // One cold dimension is not enough.
        assert_eq!(classify(&snapshot(30.0, 50.0), &t), Classification::Balanced);
        assert_eq!(classify(&snapshot(50.0, 30.0), &t), Classification::Balanced);
    }

    #[test]
    fn thresholds_are_strict_comparisons() {
        let t = Thresholds::default();
        assert_eq!(classify(&snapshot(60.0, 60.0), &t), Classification::Balanced);
        assert_eq!(classify(&snapshot(40.0, 40.0), &t), Classification::Balanced);
        assert_eq!(
            classify(&snapshot(60.1, 10.0), &t),
            Classification::Overloaded
        );
        assert_eq!(
            classify(&snapshot(39.9, 39.9), &t),
            Classification::Underutilized
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let t = Thresholds::default();
        let snap = snapshot(45.0, 20.0);
        assert_eq!(classify(&snap, &t), classify(&snap, &t));
    }
}

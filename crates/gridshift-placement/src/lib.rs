//! gridshift-placement — who moves, and where to.
//!
//! Two pure passes over sweep-local state:
//!
//! - **`candidates`** — filters an overloaded machine's workloads down to
//!   the ones safe to relocate and orders them largest-first
//! - **`scorer`** — greedy best-fit choice among underutilized machines,
//!   charging each decided placement against the destination immediately
//!   so later candidates in the same sweep see the filled capacity

pub mod candidates;
pub mod scorer;

pub use candidates::{combined_weight, is_evictable, select_candidates};
pub use scorer::{best_target, commit_placement, projected_usage};

//! gridshift-usage — resource accounting and machine classification.
//!
//! Computes, per machine, how much of the reservable capacity is already
//! committed by declared requests (not measured consumption), and labels
//! the machine Overloaded, Underutilized, or Balanced against fixed
//! thresholds.
//!
//! # Components
//!
//! - **`usage`** — `analyze()` builds a sweep-local [`UsageSnapshot`]
//! - **`classify`** — threshold policy and the classification rule

pub mod classify;
pub mod usage;

pub use classify::{Classification, Thresholds, classify};
pub use usage::{UsageSnapshot, analyze};

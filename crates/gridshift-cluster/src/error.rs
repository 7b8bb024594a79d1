//! Error types for cluster API operations.
//!
//! The variants mirror the outcome kinds the rebalancer has to tell apart;
//! callers match on them instead of inspecting error text.

use thiserror::Error;

/// Result type alias for cluster API operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors returned by a [`crate::ClusterApi`] implementation.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The referenced object does not exist (anymore).
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller lacks permission for the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// An eviction was denied because it would violate a disruption budget.
    #[error("eviction denied by disruption budget: {0}")]
    DisruptionDenied(String),

    /// Optimistic-concurrency conflict. Retried by the hosting framework,
    /// never handled inside a sweep.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transient transport/read failure.
    #[error("transport error: {0}")]
    Transport(String),
}

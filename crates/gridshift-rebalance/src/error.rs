//! Rebalancer error types.

use thiserror::Error;

use gridshift_cluster::ClusterError;

/// Result type alias for rebalancing operations.
pub type RebalanceResult<T> = Result<T, RebalanceError>;

/// Fatal errors from a sweep or a single relocation.
///
/// Expected outcomes (budget skips, already-gone workloads) never surface
/// here; they are [`crate::RelocationOutcome`] variants.
#[derive(Debug, Error)]
pub enum RebalanceError {
    /// The cluster refused the eviction for lack of permission.
    #[error("relocation forbidden for {workload}")]
    Forbidden {
        workload: String,
        #[source]
        source: ClusterError,
    },

    /// Any other cluster API failure.
    #[error("cluster api error: {0}")]
    Cluster(#[from] ClusterError),
}

use thiserror::Error;

/// A point-in-time copy of a database instance's storage, identified by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDescriptor {
    pub identifier: String,
    pub status: Option<String>,
}

/// Errors reported by a snapshot provider.
///
/// `NotFound` is the one recoverable case: callers turn it into "the snapshot
/// does not exist". Everything else is fatal and carries the provider's
/// message unaltered.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("snapshot {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Api(String),

    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The control-plane operations needed to manage database snapshots.
#[async_trait::async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Look up a snapshot by identifier. Returns `ProviderError::NotFound`
    /// when no snapshot with that identifier exists.
    async fn find_snapshot(&self, name: &str) -> Result<SnapshotDescriptor, ProviderError>;

    /// Delete the named snapshot.
    async fn delete_snapshot(&self, name: &str) -> Result<(), ProviderError>;

    /// Copy an existing snapshot to a new identifier.
    async fn copy_snapshot(&self, source: &str, target: &str) -> Result<(), ProviderError>;
}

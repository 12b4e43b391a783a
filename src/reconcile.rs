use serde::Serialize;
use thiserror::Error;

use crate::provider::{ProviderError, SnapshotProvider};

/// The state a snapshot should be reconciled to.
#[derive(clap::ArgEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DesiredState {
    Present,
    Absent,
}

/// One reconciliation to perform: bring the snapshot named `name` to `state`.
///
/// Snapshot identifiers are case-insensitive; they are normalized to lowercase
/// before any provider call. `source_snapshot` is only meaningful for
/// `DesiredState::Present`.
#[derive(Debug, Clone)]
pub struct ReconcileRequest {
    pub state: DesiredState,
    pub name: String,
    pub source_snapshot: Option<String>,
}

/// Whether reconciliation had to change anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub changed: bool,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("parameter {0} required")]
    MissingParameter(&'static str),

    #[error("parameter {0} required for state=present")]
    RequiredForPresent(&'static str),

    #[error("parameter {0} not allowed for state=absent")]
    NotAllowedForAbsent(&'static str),

    #[error("source snapshot {0} was not found")]
    SourceNotFound(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Compare the desired state of a snapshot against what the provider reports
/// and issue the single mutating call, if any, needed to align them.
///
/// Validation happens before any provider call. At most one of
/// `delete_snapshot` or `copy_snapshot` is invoked per call, and nothing is
/// retried: any provider error other than "not found" on the existence checks
/// aborts immediately.
pub async fn reconcile(
    request: &ReconcileRequest,
    provider: &dyn SnapshotProvider,
) -> Result<ReconcileOutcome, ReconcileError> {
    if request.name.is_empty() {
        return Err(ReconcileError::MissingParameter("name"));
    }

    let name = request.name.to_lowercase();

    let changed = match request.state {
        DesiredState::Absent => {
            if let Some(source) = request.source_snapshot.as_deref() {
                if !source.is_empty() {
                    return Err(ReconcileError::NotAllowedForAbsent("source_snapshot"));
                }
            }

            if snapshot_exists(provider, &name).await? {
                provider.delete_snapshot(&name).await?;
                true
            } else {
                false
            }
        }
        DesiredState::Present => {
            let source = match request.source_snapshot.as_deref() {
                Some(source) if !source.is_empty() => source.to_lowercase(),
                _ => return Err(ReconcileError::RequiredForPresent("source_snapshot")),
            };

            if snapshot_exists(provider, &name).await? {
                // An existing target satisfies `present` no matter what it was
                // copied from; the copy is not re-attempted and lineage is not
                // checked.
                false
            } else {
                if !snapshot_exists(provider, &source).await? {
                    return Err(ReconcileError::SourceNotFound(source));
                }

                provider.copy_snapshot(&source, &name).await?;
                true
            }
        }
    };

    Ok(ReconcileOutcome { changed })
}

async fn snapshot_exists(
    provider: &dyn SnapshotProvider,
    name: &str,
) -> Result<bool, ProviderError> {
    match provider.find_snapshot(name).await {
        Ok(_) => Ok(true),
        Err(ProviderError::NotFound(_)) => Ok(false),
        Err(err) => Err(err),
    }
}

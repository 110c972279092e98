//! Hook for mirroring drafts to an external store (for example a shared git
//! checkout). Sync is best effort: a failed pull or publish is logged and
//! never fails the local save.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("draft sync failed: {0}")]
pub struct SyncError(pub String);

pub trait DraftSync {
    /// Fetch drafts written elsewhere.
    fn pull(&self) -> Result<(), SyncError>;
    /// Publish local changes with a short description.
    fn publish(&self, message: &str) -> Result<(), SyncError>;
}

/// Local-only operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSync;

impl DraftSync for NoSync {
    fn pull(&self) -> Result<(), SyncError> {
        Ok(())
    }

    fn publish(&self, _message: &str) -> Result<(), SyncError> {
        Ok(())
    }
}

pub(crate) fn pull_quietly(sync: &dyn DraftSync) {
    if let Err(e) = sync.pull() {
        tracing::warn!(error = %e, "draft pull failed; using local drafts");
    }
}

pub(crate) fn publish_quietly(sync: &dyn DraftSync, message: &str) {
    if let Err(e) = sync.publish(message) {
        tracing::warn!(error = %e, message, "draft publish failed; local copy kept");
    }
}

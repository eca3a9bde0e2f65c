//! Error types for relay-sync.
//!
//! Only the variants here abort a pipeline run. Transport failures during
//! seeding, branch reset, and the final mirror push are logged at their
//! origin and the run completes with a degraded [`SyncOutcome`].
//!
//! [`SyncOutcome`]: crate::orchestrator::SyncOutcome

use std::path::PathBuf;

use thiserror::Error;

use relay_core::{ConfigError, PayloadError};

use crate::git::GitError;

/// Fatal errors of a pipeline run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Malformed push payload; nothing was attempted.
    #[error("invalid push payload: {0}")]
    Payload(#[from] PayloadError),

    /// Destination prefix unset; aborted before any git operation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Initial mirror clone failed; the event cannot proceed.
    #[error("mirror clone failed: {0}")]
    Clone(#[source] GitError),

    /// Reconfiguring a remote on the mirror failed.
    #[error("remote configuration failed: {0}")]
    Remote(#[source] GitError),

    /// Refreshing the mirror from the source forge failed.
    #[error("fetch from origin failed: {0}")]
    Fetch(#[source] GitError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

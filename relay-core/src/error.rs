//! Error types for relay-core.

use thiserror::Error;

/// A push-event payload that cannot drive the pipeline.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// `repository.name` or `repository.clone_url` missing from the payload.
    #[error("repository information not found on payload")]
    MissingRepository,
}

/// Required configuration absent from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `CLIENT_REMOTE_PREFIX` unset, so the destination URL cannot be derived.
    #[error("CLIENT_REMOTE_PREFIX is not configured in environment")]
    MissingClientPrefix,
}

//! # relay-sync
//!
//! Mirror maintenance and the per-push sync pipeline.
//!
//! Call [`sync_repository`] with a validated environment [`Config`], a
//! [`GitBackend`], a [`PolicyClassifier`] and the push event; the pipeline
//! clones or refreshes the local bare mirror, reconciles the `origin` and
//! `client` remotes, classifies the pushed diff and either rewinds the
//! offending branch on the source forge or mirrors everything to the client.
//!
//! [`Config`]: relay_core::Config
//! [`PolicyClassifier`]: relay_policy::PolicyClassifier

pub mod diff;
pub mod error;
pub mod git;
pub mod mirror;
pub mod orchestrator;

pub use error::SyncError;
pub use git::{GitBackend, GitCli, GitError};
pub use mirror::{ensure_remote, seed_if_empty, MirrorStore};
pub use orchestrator::{sync_repository, SyncOutcome};

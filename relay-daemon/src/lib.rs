//! Webhook service wiring for the relay mirror pipeline.
//!
//! The daemon owns everything the core pipeline declares out of scope: the
//! HTTP listener that receives forge push payloads, per-repository event
//! serialization, and process-wide setup (configuration, logging, the
//! optional language-model credential).

mod error;
mod locks;
mod server;

pub use error::DaemonError;
pub use locks::RepoLocks;
pub use server::{router, run, AppState};

//! # relay-core
//!
//! Domain types and configuration for the relay mirror service.
//!
//! [`PushEvent`] models the forge push payload that triggers a pipeline run;
//! [`Config`] carries the environment-sourced settings shared by every run.

pub mod config;
pub mod error;
pub mod event;

pub use config::{normalize_remote_prefix, Config};
pub use error::{ConfigError, PayloadError};
pub use event::{PushEvent, Repository};

//! Environment-sourced configuration.
//!
//! Recognized variables:
//!
//! - `LOCAL_REPOS_ROOT`: directory holding the local bare mirrors
//!   (default: `./repos`)
//! - `CLIENT_REMOTE_PREFIX`: base URL under which `<repo>.git` lives on the
//!   client host (required before any remote mutation)
//! - `OPENAI_API_KEY`: credential for the remote classifier stage (optional;
//!   absence disables that stage only)

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Mirror root used when `LOCAL_REPOS_ROOT` is unset.
pub const DEFAULT_REPOS_ROOT: &str = "repos";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one bare mirror per repository name.
    pub repos_root: PathBuf,
    /// Destination URL prefix. Validated per event, not at startup, so a
    /// misconfigured service still answers webhooks with a clear error.
    pub client_remote_prefix: Option<String>,
    /// Credential for the remote classifier stage.
    pub openai_api_key: Option<String>,
}

impl Config {
    /// Read configuration from the process environment. Empty values are
    /// treated the same as unset ones.
    pub fn from_env() -> Self {
        Self {
            repos_root: non_empty_var("LOCAL_REPOS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPOS_ROOT)),
            client_remote_prefix: non_empty_var("CLIENT_REMOTE_PREFIX"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
        }
    }

    /// Destination remote URL for `repo_name`.
    ///
    /// Fails with [`ConfigError::MissingClientPrefix`] when the prefix is
    /// unset; callers must check this before touching any remote.
    pub fn client_remote_url(&self, repo_name: &str) -> Result<String, ConfigError> {
        let prefix = self
            .client_remote_prefix
            .as_deref()
            .ok_or(ConfigError::MissingClientPrefix)?;
        let mut url = normalize_remote_prefix(prefix);
        url.push_str(repo_name);
        url.push_str(".git");
        Ok(url)
    }
}

/// Rewrite an SSH-shorthand prefix (`git@host:path`) to its HTTPS form and
/// guarantee a trailing slash.
pub fn normalize_remote_prefix(prefix: &str) -> String {
    let mut normalized = match ssh_shorthand(prefix) {
        Some((host, path)) => format!("https://{host}/{path}"),
        None => prefix.to_string(),
    };
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn ssh_shorthand(prefix: &str) -> Option<(&str, &str)> {
    let rest = prefix.strip_prefix("git@")?;
    rest.split_once(':')
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

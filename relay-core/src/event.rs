//! Forge push-event payload types.
//!
//! Fields that the forge may omit (first push, branch deletion) are modeled
//! as `Option` so a partial payload still deserializes; validation happens in
//! [`PushEvent::repo`].

use serde::Deserialize;

use crate::error::PayloadError;

/// Repository block of a forge push payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub clone_url: Option<String>,
}

/// A push notification as delivered by the forge webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    /// Full ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    /// Commit id the ref pointed at before the push.
    #[serde(default)]
    pub before: Option<String>,
    /// Commit id the ref points at after the push.
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub repository: Option<Repository>,
}

impl PushEvent {
    /// Repository name and source clone URL.
    ///
    /// Fails with [`PayloadError::MissingRepository`] when either is absent;
    /// nothing else in the pipeline runs on a malformed payload.
    pub fn repo(&self) -> Result<(&str, &str), PayloadError> {
        let repository = self
            .repository
            .as_ref()
            .ok_or(PayloadError::MissingRepository)?;
        match (repository.name.as_deref(), repository.clone_url.as_deref()) {
            (Some(name), Some(url)) if !name.is_empty() && !url.is_empty() => Ok((name, url)),
            _ => Err(PayloadError::MissingRepository),
        }
    }

    /// Branch name: the last path segment of the pushed ref
    /// (`refs/heads/main` yields `main`). `None` when the ref is empty.
    pub fn branch(&self) -> Option<&str> {
        self.ref_name.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

//! Local mirror store, remote reconciliation, and the seed procedure.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};
use crate::git::GitBackend;

/// Maps repository names to local bare mirrors under a root directory.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    root: PathBuf,
}

impl MirrorStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mirror directory for `name` under the store root.
    pub fn mirror_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Open the mirror for `name`, cloning it from `source_url` on first
    /// sight. The store root is created recursively as needed; an existing
    /// mirror is opened without re-cloning.
    pub async fn open_or_create(
        &self,
        git: &dyn GitBackend,
        name: &str,
        source_url: &str,
    ) -> Result<PathBuf, SyncError> {
        if !self.root.exists() {
            tokio::fs::create_dir_all(&self.root)
                .await
                .map_err(|e| io_err(&self.root, e))?;
        }

        let dir = self.mirror_dir(name);
        if !dir.exists() {
            tracing::info!(repo = %name, "cloning new bare mirror");
            git.clone_mirror(source_url, &dir)
                .await
                .map_err(SyncError::Clone)?;
        }
        Ok(dir)
    }
}

/// Make sure remote `name` exists on the mirror and fetches from `url`.
///
/// No mutating git call is issued when the remote already matches.
pub async fn ensure_remote(
    git: &dyn GitBackend,
    dir: &Path,
    name: &str,
    url: &str,
) -> Result<(), SyncError> {
    let remotes = git.remotes(dir).await.map_err(SyncError::Remote)?;
    match remotes.iter().find(|(remote, _)| remote == name) {
        None => git
            .add_remote(dir, name, url)
            .await
            .map_err(SyncError::Remote),
        Some((_, existing)) if existing != url => git
            .set_remote_url(dir, name, url)
            .await
            .map_err(SyncError::Remote),
        Some(_) => Ok(()),
    }
}

/// Bootstrap an empty source repository from the client remote.
///
/// A source advertising zero branch refs would later be mirrored verbatim to
/// the client, wiping whatever the client already holds; instead its content
/// is pulled over from `client` and pushed back to `origin` first. Every
/// failure here is logged and swallowed: an empty source simply stays empty
/// downstream.
pub async fn seed_if_empty(git: &dyn GitBackend, dir: &Path) {
    let heads = match git.list_remote_heads(dir, "origin").await {
        Ok(heads) => heads,
        Err(err) => {
            tracing::warn!(error = %err, "listing origin heads failed, assuming empty source");
            String::new()
        }
    };
    if !heads.trim().is_empty() {
        return;
    }

    tracing::info!("source repository is empty, seeding from client");
    // A verbatim ref fetch, so the client's branches land under refs/heads/
    // on the mirror and survive the mirror push to origin.
    if let Err(err) = git.fetch_mirror(dir, "client").await {
        tracing::warn!(error = %err, "seed fetch from client failed");
        return;
    }
    if let Err(err) = git.push_mirror(dir, "origin").await {
        tracing::warn!(error = %err, "seed push to origin failed");
    }
}

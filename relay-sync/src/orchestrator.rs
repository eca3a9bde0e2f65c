//! The per-event sync pipeline.
//!
//! One [`sync_repository`] call handles one push event end to end: mirror,
//! reconcile remotes, seed, fetch, classify, then either rewind the branch on
//! the source forge or mirror everything to the client. The sequence is
//! linear; there is no retry logic, and a failed non-fatal step degrades the
//! outcome instead of aborting the run.

use std::path::Path;

use serde::Serialize;

use relay_core::{Config, PushEvent};
use relay_policy::PolicyClassifier;

use crate::diff::diff_range;
use crate::error::SyncError;
use crate::git::GitBackend;
use crate::mirror::{ensure_remote, seed_if_empty, MirrorStore};

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SyncOutcome {
    /// Push accepted. `pushed` reports whether the mirror push to the client
    /// remote succeeded; `false` leaves the remotes diverged until the next
    /// event for this repository.
    Accepted { pushed: bool },
    /// Policy violation. `reset` reports whether the branch rewind on the
    /// source forge succeeded. The client remote is never touched on this
    /// path.
    Rejected {
        branch: Option<String>,
        reset: bool,
    },
}

/// Run the full mirror-and-enforce pipeline for one push event.
///
/// Fatal failures (malformed payload, missing destination prefix, clone,
/// remote reconfiguration, or origin-fetch errors) surface as [`SyncError`];
/// everything else is logged where it happens and reported through the
/// returned [`SyncOutcome`].
pub async fn sync_repository(
    config: &Config,
    git: &dyn GitBackend,
    classifier: &PolicyClassifier,
    event: &PushEvent,
) -> Result<SyncOutcome, SyncError> {
    let (name, source_url) = event.repo()?;
    // Resolve the destination before any git operation so a misconfigured
    // service never mutates either remote.
    let client_url = config.client_remote_url(name)?;

    let store = MirrorStore::new(&config.repos_root);
    let dir = store.open_or_create(git, name, source_url).await?;

    // The forge's clone URL is authoritative per event; re-apply it even on
    // a reused mirror in case the upstream address moved.
    ensure_remote(git, &dir, "origin", source_url).await?;
    ensure_remote(git, &dir, "client", &client_url).await?;

    seed_if_empty(git, &dir).await;

    // The webhook may race the actual push propagation; always refresh.
    git.fetch(&dir, "origin").await.map_err(SyncError::Fetch)?;

    let diff = diff_range(git, &dir, event.before.as_deref(), event.after.as_deref()).await;
    if classifier.classify(&diff).await {
        return Ok(reject(git, &dir, name, event).await);
    }

    tracing::info!(repo = %name, "no policy violation detected");
    let pushed = match git.push_mirror(&dir, "client").await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(repo = %name, error = %err, "mirror push to client failed");
            false
        }
    };
    Ok(SyncOutcome::Accepted { pushed })
}

/// Rewind the pushed branch on the source forge to its pre-push commit.
async fn reject(git: &dyn GitBackend, dir: &Path, name: &str, event: &PushEvent) -> SyncOutcome {
    let branch = event.branch().map(str::to_owned);
    tracing::warn!(
        repo = %name,
        branch = branch.as_deref().unwrap_or("<none>"),
        "Indonesian comments detected in push, rejecting",
    );

    let mut reset = false;
    if let (Some(before), Some(branch)) = (event.before.as_deref(), branch.as_deref()) {
        let refspec = format!("{before}:refs/heads/{branch}");
        match git.force_push(dir, "origin", &refspec).await {
            Ok(()) => reset = true,
            Err(err) => {
                tracing::error!(
                    repo = %name,
                    error = %err,
                    "failed to reset branch after policy violation",
                );
            }
        }
    }
    SyncOutcome::Rejected { branch, reset }
}

//! Diff extraction for the classification gate.

use std::path::Path;

use crate::git::GitBackend;

/// Unified diff for the push's `before..after` range on the mirror.
///
/// Returns an empty string when either commit id is absent (first push to a
/// repository, or a branch deletion) and when the diff itself fails; the
/// classifier then sees no candidates and the push passes as clean.
pub async fn diff_range(
    git: &dyn GitBackend,
    dir: &Path,
    before: Option<&str>,
    after: Option<&str>,
) -> String {
    let (Some(before), Some(after)) = (before, after) else {
        return String::new();
    };

    let range = format!("{before}..{after}");
    tracing::info!(range = %range, "computing pushed diff");
    match git.diff(dir, &range).await {
        Ok(diff) => {
            tracing::debug!(bytes = diff.len(), "diff fetched");
            diff
        }
        Err(err) => {
            tracing::warn!(error = %err, "diff failed, treating push as clean");
            String::new()
        }
    }
}

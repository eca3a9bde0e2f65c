//! Per-repository event serialization.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Hands out one lock per repository name.
///
/// Concurrent events for the same repository share an on-disk mirror, so the
/// webhook handler holds the name's lock for the whole pipeline run. Distinct
/// names get distinct locks and proceed concurrently.
#[derive(Debug, Default)]
pub struct RepoLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RepoLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `name`, created on first use and kept for the life of
    /// the process.
    pub async fn for_repo(&self, name: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().await;
        map.entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

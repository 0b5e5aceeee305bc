//! Shared crawl state. Every check-and-mutate happens under a single lock
//! acquisition so concurrent tasks never observe a half-applied update.

use crate::result::Backlink;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// URLs already claimed for fetching during one run. Entries are never removed.
#[derive(Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the caller is the first to claim `url`.
    pub async fn claim(&self, url: &str) -> bool {
        let mut visited = self.inner.lock().await;
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    /// Advisory only: a `false` here can still lose the later claim.
    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

/// Backlinks keyed by target URL; a later source for the same target replaces
/// the earlier one.
#[derive(Clone, Default)]
pub struct BacklinkCollector {
    inner: Arc<Mutex<HashMap<String, Backlink>>>,
}

impl BacklinkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `target` had not been recorded before.
    pub async fn record(&self, source: &str, target: &str) -> bool {
        let mut backlinks = self.inner.lock().await;
        backlinks
            .insert(target.to_string(), Backlink::new(source, target))
            .is_none()
    }

    pub async fn snapshot(&self) -> Vec<Backlink> {
        self.inner.lock().await.values().cloned().collect()
    }

    pub async fn get(&self, target: &str) -> Option<Backlink> {
        self.inner.lock().await.get(target).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

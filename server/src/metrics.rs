//! Request counters for `GET /metrics`.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::{model::MetricsSnapshot, store::TodoStore};

/// Counts inbound requests. Constructed once and handed to the app; clones
/// share the same counter.
#[derive(Clone, Debug, Default)]
pub struct MetricsCollector {
    requests: Arc<AtomicU64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Combines the request counter with the current store size.
    ///
    /// The two reads are not atomic with respect to each other.
    pub async fn snapshot(&self, store: &TodoStore) -> MetricsSnapshot {
        let total_todos = store.len().await;
        MetricsSnapshot {
            requests: self.requests(),
            total_todos,
        }
    }
}

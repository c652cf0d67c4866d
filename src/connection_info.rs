//! Per-connection lifecycle record and connection-id tracking
//!
//! A [`ConnectionInfo`] is created once per proxied connection and shared
//! (via `Arc`) with every statement proxy spawned from it. Commit/rollback
//! counters and the closed flag use atomics because multiple connection
//! proxies may be committed or closed from different threads concurrently,
//! even though no single proxy instance is used concurrently.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use uuid::Uuid;

/// Identifying context and lifecycle counters for one proxied connection
#[derive(Debug)]
pub struct ConnectionInfo {
    data_source_name: String,
    connection_id: String,
    commit_count: AtomicU64,
    rollback_count: AtomicU64,
    closed: AtomicBool,
}

impl ConnectionInfo {
    pub fn new(data_source_name: impl Into<String>, connection_id: impl Into<String>) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            connection_id: connection_id.into(),
            commit_count: AtomicU64::new(0),
            rollback_count: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn increment_commit_count(&self) {
        self.commit_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rollback_count(&self) {
        self.rollback_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn commit_count(&self) -> u64 {
        self.commit_count.load(Ordering::Relaxed)
    }

    pub fn rollback_count(&self) -> u64 {
        self.rollback_count.load(Ordering::Relaxed)
    }

    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

/// Issues connection ids and tracks which ids have been closed
///
/// Shared by every connection proxy created from one configuration.
#[derive(Debug, Default)]
pub struct ConnectionIdManager {
    closed_ids: RwLock<HashSet<String>>,
}

impl ConnectionIdManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id for a new connection proxy
    pub fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Registers an id as closed
    pub fn add_closed_id(&self, id: impl Into<String>) {
        self.closed_ids.write().unwrap().insert(id.into());
    }

    /// Whether the given id has been registered as closed
    pub fn is_closed(&self, id: &str) -> bool {
        self.closed_ids.read().unwrap().contains(id)
    }

    /// Number of connections registered as closed
    pub fn closed_count(&self) -> usize {
        self.closed_ids.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let info = ConnectionInfo::new("ds", "conn-1");
        info.increment_commit_count();
        info.increment_commit_count();
        info.increment_rollback_count();
        assert_eq!(info.commit_count(), 2);
        assert_eq!(info.rollback_count(), 1);
        assert!(!info.is_closed());
        info.mark_closed();
        assert!(info.is_closed());
    }

    #[test]
    fn test_closed_id_tracking() {
        let manager = ConnectionIdManager::new();
        let id = manager.next_id();
        assert!(!manager.is_closed(&id));
        manager.add_closed_id(id.clone());
        assert!(manager.is_closed(&id));
        assert_eq!(manager.closed_count(), 1);
    }
}

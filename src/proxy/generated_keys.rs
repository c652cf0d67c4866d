//! Generated-keys cache and key-request detection
//!
//! Each statement proxy holds at most one live generated-keys handle. A
//! handle that reports itself closed is treated as absent and lazily
//! evicted; stale access is a cache miss, never an error.

use std::sync::Arc;

use crate::delegate::SharedResultSet;
use crate::value::Value;

/// Per-call request flag value asking the driver to return generated keys
pub const RETURN_GENERATED_KEYS: i64 = 1;
/// Per-call request flag value declining generated keys
pub const NO_GENERATED_KEYS: i64 = 2;

/// Whether the arguments of an execute/prepare call request generated keys:
/// a second argument equal to [`RETURN_GENERATED_KEYS`], or a non-empty
/// array of key column indexes or names
pub fn is_auto_generate_enabled(args: &[Value]) -> bool {
    match args.get(1) {
        Some(Value::Int(flag)) => *flag == RETURN_GENERATED_KEYS,
        Some(Value::Array(columns)) => !columns.is_empty(),
        _ => false,
    }
}

/// Single-slot cache for the generated-keys result set of one statement
#[derive(Default)]
pub struct GeneratedKeysCache {
    slot: Option<SharedResultSet>,
}

impl GeneratedKeysCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle if present and still open; a closed handle
    /// is evicted and reported as a miss
    pub fn get(&mut self) -> Option<SharedResultSet> {
        match &self.slot {
            Some(handle) if handle.lock().unwrap().is_closed() => {
                self.slot = None;
                None
            }
            Some(handle) => Some(Arc::clone(handle)),
            None => None,
        }
    }

    /// Stores a handle, overwriting any previous entry
    pub fn put(&mut self, handle: SharedResultSet) {
        self.slot = Some(handle);
    }

    /// Clears the slot without closing the handle (used when the caller
    /// takes ownership of the retrieved keys)
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::{CallOutcome, MethodCall, ResultSetDelegate};
    use crate::error::ProxyResult;
    use std::sync::Mutex;

    struct FakeResultSet {
        closed: bool,
    }

    impl ResultSetDelegate for FakeResultSet {
        fn invoke(&mut self, _call: MethodCall) -> ProxyResult<CallOutcome> {
            Ok(CallOutcome::None)
        }

        fn is_closed(&self) -> bool {
            self.closed
        }

        fn close(&mut self) -> ProxyResult<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn handle(closed: bool) -> SharedResultSet {
        Arc::new(Mutex::new(FakeResultSet { closed }))
    }

    #[test]
    fn test_empty_cache_misses() {
        let mut cache = GeneratedKeysCache::new();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_live_handle_is_returned() {
        let mut cache = GeneratedKeysCache::new();
        cache.put(handle(false));
        assert!(cache.get().is_some());
        // still present on the next access
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_closed_handle_is_lazily_evicted() {
        let mut cache = GeneratedKeysCache::new();
        let keys = handle(false);
        cache.put(Arc::clone(&keys));
        keys.lock().unwrap().close().unwrap();
        assert!(cache.get().is_none());
        // eviction happened, a later live put works again
        cache.put(handle(false));
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_invalidate_clears_without_closing() {
        let mut cache = GeneratedKeysCache::new();
        let keys = handle(false);
        cache.put(Arc::clone(&keys));
        cache.invalidate();
        assert!(cache.get().is_none());
        assert!(!keys.lock().unwrap().is_closed());
    }

    #[test]
    fn test_key_request_detection() {
        let sql = Value::from("INSERT INTO t VALUES (1)");
        assert!(is_auto_generate_enabled(&[sql.clone(), Value::Int(RETURN_GENERATED_KEYS)]));
        assert!(!is_auto_generate_enabled(&[sql.clone(), Value::Int(NO_GENERATED_KEYS)]));
        assert!(is_auto_generate_enabled(&[
            sql.clone(),
            Value::Array(vec![Value::from("id")]),
        ]));
        assert!(!is_auto_generate_enabled(&[sql.clone(), Value::Array(Vec::new())]));
        assert!(!is_auto_generate_enabled(&[sql]));
    }
}

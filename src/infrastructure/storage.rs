//! In-process meter storage.
//!
//! Concurrent key-value map standing in for the browser's persisted storage.
//! Share one instance (behind an `Arc`) between page sessions to model a
//! single visitor coming back to the site.

use crate::application::ports::{MeterBackend, StoreError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Thread-safe meter storage backed by DashMap.
#[derive(Debug)]
pub struct MemoryMeterBackend {
    map: DashMap<String, String>,
    available: AtomicBool,
}

impl MemoryMeterBackend {
    /// Create an empty, available storage.
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Get the raw stored value for a key, bypassing availability.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.map.get(key).map(|value| value.value().clone())
    }

    /// Store a raw value, bypassing availability and formatting.
    ///
    /// Useful to seed corrupted or foreign values.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    /// Simulate storage being disabled (private browsing, quota exceeded).
    ///
    /// While unavailable every read and write fails with
    /// `StoreError::Unavailable`; stored values are kept.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Get the number of stored keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Remove all stored values.
    pub fn clear(&self) {
        self.map.clear();
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("storage disabled".to_string()))
        }
    }
}

impl Default for MemoryMeterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MeterBackend for MemoryMeterBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_available()?;
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_read_missing() {
        let backend = MemoryMeterBackend::new();
        assert_eq!(backend.read("pw_meter_a"), Ok(None));
        assert!(backend.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let backend = MemoryMeterBackend::new();
        backend.write("pw_meter_a", "2").unwrap();
        assert_eq!(backend.read("pw_meter_a"), Ok(Some("2".to_string())));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_unavailable_fails_both_ways() {
        let backend = MemoryMeterBackend::new();
        backend.write("k", "1").unwrap();
        backend.set_available(false);

        assert!(matches!(backend.read("k"), Err(StoreError::Unavailable(_))));
        assert!(matches!(backend.write("k", "2"), Err(StoreError::Unavailable(_))));
        assert_eq!(backend.raw("k").as_deref(), Some("1"));
    }

    #[test]
    fn test_clear() {
        let backend = MemoryMeterBackend::new();
        backend.insert_raw("a", "1");
        backend.insert_raw("b", "2");
        backend.clear();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_concurrent_writes() {
        let backend = Arc::new(MemoryMeterBackend::new());
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || {
                    backend.write(&format!("pw_meter_{}", i), "1").unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(backend.len(), 10);
    }
}

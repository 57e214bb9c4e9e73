//! Redis-backed meter storage.
//!
//! Lets a server-side deployment keep visit counters outside the process,
//! for example keyed by a visitor cookie folded into the site id.
//!
//! ## Architecture
//!
//! - Keys: the meter key (`pw_meter_<site>`) with a configurable prefix
//! - Values: the decimal count as text, same format as every other backend
//! - TTL: optional expiry refreshed on every write
//!
//! Failures are reported as `StoreError::Unavailable`; the `MeterStore`
//! above this adapter turns them into the zero-count default.
//!
//! ## Example
//!
//! ```rust,ignore
//! use paywall_lite::{Paywall, RedisMeterBackend, RedisMeterConfig};
//! use std::sync::Arc;
//!
//! let backend = RedisMeterBackend::connect("redis://127.0.0.1/")
//!     .expect("Failed to connect to Redis");
//!
//! let paywall = Paywall::builder()
//!     .with_backend(Arc::new(backend))
//!     .build()
//!     .unwrap();
//! ```

use crate::application::ports::{MeterBackend, StoreError};
use redis::{Client, Commands, Connection, RedisError};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Configuration for Redis meter storage.
#[derive(Debug, Clone)]
pub struct RedisMeterConfig {
    /// Expiry for counters, refreshed on write (default: 30 days)
    pub ttl: Option<Duration>,
    /// Key prefix for Redis keys (default: "paywall-lite:")
    pub key_prefix: String,
}

impl Default for RedisMeterConfig {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(30 * 24 * 3600)),
            key_prefix: "paywall-lite:".to_string(),
        }
    }
}

/// Redis-backed meter storage.
pub struct RedisMeterBackend {
    connection: Mutex<Connection>,
    config: RedisMeterConfig,
}

impl fmt::Debug for RedisMeterBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisMeterBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisMeterBackend {
    /// Connect to Redis with default configuration.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the connection fails.
    pub fn connect(url: &str) -> Result<Self, RedisError> {
        Self::connect_with_config(url, RedisMeterConfig::default())
    }

    /// Connect to Redis with custom configuration.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the connection fails.
    pub fn connect_with_config(url: &str, config: RedisMeterConfig) -> Result<Self, RedisError> {
        let client = Client::open(url)?;
        let connection = client.get_connection()?;

        Ok(Self {
            connection: Mutex::new(connection),
            config,
        })
    }

    /// Get the Redis key for a meter key.
    fn key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }

    fn with_connection<R>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<R, RedisError>,
    ) -> Result<R, StoreError> {
        let mut conn = self
            .connection
            .lock()
            .map_err(|_| StoreError::Unavailable("redis connection lock poisoned".to_string()))?;
        op(&mut conn).map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    /// Get the storage configuration.
    pub fn config(&self) -> &RedisMeterConfig {
        &self.config
    }
}

impl MeterBackend for RedisMeterBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = self.key(key);
        self.with_connection(|conn| conn.get(&key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = self.key(key);
        match self.config.ttl {
            Some(ttl) => {
                self.with_connection(|conn| conn.set_ex::<_, _, ()>(&key, value, ttl.as_secs().max(1)))
            }
            None => self.with_connection(|conn| conn.set::<_, _, ()>(&key, value)),
        }
    }
}

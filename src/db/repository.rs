//! Typed persistence adapter over the key-value store.
//!
//! Each tracked collection/record lives under its own key and is mirrored
//! wholesale after every mutation. Reads substitute a caller-supplied
//! default when the key is missing or the stored JSON no longer parses;
//! corrupt data is treated as absent, never as a fatal error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{kv, StoreError};

// Storage keys, versioned informally by name. A breaking change to a stored
// document means a new key, not a migration.
pub const KEY_REFERRALS: &str = "osgb_referrals_v1";
pub const KEY_COMPANIES: &str = "osgb_companies_v1";
pub const KEY_EXAMS: &str = "osgb_exams_v1";
pub const KEY_TRANSACTIONS: &str = "osgb_transactions_v1";
pub const KEY_INSTITUTIONS: &str = "osgb_institutions_v1";
pub const KEY_SETTINGS: &str = "osgb_settings_v1";

/// Raw string storage a [`Repository`] is layered on. One implementation per
/// backing medium; the application is handed the trait object so components
/// never reach for storage ambiently.
pub trait KeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Durable store backed by the `kv_store` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KeyValue for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        kv::get_value(&self.conn, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        kv::set_value(&self.conn, key, value)
    }
}

/// Volatile store for tests and previews. Clones share the same map, so a
/// test can keep a handle and inspect what the application wrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    map: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed load/save over a [`KeyValue`] backend.
pub struct Repository {
    store: Box<dyn KeyValue>,
}

impl Repository {
    pub fn new(store: Box<dyn KeyValue>) -> Self {
        Self { store }
    }

    /// Load the value under `key`, or `default` when the key is absent or
    /// its content no longer deserializes.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!("Failed to read {key}: {e}; using default");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Corrupt data under {key}: {e}; using default");
                default
            }
        }
    }

    /// Serialize `value` and store it under `key`, overwriting.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            source: e,
        })?;
        self.store.set(key, &raw)
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::StoreError;

pub const INCOME_KEY: &str = "tallybook_income";
pub const EXPENSES_KEY: &str = "tallybook_expenses";
pub const BUDGETS_KEY: &str = "tallybook_budgets";
pub const SETTINGS_KEY: &str = "tallybook_settings";
pub const PROFILE_KEY: &str = "tallybook_profile";

/// Every key `export_all` emits and `import_all` accepts.
pub const KNOWN_KEYS: [&str; 5] = [INCOME_KEY, EXPENSES_KEY, BUDGETS_KEY, SETTINGS_KEY, PROFILE_KEY];

/// Synchronous string key/value storage.
pub trait Backend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str) -> Result<bool, StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.read(key)?.is_some())
    }
}

/// In-process backend. An optional byte quota makes writes fail the way a
/// full browser store does.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(bytes),
        }
    }

    /// Bytes held, counting keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let base = self.used_bytes() - replaced;
            let needed = key.len() + value.len();
            if base + needed > quota {
                return Err(StoreError::QuotaExceeded {
                    needed,
                    available: quota.saturating_sub(base),
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// JSON save/load over a backend. Every failure is logged and degraded to
/// `false`, the caller's default, or `None`; nothing propagates.
#[derive(Debug)]
pub struct Store<B: Backend> {
    backend: B,
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(t) => t,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize value");
                return false;
            }
        };
        match self.backend.write(key, &text) {
            Ok(()) => {
                debug!(key, bytes = text.len(), "saved");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "failed to save value");
                false
            }
        }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.read(key) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(v) => v,
                Err(e) => {
                    warn!(key, error = %e, "stored value is corrupt, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "failed to load value, using default");
                default
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.delete(key) {
            Ok(_) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to remove value");
                false
            }
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.backend.contains(key).unwrap_or_else(|e| {
            warn!(key, error = %e, "failed to check key");
            false
        })
    }

    /// Pretty JSON object with one field per known key currently stored.
    pub fn export_all(&self) -> Option<String> {
        let mut doc = Map::new();
        for key in KNOWN_KEYS {
            match self.backend.read(key) {
                Ok(Some(text)) => match serde_json::from_str::<Value>(&text) {
                    Ok(v) => {
                        doc.insert(key.to_string(), v);
                    }
                    Err(e) => warn!(key, error = %e, "skipping corrupt value during export"),
                },
                Ok(None) => {}
                Err(e) => {
                    warn!(key, error = %e, "export failed");
                    return None;
                }
            }
        }
        match serde_json::to_string_pretty(&Value::Object(doc)) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "failed to serialize export");
                None
            }
        }
    }

    /// Writes every recognized top-level field of `text` to its key. Unknown
    /// fields are ignored. Malformed input writes nothing.
    pub fn import_all(&mut self, text: &str) -> bool {
        let doc = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(doc)) => doc,
            Ok(_) => {
                warn!("import payload is not a JSON object");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "import payload is not valid JSON");
                return false;
            }
        };
        let mut ok = true;
        for key in KNOWN_KEYS {
            if let Some(value) = doc.get(key) {
                ok &= self.save(key, value);
            }
        }
        ok
    }
}

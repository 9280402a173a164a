//! # Compose Configuration
//!
//! A minimal configuration system based on a string key/value store.
//! Applications layer values however they like: defaults first, then
//! environment overrides, then explicit `set` calls in tests.
//!
//! ## Setting and reading values
//! ```rust
//! use compose_core::ComposeConfig;
//! let mut config = ComposeConfig::new();
//!
//! config.set("index.posts_per_page", "5");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get_usize("index.posts_per_page"), Some(5));
//! ```
//!
//! ## Environment overrides
//! [`ComposeConfig::load_env`] strips a prefix and maps `__` to `.`:
//!
//! ```bash
//! export COMPOSE__INDEX__POSTS_PER_PAGE=10   # index.posts_per_page = 10
//! ```
//!
//! Snapshots are immutable clones handed to request handlers, so a config
//! reload never races with a request in flight.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct ComposeConfig {
    values: HashMap<String, String>,
}

impl ComposeConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only if it is not present yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Import `PREFIX...` variables from an iterator of `(key, value)` pairs.
    ///
    /// `COMPOSE__HTTP__PORT` with prefix `COMPOSE__` becomes `http.port`.
    pub fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if !normalized.is_empty() {
                    self.set(normalized, value);
                }
            }
        }
    }

    /// Import process environment variables carrying `prefix`.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    pub fn snapshot(&self) -> ComposeConfigSnapshot {
        ComposeConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComposeConfigSnapshot {
    map: HashMap<String, String>,
}

impl ComposeConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|v| v.trim().parse::<u16>().ok())
    }

    /// Comma separated list, empty entries dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

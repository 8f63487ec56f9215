//! # Configuration
//!
//! A minimal string key/value store mirroring Feathers' `app.set()` /
//! `app.get()`. The application decides where values come from
//! (environment, `.env`, defaults); hooks see an immutable snapshot.
//!
//! ```rust
//! use card_core::CardApp;
//! use card_core::service::Record;
//!
//! struct Row;
//! impl Record for Row {
//!     type Changes = ();
//! }
//!
//! let app = CardApp::<Row, ()>::new();
//! app.set("http.port", "5000");
//! assert_eq!(app.get("http.port"), Some("5000".to_string()));
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CardConfig {
    values: HashMap<String, String>,
}

impl CardConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn snapshot(&self) -> CardConfigSnapshot {
        CardConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardConfigSnapshot {
    map: HashMap<String, String>,
}

impl CardConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    /// Accepts `true/false`, `1/0`, `yes/no`, `on/off` (any case).
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(parse_bool)
    }
}

pub fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

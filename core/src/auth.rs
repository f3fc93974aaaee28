//! Token lookup for authenticated requests.
//!
//! # Design
//! The client holds a `TokenProvider` and asks it for a token on every call;
//! nothing is cached between calls. `SessionStorage` stands in for the
//! client-side key/value store the session layer writes to. The client only
//! ever reads from it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Key under which the session layer stores the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Source of the bearer token attached to outgoing requests.
///
/// Returning `None` sends the request anonymously. Implementations must not
/// fail: an unavailable store is the same as an absent token.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Provider for contexts with no token storage at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl TokenProvider for Anonymous {
    fn token(&self) -> Option<String> {
        None
    }
}

/// Shared, scoped key/value store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `key`. A poisoned lock reads as empty.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.into(), value.into());
        }
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().ok()?.remove(key)
    }
}

/// Reads the token from `SessionStorage` under `TOKEN_KEY` on each call.
#[derive(Debug, Clone)]
pub struct StoredToken {
    storage: SessionStorage,
}

impl StoredToken {
    pub fn new(storage: SessionStorage) -> Self {
        Self { storage }
    }
}

impl TokenProvider for StoredToken {
    fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }
}

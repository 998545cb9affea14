use super::storage::{CredentialError, CredentialStore};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-process credential store, used by tests and embedders that manage
/// persistence themselves.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with an access token.
    pub fn with_access_token(token: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(super::ACCESS_TOKEN_KEY.to_string(), token.to_string());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CredentialError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries.remove(key).is_some())
    }
}

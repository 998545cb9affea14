mod filesystem;
mod memory;
mod storage;

pub use filesystem::FileCredentialStore;
pub use memory::MemoryCredentialStore;
pub use storage::{CredentialError, CredentialStore};

use std::sync::Arc;

pub const ACCESS_TOKEN_KEY: &str = "michi.access_token";
pub const REFRESH_TOKEN_KEY: &str = "michi.refresh_token";
pub const PLAID_TOKEN_KEY: &str = "michi.plaid_token";

/// Typed access to the tokens the app keeps in a `CredentialStore`.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn CredentialStore>,
}

impl Credentials {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn save_access_token(&self, token: &str) -> Result<(), CredentialError> {
        self.store.set(ACCESS_TOKEN_KEY, token)
    }

    pub fn access_token(&self) -> Result<Option<String>, CredentialError> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn delete_access_token(&self) -> Result<bool, CredentialError> {
        self.store.delete(ACCESS_TOKEN_KEY)
    }

    pub fn save_refresh_token(&self, token: &str) -> Result<(), CredentialError> {
        self.store.set(REFRESH_TOKEN_KEY, token)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, CredentialError> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    pub fn delete_refresh_token(&self) -> Result<bool, CredentialError> {
        self.store.delete(REFRESH_TOKEN_KEY)
    }

    pub fn save_plaid_token(&self, token: &str) -> Result<(), CredentialError> {
        self.store.set(PLAID_TOKEN_KEY, token)
    }

    pub fn plaid_token(&self) -> Result<Option<String>, CredentialError> {
        self.store.get(PLAID_TOKEN_KEY)
    }

    pub fn delete_plaid_token(&self) -> Result<bool, CredentialError> {
        self.store.delete(PLAID_TOKEN_KEY)
    }

    /// Remove every token. Returns whether any was present.
    pub fn clear_all(&self) -> Result<bool, CredentialError> {
        let mut removed = false;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, PLAID_TOKEN_KEY] {
            removed |= self.store.delete(key)?;
        }
        Ok(removed)
    }
}

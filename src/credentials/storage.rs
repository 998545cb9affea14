use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt credential file: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored token contains bytes that cannot appear in a header.
    #[error("stored token for `{0}` is not a valid header value")]
    MalformedToken(String),

    #[error("no config directory available for the credential file")]
    NoConfigDir,
}

/// Trait for credential storage backends.
///
/// Implementations are internally synchronized: each call is atomic with
/// respect to the others and callers never hold a lock across calls.
pub trait CredentialStore: Send + Sync {
    /// Look up the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;

    /// Store `value` under `key`, replacing any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    /// Remove `key`. Returns whether a value was present.
    fn delete(&self, key: &str) -> Result<bool, CredentialError>;
}

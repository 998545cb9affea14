pub mod api;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod ui;

pub use api::{ApiClient, Auth, ClientConfig, EventStream, FinanceApi};
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use error::{ApiError, Result};

pub mod client;
pub mod codec;
pub mod endpoints;
pub mod models;
pub mod streaming;

pub use client::{ApiClient, Auth, ClientConfig};
pub use codec::KeyCoding;
pub use endpoints::{ChatSession, FinanceApi};
pub use models::{ApiResponse, EmptyResponse};
pub use streaming::EventStream;

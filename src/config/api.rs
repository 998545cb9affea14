use serde::{Deserialize, Serialize};

use crate::api::KeyCoding;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Seconds.
    #[serde(default)]
    pub stream_timeout: Option<u64>,
    #[serde(default)]
    pub key_coding: Option<KeyCoding>,
}

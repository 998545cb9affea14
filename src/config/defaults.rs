use crate::api::client::{DEFAULT_BASE_ORIGIN, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STREAM_TIMEOUT};

pub fn default_base_url() -> String {
    DEFAULT_BASE_ORIGIN.to_string()
}

pub fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

pub fn default_stream_timeout_secs() -> u64 {
    DEFAULT_STREAM_TIMEOUT.as_secs()
}

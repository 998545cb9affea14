use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::api::codec::{decode_body, encode_body, KeyCoding};
use crate::api::streaming::{ByteStream, EventStream};
use crate::credentials::{CredentialError, CredentialStore, Credentials, ACCESS_TOKEN_KEY};
use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_ORIGIN: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(120);

const APPLICATION_JSON: &str = "application/json";
const TEXT_EVENT_STREAM: &str = "text/event-stream";

/// Whether a call must carry the stored bearer token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    Required,
    Anonymous,
}

/// Settings fixed for the lifetime of an `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_origin: String,
    pub request_timeout: Duration,
    /// Applies to `stream` only.
    pub stream_timeout: Duration,
    pub key_coding: KeyCoding,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_ORIGIN)
    }
}

impl ClientConfig {
    pub fn new(base_origin: impl Into<String>) -> Self {
        Self {
            base_origin: base_origin.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            key_coding: KeyCoding::default(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    pub fn with_key_coding(mut self, key_coding: KeyCoding) -> Self {
        self.key_coding = key_coding;
        self
    }
}

/// HTTP client for the finance API.
///
/// Holds no per-call state: every call builds a fresh request and reads the
/// access token from the credential store at that moment. Clones share the
/// connection pool and the store, so one instance can serve the whole
/// process.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_origin: String,
    request_timeout: Duration,
    stream_timeout: Duration,
    key_coding: KeyCoding,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http_client(http, config, credentials))
    }

    /// Use a preconfigured `reqwest::Client` (proxies, TLS roots, ...).
    pub fn with_http_client(
        http: reqwest::Client,
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            http,
            base_origin: config.base_origin,
            request_timeout: config.request_timeout,
            stream_timeout: config.stream_timeout,
            key_coding: config.key_coding,
            credentials,
        }
    }

    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    pub fn key_coding(&self) -> KeyCoding {
        self.key_coding
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(Arc::clone(&self.credentials))
    }

    /// Absolute `http(s)` URLs are used as-is (in their parsed, normalized
    /// form); anything else is appended to the base origin. A `/` at the
    /// end of the base and the start of the endpoint is written once.
    pub fn resolve(&self, endpoint: &str) -> Result<Url> {
        let url = match Url::parse(endpoint) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse(&join(&self.base_origin, endpoint))
                    .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?
            }
            Err(e) => return Err(ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e))),
        };

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ApiError::InvalidEndpoint(format!(
                "{}: unsupported scheme `{}`",
                endpoint, scheme
            ))),
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, endpoint: &str, auth: Auth) -> Result<R> {
        let request = self.request(Method::GET, endpoint, auth)?;
        let body = self.execute(request).await?;
        self.decode(&body)
    }

    pub async fn post<T, R>(&self, endpoint: &str, body: &T, auth: Auth) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.json_request(Method::POST, endpoint, body, auth)?;
        let body = self.execute(request).await?;
        self.decode(&body)
    }

    pub async fn put<T, R>(&self, endpoint: &str, body: &T, auth: Auth) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.json_request(Method::PUT, endpoint, body, auth)?;
        let body = self.execute(request).await?;
        self.decode(&body)
    }

    pub async fn delete(&self, endpoint: &str, auth: Auth) -> Result<()> {
        let request = self.request(Method::DELETE, endpoint, auth)?;
        self.execute(request).await?;
        Ok(())
    }

    /// POST `body` and consume the response as an event stream.
    ///
    /// URL resolution and the credential lookup happen now; the request is
    /// only sent when the stream is first polled. Every failure, including
    /// those detected before sending, arrives as the stream's last item.
    pub fn stream<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T, auth: Auth) -> EventStream {
        let prepared = self
            .json_request(Method::POST, endpoint, body, auth)
            .map(|request| {
                request
                    .header(ACCEPT, TEXT_EVENT_STREAM)
                    .timeout(self.stream_timeout)
            });

        EventStream::connecting(Box::pin(open_stream(prepared)))
    }

    fn request(&self, method: Method, endpoint: &str, auth: Auth) -> Result<RequestBuilder> {
        let url = self.resolve(endpoint)?;
        let authorization = self.authorization(auth)?;

        debug!(%method, %url, ?auth, "building request");
        let mut request = self
            .http
            .request(method, url)
            .timeout(self.request_timeout);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        Ok(request)
    }

    fn json_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &T,
        auth: Auth,
    ) -> Result<RequestBuilder> {
        let request = self.request(method, endpoint, auth)?;
        let bytes = encode_body(body, self.key_coding).map_err(ApiError::Encode)?;
        Ok(request.header(CONTENT_TYPE, APPLICATION_JSON).body(bytes))
    }

    /// Bearer header from the store's current access token.
    fn authorization(&self, auth: Auth) -> Result<Option<HeaderValue>> {
        if auth == Auth::Anonymous {
            return Ok(None);
        }

        let token = self
            .credentials
            .get(ACCESS_TOKEN_KEY)?
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| CredentialError::MalformedToken(ACCESS_TOKEN_KEY.to_string()))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Bytes> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        validate_status(status, &body)?;
        Ok(body)
    }

    fn decode<R: DeserializeOwned>(&self, body: &[u8]) -> Result<R> {
        decode_body(body, self.key_coding).map_err(|e| {
            warn!(error = %e, "response did not match the expected shape");
            ApiError::Decode(e)
        })
    }
}

fn join(base: &str, endpoint: &str) -> String {
    match (base.strip_suffix('/'), endpoint.starts_with('/')) {
        (Some(base), true) => format!("{}{}", base, endpoint),
        _ => format!("{}{}", base, endpoint),
    }
}

async fn open_stream(prepared: Result<RequestBuilder>) -> Result<ByteStream> {
    let response = prepared?.send().await?;
    let status = response.status().as_u16();
    if !is_success(status) {
        let body = response.bytes().await.unwrap_or_default();
        return Err(error_for_status(status, &body));
    }
    debug!(status, "event stream opened");
    Ok(response
        .bytes_stream()
        .map(|chunk| chunk.map_err(ApiError::from))
        .boxed())
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Map a status code (and the body that came with it) to the outcome every
/// non-streaming call shares.
pub fn validate_status(status: u16, body: &[u8]) -> Result<()> {
    if is_success(status) {
        Ok(())
    } else {
        Err(error_for_status(status, body))
    }
}

fn error_for_status(status: u16, body: &[u8]) -> ApiError {
    if status == 401 {
        warn!("server rejected credentials");
        return ApiError::Unauthorized;
    }
    let message = error_message(body);
    warn!(status, server_message = message.as_deref().unwrap_or(""), "server returned an error");
    ApiError::ServerError { status, message }
}

/// Best-effort `message` (or else `error`) string from a JSON error body.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    object
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| object.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

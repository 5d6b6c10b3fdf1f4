//! Qdrant REST client (collections, scroll, delete).
//!
//! ConnectionConfig -> QdrantClient { list_collections | scroll | delete_points }
//! Every call is a single request; non-2xx responses surface as
//! `QdrantError::Status` carrying the raw body. No retries.
//!
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub mod model;

pub use model::{
    ApiResponse, CollectionDescription, CollectionsResult, DeleteSelector, Filter, Payload, Point,
    PointId, ScrollRequest, ScrollResult,
};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 6333;

const API_KEY_HEADER: &str = "api-key";

/// Where and how to reach the Qdrant service. Built once per process.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub use_https: bool,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            use_https: false,
            api_key: None,
            timeout: None,
        }
    }
}

impl ConnectionConfig {
    pub fn url(&self, path: &str) -> String {
        make_url(&self.host, self.port, path, self.use_https)
    }
}

// Keeps the api key out of debug logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_https", &self.use_https)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Build `scheme://host:port/path`. The host is not validated.
pub fn make_url(host: &str, port: u16, path: &str, https: bool) -> String {
    let scheme = if https { "https" } else { "http" };
    format!("{scheme}://{host}:{port}/{}", path.trim_start_matches('/'))
}

#[derive(Debug, thiserror::Error)]
pub enum QdrantError {
    #[error("server responded {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("api key contains characters not allowed in an HTTP header")]
    InvalidApiKey,
}

pub type Result<T> = std::result::Result<T, QdrantError>;

/// Thin async client over the handful of endpoints this tool needs.
pub struct QdrantClient {
    http: reqwest::Client,
    config: ConnectionConfig,
}

impl QdrantClient {
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key).map_err(|_| QdrantError::InvalidApiKey)?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, config })
    }

    /// `GET /collections`
    pub async fn list_collections(&self) -> Result<Vec<CollectionDescription>> {
        let url = self.config.url("/collections");
        tracing::debug!(%url, "GET");
        let resp: ApiResponse<CollectionsResult> = self.send(self.http.get(&url)).await?;
        Ok(resp.result.collections)
    }

    /// `POST /collections/{name}/points/scroll` (one page).
    pub async fn scroll(&self, collection: &str, request: &ScrollRequest) -> Result<ScrollResult> {
        let url = self
            .config
            .url(&format!("/collections/{collection}/points/scroll"));
        let resp: ApiResponse<ScrollResult> = self.post(&url, request).await?;
        Ok(resp.result)
    }

    /// `POST /collections/{name}/points/delete`
    pub async fn delete_points(&self, collection: &str, selector: &DeleteSelector) -> Result<()> {
        let url = self
            .config
            .url(&format!("/collections/{collection}/points/delete"));
        let _: serde_json::Value = self.post(&url, selector).await?;
        Ok(())
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        let raw = serde_json::to_string(body)?;
        tracing::debug!(%url, "POST");
        tracing::trace!(body = %raw, "request body");
        self.send(self.http.post(url).body(raw)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::trace!(%status, %body, "response");

        if !status.is_success() {
            return Err(QdrantError::Status { status, body });
        }
        if body.trim().is_empty() {
            // Tolerate bodiless 2xx replies (e.g. from proxies in front of Qdrant).
            return Ok(serde_json::from_str("null")?);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

//! HTTP transport struct and builder.

use std::future::Future;

use futures::StreamExt;
use serde::Deserialize;
use transcript_types::{ChatRequest, ChatTransport, EventStream, TransportError};

use crate::decoder::decode_stream;
use crate::error::{map_body_error, map_http_status, map_reqwest_error};

/// Default backend base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default path of the streaming chat endpoint.
const DEFAULT_CHAT_PATH: &str = "/chat";

/// Environment variable that overrides the base URL in [`HttpTransport::from_env`].
pub const BASE_URL_ENV: &str = "CHAT_API_URL";

/// Transport that POSTs to the backend's chat endpoint and decodes the
/// streamed response.
///
/// # Example
///
/// ```no_run
/// use transcript_stream::HttpTransport;
///
/// let transport = HttpTransport::new().base_url("http://localhost:8000");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Backend base URL, without a trailing slash.
    pub(crate) base_url: String,
    /// Path of the chat endpoint.
    pub(crate) chat_path: String,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

impl HttpTransport {
    /// Create a transport with defaults.
    ///
    /// Default base URL: `http://localhost:8000`. Default chat path: `/chat`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            chat_path: DEFAULT_CHAT_PATH.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport whose base URL comes from `CHAT_API_URL` when set
    /// and non-empty, falling back to the default otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        let transport = Self::new();
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => transport.base_url(url.trim()),
            _ => transport,
        }
    }

    /// Override the backend base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the chat endpoint path.
    #[must_use]
    pub fn chat_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.chat_path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self
    }

    /// Use a preconfigured `reqwest` client (proxies, connect timeouts, ...).
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the chat endpoint URL.
    pub(crate) fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    /// Build the health endpoint URL.
    pub(crate) fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// Check that the backend is up: `GET /health` must answer
    /// `{"status":"ok"}`.
    pub async fn check_health(&self) -> Result<(), TransportError> {
        let url = self.health_url();
        tracing::debug!(url = %url, "checking backend health");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_body_error)?;
        if !status.is_success() {
            return Err(map_http_status(status, &body));
        }

        match serde_json::from_str::<HealthBody>(&body) {
            Ok(health) if health.status == "ok" => Ok(()),
            _ => Err(TransportError::Http {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTransport for HttpTransport {
    /// POST the request as JSON and stream the decoded response.
    ///
    /// A non-success status or an empty `204` answer fails before any event
    /// is produced.
    fn open(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<EventStream, TransportError>> + Send {
        let url = self.chat_url();
        let http_client = self.client.clone();

        async move {
            tracing::debug!(url = %url, thread_id = %request.thread_id, "sending chat request");

            let response = http_client
                .post(&url)
                .header("accept", "text/event-stream")
                .json(&request)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.map_err(map_body_error)?;
                tracing::error!(status = status.as_u16(), "chat request rejected");
                return Err(map_http_status(status, &body));
            }
            if status == reqwest::StatusCode::NO_CONTENT {
                return Err(TransportError::MissingBody);
            }

            let bytes = response.bytes_stream().map(|chunk| chunk.map_err(map_body_error));
            Ok(EventStream::new(decode_stream(bytes)))
        }
    }
}

pub mod models;

use std::time::Duration;

use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::pagination::PageRequest;
use crate::query::{build_query, FilterSet, ListKind, PageCursor};

pub use models::*;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";

/// The monitor's control bridge waits up to 30s for Snort to answer.
pub const DEFAULT_CONTROL_TIMEOUT_SECONDS: u64 = 45;

const BAD_REQUEST_FALLBACK: &str = "Bad request";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("HTTP error! Status: {status}")]
    Status {
        status: u16,
        /// `message` from the error body, when the server sent one.
        message: Option<String>,
    },

    #[error("request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// The text shown to the user, or `None` for failures that are only logged.
    pub fn banner(&self) -> Option<String> {
        match self {
            Self::BadRequest { message } => Some(format!("Error: {message}")),
            Self::Status { status, .. } => Some(format!("Error: HTTP error! Status: {status}")),
            _ => None,
        }
    }

    /// Like [`ClientError::banner`] but prefers the server's own message.
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => Some(format!("Error: {message}")),
            _ => self.banner(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Applied to endpoints that round-trip through Snort's control channel.
    pub control_timeout_seconds: u64,
    pub proxy: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
            control_timeout_seconds: DEFAULT_CONTROL_TIMEOUT_SECONDS,
            proxy: None,
        }
    }
}

/// Client for the monitor's `/api/v1` endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: reqwest::Url,
    control_timeout: Duration,
}

impl ApiClient {
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_seconds.max(1)));

        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::HttpClientBuild { source: e })?;
        let control_timeout = Duration::from_secs(
            options
                .control_timeout_seconds
                .max(options.timeout_seconds)
                .max(1),
        );
        Self::with_http(http, &options.base_url, control_timeout)
    }

    pub fn with_http(
        http: reqwest::Client,
        base_url: &str,
        control_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut base = reqwest::Url::parse(base_url.trim()).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            control_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ClientError> {
        self.base.join(path).map_err(|e| ClientError::InvalidUrl {
            url: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Resolve a page request to the URL that will be fetched.
    pub fn list_url(
        &self,
        kind: ListKind,
        request: &PageRequest,
    ) -> Result<reqwest::Url, ClientError> {
        match request {
            PageRequest::Query(query) => {
                let mut url = self.endpoint(kind.path())?;
                query.apply_to(&mut url);
                Ok(url)
            }
            PageRequest::Url(raw) => self.base.join(raw).map_err(|e| ClientError::InvalidUrl {
                url: raw.clone(),
                message: e.to_string(),
            }),
        }
    }

    pub async fn fetch_list(
        &self,
        kind: ListKind,
        request: &PageRequest,
    ) -> Result<ListResponse, ClientError> {
        let url = self.list_url(kind, request)?;
        debug!(%url, view = kind.label(), "fetching page");
        self.send(self.http.get(url)).await
    }

    /// Every page of a listing, following `next` links until they run out.
    pub fn stream_pages(
        &self,
        kind: ListKind,
        filters: &FilterSet,
    ) -> impl Stream<Item = Result<ListResponse, ClientError>> + '_ {
        let first = PageRequest::Query(build_query(filters, PageCursor::first()));
        stream::unfold(Some(first), move |pending| async move {
            let request = pending?;
            match self.fetch_list(kind, &request).await {
                Ok(page) => {
                    let next = page.next.clone().map(PageRequest::Url);
                    Some((Ok(page), next))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Mark every stored event as deleted.
    pub async fn clear_events(&self) -> Result<Value, ClientError> {
        let url = self.endpoint("events")?;
        self.send(self.http.patch(url).json(&json!({}))).await
    }

    pub async fn events_count(
        &self,
        period: &str,
        kind: CountKind,
    ) -> Result<Vec<EventCount>, ClientError> {
        let url = self.endpoint("events/count")?;
        let request = self
            .http
            .get(url)
            .query(&[("period", period.trim()), ("type", kind.as_str())]);
        self.send(request).await
    }

    pub async fn execute(&self, command: &str) -> Result<CommandResponse, ClientError> {
        let url = self.endpoint("execute")?;
        let request = self
            .http
            .post(url)
            .timeout(self.control_timeout)
            .json(&json!({ "command": command }));
        self.send(request).await
    }

    pub async fn perf_monitor(&self, query: &PerfQuery) -> Result<PerfMonitorResponse, ClientError> {
        let url = self.endpoint("perf-monitor")?;
        self.send(self.http.get(url).query(query)).await
    }

    pub async fn start_profiler(&self, window: &ProfilerWindow) -> Result<Value, ClientError> {
        let url = self.endpoint("rule-profiler")?;
        let (key, value) = window.query_pair();
        let request = self
            .http
            .get(url)
            .timeout(self.control_timeout)
            .query(&[(key, value)]);
        self.send(request).await
    }

    pub async fn last_profiler(&self) -> Result<ProfilerLast, ClientError> {
        let url = self.endpoint("rule-profiler-last")?;
        self.send(self.http.get(url)).await
    }

    pub async fn update_rules(&self) -> Result<CommandResponse, ClientError> {
        let url = self.endpoint("update-rules")?;
        self.send(self.http.get(url).timeout(self.control_timeout))
            .await
    }

    pub async fn write_rule(&self, content: &str) -> Result<WriteRuleResponse, ClientError> {
        let url = self.endpoint("write-rule")?;
        let request = self
            .http
            .post(url)
            .timeout(self.control_timeout)
            .json(&json!({ "content": content }));
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ClientError::Transport { source: e })?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ClientError::Transport { source: e })?;

        if status == reqwest::StatusCode::BAD_REQUEST {
            let message =
                error_message(&body).unwrap_or_else(|| BAD_REQUEST_FALLBACK.to_string());
            return Err(ClientError::BadRequest { message });
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode { source: e })
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

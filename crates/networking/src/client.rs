//! Network client seam and the reqwest-backed implementation.

use async_trait::async_trait;
use guard_security::Location;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::request::{OutboundCall, Resource};
use crate::response::Response;

/// Network errors, as seen by the code that issued the call.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Timeout")]
    Timeout,
    #[error("Request error: {0}")]
    Request(String),
    #[error("Response error: {0}")]
    Response(String),
    #[error("Blocked insecure request to: {href}")]
    InsecureTransport { href: String },
    #[error("CSP violation: {target}")]
    PolicyViolation { target: String },
}

impl ClientError {
    /// Whether the call was refused by policy rather than failing in transit.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            ClientError::InsecureTransport { .. } | ClientError::PolicyViolation { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else {
            ClientError::Request(err.to_string())
        }
    }
}

/// The page's outbound network primitive.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn send(&self, call: &OutboundCall) -> Result<Response, ClientError>;
}

#[async_trait]
impl<C: NetworkClient + ?Sized> NetworkClient for std::sync::Arc<C> {
    async fn send(&self, call: &OutboundCall) -> Result<Response, ClientError> {
        (**self).send(call).await
    }
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Maximum redirects.
    pub max_redirects: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 20,
            user_agent: format!("pageguard/{} ({})", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        }
    }
}

/// HTTP client performing real network calls.
///
/// Relative string targets are resolved against the page location with
/// standard URL joining, the way the browser's own primitive does.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    location: Option<Location>,
}

impl HttpClient {
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::Request(e.to_string()))?;

        Ok(Self {
            inner,
            config,
            location: None,
        })
    }

    /// Resolve relative targets against this page location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn target_url(&self, resource: &Resource) -> Result<Url, ClientError> {
        match resource {
            Resource::Request(request) => Ok(request.url.clone()),
            Resource::Url(raw) => match Url::parse(raw) {
                Ok(url) => Ok(url),
                Err(url::ParseError::RelativeUrlWithoutBase) => {
                    let base = self
                        .location
                        .as_ref()
                        .map(Location::url)
                        .ok_or_else(|| ClientError::InvalidUrl(format!("no base URL for {raw:?}")))?;
                    base.join(raw).map_err(|e| ClientError::InvalidUrl(e.to_string()))
                }
                Err(e) => Err(ClientError::InvalidUrl(e.to_string())),
            },
        }
    }
}

#[async_trait]
impl NetworkClient for HttpClient {
    async fn send(&self, call: &OutboundCall) -> Result<Response, ClientError> {
        let url = self.target_url(&call.resource)?;
        tracing::debug!(method = %call.method(), %url, "sending request");

        let mut builder = self.inner.request(call.method(), url);
        for (name, value) in call.headers().iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = call.body() {
            builder = builder.body(body);
        }
        if let Some(timeout) = call.options.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        Response::from_reqwest(response).await
    }
}

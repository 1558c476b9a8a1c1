use http::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use http::{Method, StatusCode};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::github::transport::{HttpRequest, ReqwestTransport, Transport};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_USER_AGENT: &str = "pr-ledger";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("GitHub API rate limit exceeded ({url}). Use a token or wait for the limit to reset.")]
    RateLimitExceeded { url: String },
    #[error("Not found: {url}. Check the owner/repository name and token permissions.")]
    NotFound { url: String },
    #[error("GitHub API error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimitExceeded { .. })
    }
}

/// Explicit client settings. Nothing about the session lives in globals.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// GitHub REST client. Injects credentials and maps status codes to `ApiError`.
/// Never retries.
pub struct GitHubClient<T: Transport = ReqwestTransport> {
    transport: T,
    config: ClientConfig,
}

impl GitHubClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> GitHubClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        match HeaderValue::from_str(&self.config.user_agent) {
            Ok(val) => {
                headers.insert(USER_AGENT, val);
            }
            Err(_) => {
                headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
            }
        }
        if let Some(ref token) = self.config.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut val) => {
                    val.set_sensitive(true);
                    headers.insert(AUTHORIZATION, val);
                }
                Err(_) => warn!("Token contains invalid header characters, sending request unauthenticated"),
            }
        }
        headers
    }

    fn url(&self, path: &str, params: &[(String, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Send one request and interpret the response status.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Value, ApiError> {
        let url = self.url(path, params)?;
        debug!("{} {}", method, url);

        let request = HttpRequest {
            method,
            url: url.clone(),
            headers: self.headers(),
        };
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status;
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimitExceeded { url: url.to_string() });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { url: url.to_string() });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        self.request(Method::GET, path, params).await
    }
}

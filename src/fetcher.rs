use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{self, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::PageResult;

/// Status line and decoded body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub message: String,
    pub body: Option<PageResult>,
}

impl ApiResponse {
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that never produced an `ApiResponse`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallFault {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("conversion error: {0}")]
    Conversion(String),
}

impl From<reqwest::Error> for CallFault {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_builder() {
            CallFault::Conversion(e.to_string())
        } else {
            CallFault::Transport(e.to_string())
        }
    }
}

/// The two listing endpoints of the remote news service.
#[async_trait]
pub trait NewsService: Send + Sync {
    async fn get_breaking_news(&self, country_code: &str, page: u32) -> Result<ApiResponse, CallFault>;

    async fn search_for_news(&self, query: &str, page: u32) -> Result<ApiResponse, CallFault>;
}

pub const DEFAULT_COUNTRY: &str = "id";
pub const DEFAULT_PAGE: u32 = 1;

/// HTTP client for a NewsAPI-compatible service
pub struct NewsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    /// Builds a client from the loaded configuration
    /// Returns an error if no API key is configured
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("No API key configured, set NEWSREEL_API_KEY"))?;

        let client = reqwest::Client::builder()
            .user_agent("Newsreel/0.1")
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<ApiResponse, CallFault> {
        let url = format!("{}/v2/{}", self.base_url, endpoint);
        debug!(%url, "requesting listing");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let message = status_message(status);
        let bytes = response.bytes().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), body = %String::from_utf8_lossy(&bytes), "unsuccessful response");
            return Ok(ApiResponse {
                status: status.as_u16(),
                message,
                body: None,
            });
        }

        let body = if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            None
        } else {
            serde_json::from_slice::<Option<PageResult>>(&bytes)
                .map_err(|e| CallFault::Conversion(e.to_string()))?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            message,
            body,
        })
    }
}

#[async_trait]
impl NewsService for NewsClient {
    async fn get_breaking_news(&self, country_code: &str, page: u32) -> Result<ApiResponse, CallFault> {
        self.get(
            "top-headlines",
            &[("country", country_code.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn search_for_news(&self, query: &str, page: u32) -> Result<ApiResponse, CallFault> {
        self.get("everything", &[("q", query.to_string()), ("page", page.to_string())])
            .await
    }
}

fn status_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(String::from)
        .unwrap_or_else(|| status.as_u16().to_string())
}

//! Page fetching collaborator.
//!
//! The pipeline only constructs (URL, params, headers) tuples; actual HTTP
//! traffic goes through this trait so tests can inject canned responses and
//! callers can wrap their own retry policy around it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::Result;
use crate::models::{ExtractionConfig, PageRequest, SiteContext};

/// Injected, possibly-failing fetch function.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page for a site and return its body as text.
    async fn fetch(&self, ctx: &SiteContext, request: &PageRequest) -> Result<String>;
}

/// reqwest-backed fetcher sharing one connection pool across all runs.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the extraction settings.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, ctx: &SiteContext, request: &PageRequest) -> Result<String> {
        let base = Url::parse(&ctx.base_url)?;
        let url = base.join(&request.path)?;

        let mut builder = self.client.get(url);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (key, value) in &ctx.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(cookie) = &ctx.cookie {
            builder = builder.header(reqwest::header::COOKIE, cookie.as_str());
        }

        let response = builder.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

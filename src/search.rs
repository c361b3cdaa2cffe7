//! Web search client (Serper-compatible API).

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SerperResp {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

/// Capability seam for web search, so retrieval backends can be tested
/// without network access.
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

pub struct SerperClient {
    http: Client,
    key: String,
    limiter: DefaultDirectRateLimiter,
    top_k: usize,
}

impl SerperClient {
    pub fn new(key: String, qps: u32, top_k: usize, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let qps = NonZeroU32::new(qps).unwrap_or(nonzero!(1u32));
        let limiter = RateLimiter::direct(Quota::per_second(qps));
        Ok(Self { http, key, limiter, top_k })
    }
}

#[async_trait]
impl Searcher for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.limiter.until_ready().await;
        let resp = self
            .http
            .post("https://google.serper.dev/search")
            .header("X-API-KEY", &self.key)
            .json(&serde_json::json!({ "q": query, "num": self.top_k }))
            .send()
            .await?
            .error_for_status()?
            .json::<SerperResp>()
            .await?;
        Ok(resp.organic.into_iter().take(self.top_k).collect())
    }
}

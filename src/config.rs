//! Environment-driven configuration with fixed defaults.

use std::env;
use std::time::Duration;

use crate::retrieve::FusionWeights;
use crate::veracity::AggregationConfig;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub max_concurrency: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub qps: u32,
    pub top_k: usize,
    pub timeout: Duration,
    /// Domains the fact-check backend restricts its queries to.
    pub fact_check_sites: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub cache_ttl: Duration,
    /// Bound on cross-claim retrieval fan-out.
    pub claim_concurrency: usize,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub fusion: FusionWeights,
    pub aggregation: AggregationConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECONDS", 604_800)),
            claim_concurrency: env_or("CLAIM_CONCURRENCY", 4),
            llm: LlmConfig {
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                base_url: env::var("LLM_BASE_URL").ok(),
                api_key: env::var("LLM_API_KEY").ok(),
                max_concurrency: env_or("LLM_CONCURRENCY", 8),
                timeout: Duration::from_millis(env_or("LLM_TIMEOUT_MS", 30_000)),
            },
            search: SearchConfig {
                api_key: env::var("SERPER_API_KEY").ok(),
                qps: env_or("SEARCH_QPS", 5),
                top_k: env_or("SEARCH_TOP_K", 10),
                timeout: Duration::from_millis(env_or("SEARCH_TIMEOUT_MS", 10_000)),
                fact_check_sites: env::var("FACT_CHECK_SITES")
                    .unwrap_or_else(|_| "politifact.com,snopes.com,factcheck.org".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            fusion: FusionWeights {
                semantic: env_or("FUSION_SEMANTIC_WEIGHT", 0.5),
                credibility: env_or("FUSION_CREDIBILITY_WEIGHT", 0.3),
                recency: env_or("FUSION_RECENCY_WEIGHT", 0.2),
            },
            aggregation: AggregationConfig {
                support_threshold: env_or("VERDICT_SUPPORT_THRESHOLD", 0.6),
                refute_threshold: env_or("VERDICT_REFUTE_THRESHOLD", -0.6),
                credibility_weight: env_or("AGG_CREDIBILITY_WEIGHT", 0.5),
                recency_weight: env_or("AGG_RECENCY_WEIGHT", 0.5),
            },
        }
    }
}

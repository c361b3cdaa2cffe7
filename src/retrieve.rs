//! Per-claim evidence retrieval: concurrent fan-out across backends,
//! weighted score fusion, and ranking.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{future, stream, FutureExt, StreamExt};
use tracing::warn;
use uuid::Uuid;

use crate::cache::KvStore;
use crate::fingerprint::fingerprint;
use crate::search::Searcher;
use crate::types::{Claim, ClaimEvidence, Evidence};

pub const SNIPPET_KEY_PREFIX: &str = "evidence_snippet:";

/// Fusion weights over the three per-candidate signals. The defaults are
/// provisional calibration, kept configurable on purpose.
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub semantic: f64,
    pub credibility: f64,
    pub recency: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { semantic: 0.5, credibility: 0.3, recency: 0.2 }
    }
}

impl FusionWeights {
    pub fn score(&self, e: &Evidence) -> f64 {
        self.semantic * e.semantic_score
            + self.credibility * e.source_credibility
            + self.recency * e.recency_score
    }
}

/// Maps a publication date to [0,1]; fresher is higher. Undated evidence
/// sits in the middle.
pub fn recency_score(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match published_at {
        Some(ts) => {
            let age_days = (now - ts).num_hours() as f64 / 24.0;
            (1.0 - age_days / 365.0).clamp(0.0, 1.0)
        }
        None => 0.5,
    }
}

#[async_trait]
pub trait EvidenceBackend: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, query: &str) -> Result<Vec<Evidence>>;
}

/// Snippet cache: previously fetched evidence keyed by the query
/// fingerprint. Fail-open like the verdict cache.
pub struct SnippetCacheBackend {
    store: Arc<dyn KvStore>,
}

impl SnippetCacheBackend {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Seed the snippet cache for a query; used by warmers and tests.
    pub async fn put(&self, query: &str, evidence: &[Evidence], ttl: Duration) {
        let fp = fingerprint(query);
        if fp.is_empty() {
            return;
        }
        if let Ok(raw) = serde_json::to_string(evidence) {
            let _ = self.store.set(&format!("{SNIPPET_KEY_PREFIX}{fp}"), raw, ttl).await;
        }
    }
}

#[async_trait]
impl EvidenceBackend for SnippetCacheBackend {
    fn name(&self) -> &'static str {
        "snippet_cache"
    }

    async fn search(&self, query: &str) -> Result<Vec<Evidence>> {
        let fp = fingerprint(query);
        if fp.is_empty() {
            return Ok(Vec::new());
        }
        let raw = self.store.get(&format!("{SNIPPET_KEY_PREFIX}{fp}")).await?;
        match raw {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }
}

/// In-memory similarity index over a seeded document corpus, scored by
/// token overlap. Placeholder for a real vector index; the interface is
/// what matters to the pipeline.
#[derive(Default)]
pub struct LocalIndexBackend {
    docs: Vec<Evidence>,
}

fn token_set(text: &str) -> HashSet<String> {
    crate::fingerprint::canonical_form(text)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    inter / union
}

impl LocalIndexBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(docs: Vec<Evidence>) -> Self {
        Self { docs }
    }
}

#[async_trait]
impl EvidenceBackend for LocalIndexBackend {
    fn name(&self) -> &'static str {
        "vector_search"
    }

    async fn search(&self, query: &str) -> Result<Vec<Evidence>> {
        let q = token_set(query);
        let now = Utc::now();
        let mut hits = Vec::new();
        for doc in &self.docs {
            let sim = overlap(&q, &token_set(&doc.snippet));
            if sim > 0.0 {
                let mut e = doc.clone();
                e.semantic_score = sim;
                e.recency_score = recency_score(e.published_at, now);
                hits.push(e);
            }
        }
        Ok(hits)
    }
}

/// General web search via the `Searcher` seam.
pub struct WebSearchBackend {
    searcher: Arc<dyn Searcher>,
}

impl WebSearchBackend {
    pub fn new(searcher: Arc<dyn Searcher>) -> Self {
        Self { searcher }
    }
}

fn hits_to_evidence(
    hits: Vec<crate::search::SearchHit>,
    source: &str,
    credibility: f64,
) -> Vec<Evidence> {
    hits.into_iter()
        .enumerate()
        .map(|(rank, h)| Evidence {
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            url: Some(h.link),
            title: Some(h.title),
            snippet: h.snippet,
            published_at: None,
            source_credibility: credibility,
            // Search rank is the only relevance signal available here.
            semantic_score: (1.0 - rank as f64 * 0.1).max(0.1),
            recency_score: 0.5,
            final_score: 0.0,
        })
        .collect()
}

#[async_trait]
impl EvidenceBackend for WebSearchBackend {
    fn name(&self) -> &'static str {
        "web_search"
    }

    async fn search(&self, query: &str) -> Result<Vec<Evidence>> {
        let hits = self.searcher.search(query).await?;
        Ok(hits_to_evidence(hits, "web_search", 0.5))
    }
}

/// Site-restricted search over fact-check and government domains; hits
/// carry higher source credibility.
pub struct FactCheckBackend {
    searcher: Arc<dyn Searcher>,
    sites: Vec<String>,
}

impl FactCheckBackend {
    pub fn new(searcher: Arc<dyn Searcher>, sites: Vec<String>) -> Self {
        Self { searcher, sites }
    }
}

#[async_trait]
impl EvidenceBackend for FactCheckBackend {
    fn name(&self) -> &'static str {
        "fact_check"
    }

    async fn search(&self, query: &str) -> Result<Vec<Evidence>> {
        if self.sites.is_empty() {
            return Ok(Vec::new());
        }
        let restriction = self
            .sites
            .iter()
            .map(|s| format!("site:{s}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let hits = self.searcher.search(&format!("{query} ({restriction})")).await?;
        Ok(hits_to_evidence(hits, "fact_check", 0.9))
    }
}

/// Multi-backend retriever with fusion ranking.
pub struct EvidenceRetriever {
    backends: Vec<Arc<dyn EvidenceBackend>>,
    weights: FusionWeights,
}

impl EvidenceRetriever {
    pub fn new(backends: Vec<Arc<dyn EvidenceBackend>>, weights: FusionWeights) -> Self {
        Self { backends, weights }
    }

    /// Ranked evidence for one claim. Backends are queried concurrently;
    /// a failing backend contributes nothing and cannot abort the claim.
    pub async fn retrieve_for_claim(&self, claim: &Claim) -> Vec<Evidence> {
        if claim.text.trim().is_empty() {
            return Vec::new();
        }

        let futs = self.backends.iter().map(|backend| {
            let backend = backend.clone();
            let query = claim.text.clone();
            async move {
                match backend.search(&query).await {
                    Ok(items) => items,
                    Err(err) => {
                        warn!(backend = backend.name(), %err, "evidence backend failed");
                        Vec::new()
                    }
                }
            }
        });

        let mut merged: Vec<Evidence> =
            future::join_all(futs).await.into_iter().flatten().collect();
        for e in &mut merged {
            e.final_score = self.weights.score(e);
        }
        // Stable sort keeps backend-then-discovery order for ties.
        merged.sort_by(|a, b| {
            b.final_score.partial_cmp(&a.final_score).unwrap_or(Ordering::Equal)
        });
        merged
    }

    /// One `ClaimEvidence` block per claim, same order as the input.
    /// Cross-claim fan-out is bounded by `concurrency`.
    pub async fn retrieve_for_claims(
        &self,
        claims: &[Claim],
        concurrency: usize,
    ) -> Vec<ClaimEvidence> {
        // Boxed and pre-collected so the stream type carries no borrowing
        // closure; otherwise spawned tasks hit rustc's "implementation of
        // `Send` is not general enough" higher-ranked lifetime limitation.
        // The async blocks stay lazy, so concurrency is unchanged.
        let futs: Vec<_> = claims
            .iter()
            .map(|claim| {
                FutureExt::boxed(async move {
                    ClaimEvidence {
                        claim_id: claim.claim_id.clone(),
                        evidence: self.retrieve_for_claim(claim).await,
                    }
                })
            })
            .collect();
        stream::iter(futs)
        // `buffered`, not `buffer_unordered`: block order must match claim order.
        .buffered(concurrency.max(1))
        .collect()
        .await
    }
}

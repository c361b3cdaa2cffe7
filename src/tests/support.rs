//! Shared fixtures for end-to-end tests.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::cache::{VerdictCache, DEFAULT_TTL};
use crate::enrich::IdentityTranslator;
use crate::llm::stub::ScriptedLlm;
use crate::metrics::MetricsRegistry;
use crate::pipeline::Pipeline;
use crate::retrieve::{EvidenceBackend, EvidenceRetriever, FusionWeights};
use crate::server::AppState;
use crate::tasks::TaskManager;
use crate::types::Evidence;
use crate::veracity::AggregationConfig;

pub struct FixedBackend {
    pub items: Vec<Evidence>,
}

#[async_trait]
impl EvidenceBackend for FixedBackend {
    fn name(&self) -> &'static str {
        "fixed"
    }
    async fn search(&self, _q: &str) -> Result<Vec<Evidence>> {
        Ok(self.items.clone())
    }
}

pub fn sample_evidence(id: &str) -> Evidence {
    Evidence {
        id: id.into(),
        source: "fixed".into(),
        url: Some(format!("https://example.com/{id}")),
        title: Some(format!("title {id}")),
        snippet: format!("snippet {id}"),
        published_at: None,
        source_credibility: 0.8,
        semantic_score: 0.7,
        recency_score: 0.6,
        final_score: 0.0,
    }
}

/// App state with scripted oracles: one extracted claim, one supporting
/// stance per evidence item.
pub fn scripted_state(metrics: Arc<MetricsRegistry>) -> AppState {
    let extract = Arc::new(ScriptedLlm::new([
        r#"[{"claim_id":"c1","text":"Alpha claim holds","type":"descriptive"}]"#,
    ]));
    let stance = Arc::new(ScriptedLlm::new([r#"{"stance":"support","confidence":0.9}"#]));
    let retriever = EvidenceRetriever::new(
        vec![Arc::new(FixedBackend { items: vec![sample_evidence("e1")] }) as Arc<dyn EvidenceBackend>],
        FusionWeights::default(),
    );
    let pipeline = Pipeline::new(
        extract,
        stance,
        Arc::new(IdentityTranslator),
        retriever,
        VerdictCache::in_memory(DEFAULT_TTL),
        metrics.clone(),
        AggregationConfig::default(),
        2,
    );
    AppState { tasks: TaskManager::new(Arc::new(pipeline)), metrics }
}

//! The claim-verification unit of work.
//!
//! payload -> fingerprint -> cache -> extract -> enrich -> retrieve ->
//! stance -> aggregate -> cache write-through. Sub-stage failures degrade
//! to documented fallbacks; only orchestration faults escape.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::cache::VerdictCache;
use crate::enrich::{enrich_claims, Translator};
use crate::error::PipelineError;
use crate::extraction::extract_claims;
use crate::fingerprint::fingerprint;
use crate::language;
use crate::llm::Llm;
use crate::metrics::MetricsRegistry;
use crate::retrieve::EvidenceRetriever;
use crate::stance::classify_stance_batch;
use crate::types::{
    LanguageAnalysis, PipelinePayload, PipelineResult, StancePair,
};
use crate::veracity::{aggregate, AggregationConfig};

pub struct Pipeline {
    extract_llm: Arc<dyn Llm>,
    stance_llm: Arc<dyn Llm>,
    translator: Arc<dyn Translator>,
    retriever: EvidenceRetriever,
    cache: VerdictCache,
    metrics: Arc<MetricsRegistry>,
    aggregation: AggregationConfig,
    claim_concurrency: usize,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        extract_llm: Arc<dyn Llm>,
        stance_llm: Arc<dyn Llm>,
        translator: Arc<dyn Translator>,
        retriever: EvidenceRetriever,
        cache: VerdictCache,
        metrics: Arc<MetricsRegistry>,
        aggregation: AggregationConfig,
        claim_concurrency: usize,
    ) -> Self {
        Self {
            extract_llm,
            stance_llm,
            translator,
            retriever,
            cache,
            metrics,
            aggregation,
            claim_concurrency: claim_concurrency.max(1),
        }
    }

    /// Run one verification unit of work. Duration and detected language
    /// are recorded whether or not the run succeeds.
    pub async fn process(&self, payload: PipelinePayload) -> Result<PipelineResult, PipelineError> {
        let started = Instant::now();
        let out = self.run(payload).await;
        self.metrics.record_verification_time(started.elapsed());
        out
    }

    async fn run(&self, mut payload: PipelinePayload) -> Result<PipelineResult, PipelineError> {
        let analysis: LanguageAnalysis = match payload.language_analysis.take() {
            Some(a) => a,
            None => language::analyze(&payload.content.raw_text),
        };
        self.metrics.record_language(&analysis.language);

        let clean_text = if analysis.clean_text.is_empty() {
            payload.content.raw_text.clone()
        } else {
            analysis.clean_text.clone()
        };
        let source_language = analysis.language.clone();
        payload.language_analysis = Some(analysis);

        // Dedup check before any oracle work. An empty fingerprint means
        // the cache is bypassed in both directions.
        let fp = fingerprint(&clean_text);
        if let Some(cached) = self.cache.get(&fp).await {
            info!(platform = %payload.platform, "verdict cache hit");
            return Ok(cached);
        }

        let claims = extract_claims(&*self.extract_llm, &clean_text).await;
        let claims = enrich_claims(&*self.translator, claims, Some(&source_language)).await;
        for claim in &claims {
            self.metrics.record_claim_category(claim.claim_type.as_str());
        }

        let evidence = self
            .retriever
            .retrieve_for_claims(&claims, self.claim_concurrency)
            .await;

        // Flatten (claim, evidence) pairs claim-major, evidence-minor; the
        // keys travel with them so aggregation can pair results explicitly.
        let mut pair_inputs = Vec::new();
        let mut pair_keys = Vec::new();
        for (claim, block) in claims.iter().zip(evidence.iter()) {
            for ev in &block.evidence {
                pair_inputs.push((claim.text.clone(), ev.snippet.clone()));
                pair_keys.push((claim.claim_id.clone(), ev.id.clone()));
            }
        }

        let stance_results = classify_stance_batch(&*self.stance_llm, &pair_inputs).await;
        if stance_results.len() != pair_keys.len() {
            // The classifier contract guarantees 1:1 ordering; anything
            // else is an orchestration-level fault.
            return Err(PipelineError::Internal(format!(
                "stance batch returned {} results for {} pairs",
                stance_results.len(),
                pair_keys.len(),
            )));
        }

        let stance_pairs: Vec<StancePair> = pair_keys
            .into_iter()
            .zip(stance_results.iter().cloned())
            .map(|((claim_id, evidence_id), result)| StancePair { claim_id, evidence_id, result })
            .collect();

        let veracity = aggregate(&self.aggregation, &claims, &evidence, &stance_pairs);

        let result = PipelineResult {
            payload,
            claims,
            evidence,
            stances: stance_results,
            veracity,
        };

        self.cache.set(&fp, &result).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, VerdictCache, DEFAULT_TTL};
    use crate::enrich::IdentityTranslator;
    use crate::llm::stub::{DisabledLlm, ScriptedLlm};
    use crate::retrieve::{EvidenceBackend, FusionWeights};
    use crate::types::{Evidence, StanceLabel, Verdict};
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedBackend {
        items: Vec<Evidence>,
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

    fn evidence(id: &str, cred: f64, recency: f64) -> Evidence {
        Evidence {
            id: id.into(),
            source: "fixed".into(),
            url: None,
            title: None,
            snippet: format!("snippet about {id}"),
            published_at: None,
            source_credibility: cred,
            semantic_score: 0.5,
            recency_score: recency,
            final_score: 0.0,
        }
    }

    fn pipeline_with(
        extract: Arc<dyn Llm>,
        stance: Arc<dyn Llm>,
        backends: Vec<Arc<dyn EvidenceBackend>>,
        cache: VerdictCache,
        metrics: Arc<MetricsRegistry>,
    ) -> Pipeline {
        Pipeline::new(
            extract,
            stance,
            Arc::new(IdentityTranslator),
            EvidenceRetriever::new(backends, FusionWeights::default()),
            cache,
            metrics,
            AggregationConfig::default(),
            4,
        )
    }

    #[tokio::test]
    async fn end_to_end_mixed_evidence_scenario() {
        // One claim, two evidence items, one support and one refute:
        // 0.8*(0.5*0.9+0.5*0.7) - 0.6*(0.5*0.5+0.5*0.5) = 0.34 -> Unverified.
        let extract = Arc::new(ScriptedLlm::new([
            r#"[{"claim_id":"c1","text":"Company X profits rose 50% in 2024.","type":"statistical"}]"#,
        ]));
        let stance = Arc::new(ScriptedLlm::new([
            r#"{"stance":"support","confidence":0.8}"#,
            r#"{"stance":"refute","confidence":0.6}"#,
        ]));
        let backends: Vec<Arc<dyn EvidenceBackend>> = vec![Arc::new(FixedBackend {
            items: vec![evidence("e1", 0.9, 0.7), evidence("e2", 0.5, 0.5)],
        })];
        let metrics = Arc::new(MetricsRegistry::new());
        let pipeline = pipeline_with(
            extract,
            stance,
            backends,
            VerdictCache::in_memory(DEFAULT_TTL),
            metrics.clone(),
        );

        let payload = PipelinePayload::from_text("test", "Company X profits rose 50% in 2024.");
        let result = pipeline.process(payload).await.unwrap();

        assert_eq!(result.claims.len(), 1);
        assert_eq!(result.evidence.len(), 1);
        assert_eq!(result.stances.len(), 2);
        let v = &result.veracity[0];
        assert!((v.score - 0.34).abs() < 1e-9);
        assert!((v.confidence - 0.94).abs() < 1e-9);
        assert_eq!(v.verdict, Verdict::Unverified);
        assert_eq!(v.evidence_used.len(), 2);

        // Stance order matches the ranked evidence order (e1 outranks e2).
        assert_eq!(result.stances[0].stance, StanceLabel::Support);
        assert_eq!(result.stances[1].stance, StanceLabel::Refute);

        let snap = metrics.snapshot();
        assert_eq!(snap.verification.total_requests, 1);
        assert_eq!(snap.languages.get("en"), Some(&1));
        assert_eq!(snap.claim_categories.get("statistical"), Some(&1));
    }

    #[tokio::test]
    async fn stance_count_matches_total_evidence() {
        let extract = Arc::new(ScriptedLlm::new([
            r#"[{"claim_id":"c1","text":"alpha claim"},{"claim_id":"c2","text":"beta claim"}]"#,
        ]));
        // 2 claims x 2 evidence items = 4 stance calls.
        let stance = Arc::new(ScriptedLlm::new([
            r#"{"stance":"support","confidence":0.5}"#,
            r#"{"stance":"neutral","confidence":0.5}"#,
            r#"{"stance":"refute","confidence":0.5}"#,
            r#"{"stance":"support","confidence":0.5}"#,
        ]));
        let backends: Vec<Arc<dyn EvidenceBackend>> = vec![Arc::new(FixedBackend {
            items: vec![evidence("e1", 0.5, 0.5), evidence("e2", 0.5, 0.5)],
        })];
        let pipeline = pipeline_with(
            extract,
            stance,
            backends,
            VerdictCache::in_memory(DEFAULT_TTL),
            Arc::new(MetricsRegistry::new()),
        );

        let result = pipeline
            .process(PipelinePayload::from_text("test", "alpha claim and beta claim text"))
            .await
            .unwrap();

        let total_evidence: usize = result.evidence.iter().map(|b| b.evidence.len()).sum();
        assert_eq!(result.stances.len(), total_evidence);
        assert_eq!(result.veracity.len(), 2);
    }

    #[tokio::test]
    async fn cache_hit_skips_all_stages() {
        let store = Arc::new(MemoryStore::new());
        let cache = VerdictCache::new(store.clone(), DEFAULT_TTL);

        let extract = Arc::new(ScriptedLlm::new([r#"[{"claim_id":"c1","text":"water boils"}]"#]));
        let backends: Vec<Arc<dyn EvidenceBackend>> =
            vec![Arc::new(FixedBackend { items: vec![evidence("e1", 0.9, 0.9)] })];
        let pipeline = pipeline_with(
            extract,
            Arc::new(ScriptedLlm::new([r#"{"stance":"support","confidence":0.9}"#])),
            backends,
            cache,
            Arc::new(MetricsRegistry::new()),
        );

        let payload = PipelinePayload::from_text("test", "water boils");
        let first = pipeline.process(payload).await.unwrap();

        // Second pipeline shares the store but has oracles that would fail
        // loudly if invoked; the cache hit must short-circuit everything.
        let second_pipeline = pipeline_with(
            Arc::new(DisabledLlm),
            Arc::new(DisabledLlm),
            Vec::new(),
            VerdictCache::new(store, DEFAULT_TTL),
            Arc::new(MetricsRegistry::new()),
        );
        // Token-order paraphrase lands on the same fingerprint.
        let second = second_pipeline
            .process(PipelinePayload::from_text("test", "boils water"))
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_text_produces_empty_result_without_caching() {
        let pipeline = pipeline_with(
            Arc::new(DisabledLlm),
            Arc::new(DisabledLlm),
            Vec::new(),
            VerdictCache::in_memory(DEFAULT_TTL),
            Arc::new(MetricsRegistry::new()),
        );
        let result = pipeline
            .process(PipelinePayload::from_text("test", "   "))
            .await
            .unwrap();
        assert!(result.claims.is_empty());
        assert!(result.stances.is_empty());
        assert!(result.veracity.is_empty());
    }

    #[tokio::test]
    async fn oracle_outage_degrades_to_empty_claims() {
        let backends: Vec<Arc<dyn EvidenceBackend>> =
            vec![Arc::new(FixedBackend { items: vec![evidence("e1", 0.9, 0.9)] })];
        let pipeline = pipeline_with(
            Arc::new(DisabledLlm),
            Arc::new(DisabledLlm),
            backends,
            VerdictCache::in_memory(DEFAULT_TTL),
            Arc::new(MetricsRegistry::new()),
        );
        let result = pipeline
            .process(PipelinePayload::from_text("test", "the sun is a star"))
            .await
            .unwrap();
        assert!(result.claims.is_empty());
        assert!(result.veracity.is_empty());
    }

    #[tokio::test]
    async fn upstream_language_analysis_is_respected() {
        let extract = Arc::new(ScriptedLlm::new([r#"[{"claim_id":"c1","text":"pre-cleaned claim"}]"#]));
        let metrics = Arc::new(MetricsRegistry::new());
        let pipeline = pipeline_with(
            extract,
            Arc::new(DisabledLlm),
            Vec::new(),
            VerdictCache::in_memory(DEFAULT_TTL),
            metrics.clone(),
        );
        let mut payload = PipelinePayload::from_text("telegram", "raw <b>text</b>");
        payload.language_analysis = Some(LanguageAnalysis {
            clean_text: "pre-cleaned claim".into(),
            language: "hi".into(),
            confidence: 0.8,
        });
        let result = pipeline.process(payload).await.unwrap();
        assert_eq!(metrics.snapshot().languages.get("hi"), Some(&1));
        // Foreign source language flows into the translation annex.
        let t = result.claims[0].translation.as_ref().unwrap();
        assert_eq!(t.translation_confidence, 0.5);
    }
}

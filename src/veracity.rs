//! Veracity aggregation: stance results recombined per claim into a
//! verdict, score, and confidence.
//!
//! Stances are looked up by (claim_id, evidence_id) key rather than by
//! slicing a flat list, so reordering or filtering in an earlier stage
//! cannot silently shift results onto the wrong evidence.

use std::collections::HashMap;

use crate::types::{
    Claim, ClaimEvidence, StanceLabel, StancePair, StanceResult, VeracityResult, Verdict,
};

/// Aggregation constants. Provisional calibration, so configurable rather
/// than hard-coded.
#[derive(Debug, Clone, Copy)]
pub struct AggregationConfig {
    pub support_threshold: f64,
    pub refute_threshold: f64,
    pub credibility_weight: f64,
    pub recency_weight: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            support_threshold: 0.6,
            refute_threshold: -0.6,
            credibility_weight: 0.5,
            recency_weight: 0.5,
        }
    }
}

/// Pure threshold mapping from aggregate score to verdict.
pub fn verdict_from_score(cfg: &AggregationConfig, score: f64) -> Verdict {
    if score >= cfg.support_threshold {
        Verdict::LikelyTrue
    } else if score <= cfg.refute_threshold {
        Verdict::LikelyFalse
    } else {
        Verdict::Unverified
    }
}

/// One `VeracityResult` per claim, order-preserving. A missing stance key
/// counts as neutral.
pub fn aggregate(
    cfg: &AggregationConfig,
    claims: &[Claim],
    evidence: &[ClaimEvidence],
    stances: &[StancePair],
) -> Vec<VeracityResult> {
    let by_key: HashMap<(&str, &str), &StanceResult> = stances
        .iter()
        .map(|p| ((p.claim_id.as_str(), p.evidence_id.as_str()), &p.result))
        .collect();

    let blocks: HashMap<&str, &ClaimEvidence> =
        evidence.iter().map(|b| (b.claim_id.as_str(), b)).collect();

    let neutral = StanceResult::neutral();
    let mut results = Vec::with_capacity(claims.len());

    for claim in claims {
        let ev_list: &[crate::types::Evidence] = blocks
            .get(claim.claim_id.as_str())
            .map(|b| b.evidence.as_slice())
            .unwrap_or(&[]);

        let mut score = 0.0;
        let mut magnitude = 0.0;
        let mut evidence_used = Vec::new();

        for ev in ev_list {
            let stance = by_key
                .get(&(claim.claim_id.as_str(), ev.id.as_str()))
                .copied()
                .unwrap_or(&neutral);

            let source_weight = cfg.credibility_weight * ev.source_credibility
                + cfg.recency_weight * ev.recency_score;
            let contribution = stance.stance.weight() * stance.confidence * source_weight;
            score += contribution;
            magnitude += contribution.abs();

            if stance.stance != StanceLabel::Neutral {
                evidence_used.push(ev.clone());
            }
        }

        let confidence = if magnitude > 0.0 { magnitude.min(1.0) } else { 0.0 };
        let verdict = verdict_from_score(cfg, score);
        let explanation = format!(
            "Aggregated stance from {} evidence items. Score {:.3} mapped to verdict '{}'.",
            ev_list.len(),
            score,
            verdict.as_str(),
        );

        results.push(VeracityResult {
            claim_id: claim.claim_id.clone(),
            verdict,
            score,
            confidence,
            explanation,
            evidence_used,
        });
    }

    results
}

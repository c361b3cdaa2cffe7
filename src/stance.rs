//! Stance classification over the LLM oracle.
//!
//! The batch form is the one the pipeline uses; it must return exactly one
//! result per input pair, in input order, because downstream flattening
//! depends on it. Every failure mode degrades to `{neutral, 0.0}`.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use tracing::warn;

use crate::llm::Llm;
use crate::types::{StanceLabel, StanceResult};

fn build_stance_prompt(claim: &str, evidence: &str) -> Vec<ChatCompletionRequestMessage> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(
            "You are a stance detection engine. Does this evidence support, \
             refute, or remain neutral to the claim? Return JSON only.",
        )
        .build()
        .map(Into::into);
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(format!(
            "Determine the stance of the evidence with respect to the claim.\n\
             Stance must be one of: support, refute, neutral.\n\
             Return a JSON object: {{\"stance\": \"support|refute|neutral\", \
             \"confidence\": number between 0 and 1}}.\n\n\
             Claim: {claim}\n\nEvidence: {evidence}\n\nJSON only, no extra text."
        ))
        .build()
        .map(Into::into);
    match (system, user) {
        (Ok(s), Ok(u)) => vec![s, u],
        _ => Vec::new(),
    }
}

/// Unknown stance strings coerce to neutral; confidence is clamped.
fn parse_stance(raw: &str) -> StanceResult {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw.trim()) else {
        return StanceResult::neutral();
    };
    let stance = value
        .get("stance")
        .and_then(|v| v.as_str())
        .map(|s| match s {
            "support" => StanceLabel::Support,
            "refute" => StanceLabel::Refute,
            _ => StanceLabel::Neutral,
        })
        .unwrap_or(StanceLabel::Neutral);
    let confidence = value
        .get("confidence")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    StanceResult { stance, confidence }
}

/// Classify one (claim, evidence) pair.
pub async fn classify_stance(client: &dyn Llm, claim: &str, evidence: &str) -> StanceResult {
    classify_stance_batch(client, &[(claim.to_string(), evidence.to_string())])
        .await
        .pop()
        .unwrap_or_else(StanceResult::neutral)
}

/// Classify many pairs; output is 1:1 with input and order-preserving.
/// Pairs with empty claim or evidence text never reach the oracle.
pub async fn classify_stance_batch(
    client: &dyn Llm,
    pairs: &[(String, String)],
) -> Vec<StanceResult> {
    if pairs.is_empty() {
        return Vec::new();
    }

    // Only well-formed pairs go to the oracle; the rest are neutral.
    // Indices map oracle replies back to their original positions.
    let mut askable = Vec::new();
    for (idx, (claim, evidence)) in pairs.iter().enumerate() {
        if !claim.trim().is_empty() && !evidence.trim().is_empty() {
            askable.push((idx, build_stance_prompt(claim, evidence)));
        }
    }

    let mut results = vec![StanceResult::neutral(); pairs.len()];
    if askable.is_empty() {
        return results;
    }

    let prompts = askable.iter().map(|(_, p)| p.clone()).collect();
    match client.chat_many(prompts).await {
        Ok(replies) => {
            for ((idx, _), reply) in askable.iter().zip(replies.iter()) {
                results[*idx] = parse_stance(reply);
            }
        }
        Err(err) => {
            warn!(%err, "stance oracle failed, defaulting batch to neutral");
        }
    }
    results
}

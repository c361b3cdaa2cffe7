//! Claim extraction over the LLM oracle.
//!
//! This stage never fails the pipeline: an unreachable oracle or a reply
//! that does not parse into a JSON array degrades to an empty claim list.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use tracing::warn;
use uuid::Uuid;

use crate::llm::Llm;
use crate::types::Claim;

fn build_extraction_prompt(text: &str) -> Vec<ChatCompletionRequestMessage> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(
            "You are a claim extraction engine. Extract only verifiable factual \
             claims; ignore opinions, advice, and fiction. Output JSON only.",
        )
        .build()
        .map(Into::into);
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(format!(
            "Extract all factual claims from the following text. For each claim \
             produce a JSON object with keys: claim_id (uuid), text, subject, \
             predicate, object, type (causal/descriptive/statistical/event/other), \
             span (character [start, end]).\n\nText:\n{text}\n\nReturn a JSON array only."
        ))
        .build()
        .map(Into::into);
    match (system, user) {
        (Ok(s), Ok(u)) => vec![s, u],
        _ => Vec::new(),
    }
}

fn parse_claims(raw: &str) -> Vec<Claim> {
    let trimmed = raw.trim().trim_start_matches("```json").trim_matches('`').trim();
    let Ok(items) = serde_json::from_str::<Vec<serde_json::Value>>(trimmed) else {
        return Vec::new();
    };
    // Malformed individual items are skipped rather than sinking the batch.
    items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<Claim>(v).ok())
        .filter(|c| !c.text.trim().is_empty())
        .collect()
}

/// Extract atomic claims from normalized text. Empty input short-circuits
/// without an oracle call; every returned claim carries a non-empty id.
pub async fn extract_claims(client: &dyn Llm, text: &str) -> Vec<Claim> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let raw = match client.chat_many(vec![build_extraction_prompt(text)]).await {
        Ok(mut replies) if !replies.is_empty() => replies.remove(0),
        Ok(_) => return Vec::new(),
        Err(err) => {
            warn!(%err, "claim extraction oracle failed, returning no claims");
            return Vec::new();
        }
    };

    let mut claims = parse_claims(&raw);
    for claim in &mut claims {
        if claim.claim_id.trim().is_empty() {
            claim.claim_id = Uuid::new_v4().to_string();
        }
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::stub::{DisabledLlm, ScriptedLlm};
    use std::collections::HashSet;

    #[tokio::test]
    async fn empty_input_skips_oracle() {
        // DisabledLlm would error if called; empty input must not reach it.
        assert!(extract_claims(&DisabledLlm, "   ").await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_oracle_degrades_to_empty() {
        assert!(extract_claims(&DisabledLlm, "The earth is round.").await.is_empty());
    }

    #[tokio::test]
    async fn unparsable_reply_degrades_to_empty() {
        let llm = ScriptedLlm::new(["I'd rather chat about the weather."]);
        assert!(extract_claims(&llm, "some text").await.is_empty());
    }

    #[tokio::test]
    async fn parses_claims_and_backfills_ids() {
        let llm = ScriptedLlm::new([r#"[
            {"claim_id":"c1","text":"X rose 50%","type":"statistical"},
            {"text":"Y fell","type":"event"},
            {"text":"Z happened"}
        ]"#]);
        let claims = extract_claims(&llm, "text").await;
        assert_eq!(claims.len(), 3);
        assert_eq!(claims[0].claim_id, "c1");
        let ids: HashSet<_> = claims.iter().map(|c| c.claim_id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(claims.iter().all(|c| !c.claim_id.is_empty()));
    }

    #[tokio::test]
    async fn malformed_items_are_skipped() {
        let llm = ScriptedLlm::new([r#"[{"text":"valid claim"}, 42, {"no_text":true}]"#]);
        let claims = extract_claims(&llm, "text").await;
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].text, "valid claim");
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let llm = ScriptedLlm::new(["```json\n[{\"text\":\"fenced\"}]\n```"]);
        let claims = extract_claims(&llm, "text").await;
        assert_eq!(claims.len(), 1);
    }
}

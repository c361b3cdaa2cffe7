//! Deterministic oracle substitutes, used by tests and by configurations
//! that run without an API key.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_openai::types::ChatCompletionRequestMessage;

use super::Llm;

/// Replays a fixed queue of replies in order. When the queue runs dry the
/// remaining prompts get empty strings, which every caller already treats
/// as a degraded reply.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { replies: Mutex::new(replies.into_iter().map(Into::into).collect()) }
    }
}

#[async_trait::async_trait]
impl Llm for ScriptedLlm {
    async fn chat_many(&self, prompts: Vec<Vec<ChatCompletionRequestMessage>>) -> Result<Vec<String>> {
        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        Ok(prompts.iter().map(|_| replies.pop_front().unwrap_or_default()).collect())
    }
}

/// Oracle for key-less deployments: always errors, which callers degrade
/// from (empty claim list, neutral stance).
pub struct DisabledLlm;

#[async_trait::async_trait]
impl Llm for DisabledLlm {
    async fn chat_many(&self, _prompts: Vec<Vec<ChatCompletionRequestMessage>>) -> Result<Vec<String>> {
        bail!("llm oracle not configured")
    }
}

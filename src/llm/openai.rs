use std::time::Duration;

use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
    Client,
};
use futures::{stream, StreamExt};

use super::Llm;

/// Chat-completion client over any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_concurrency: usize,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(
        model: String,
        base_url: Option<String>,
        api_key: Option<String>,
        max_concurrency: usize,
        timeout: Duration,
    ) -> Self {
        let mut cfg = OpenAIConfig::default();
        if let Some(url) = base_url {
            cfg = cfg.with_api_base(url);
        }
        if let Some(key) = api_key {
            cfg = cfg.with_api_key(key);
        }
        let client = Client::with_config(cfg);
        Self { client, model, max_concurrency: max_concurrency.max(1), timeout }
    }
}

#[async_trait::async_trait]
impl Llm for LlmClient {
    async fn chat_many(&self, prompts: Vec<Vec<ChatCompletionRequestMessage>>) -> Result<Vec<String>> {
        let reqs = prompts.into_iter().enumerate().map(|(idx, messages)| {
            let client = self.client.clone();
            let model = self.model.clone();
            let timeout = self.timeout;
            async move {
                let req = CreateChatCompletionRequestArgs::default()
                    .model(model)
                    .messages(messages)
                    .build()?;
                let resp = tokio::time::timeout(timeout, client.chat().create(req))
                    .await
                    .map_err(|_| anyhow!("oracle call timed out after {timeout:?}"))??;
                let text = resp
                    .choices
                    .first()
                    .and_then(|c| c.message.content.clone())
                    .unwrap_or_default();
                Ok::<_, anyhow::Error>((idx, text))
            }
        });

        // Calls run concurrently; replies are re-sorted by submission index
        // before returning so callers see stable 1:1 ordering.
        let mut out = stream::iter(reqs)
            .buffer_unordered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await;
        out.sort_by_key(|r| r.as_ref().map(|(i, _)| *i).unwrap_or(usize::MAX));

        let mut texts = Vec::with_capacity(out.len());
        for r in out {
            let (_, t) = r?;
            texts.push(t);
        }
        Ok(texts)
    }
}

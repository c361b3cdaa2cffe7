pub mod openai;
pub mod stub;

use anyhow::Result;
use async_openai::types::ChatCompletionRequestMessage;

/// Narrow capability over the LLM oracle. `chat_many` must return one
/// reply per prompt, in submission order, regardless of how the
/// underlying calls are scheduled.
#[async_trait::async_trait]
pub trait Llm: Send + Sync {
    async fn chat_many(&self, prompts: Vec<Vec<ChatCompletionRequestMessage>>) -> Result<Vec<String>>;
}

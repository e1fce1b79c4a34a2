pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

use super::{ LlmConfig, LlmType };
use crate::models::chat::ChatMessage;
use self::ollama::OllamaClient;
use self::openai::OpenAIChatClient;

/// Failure modes of a single completion exchange. The chat loop pattern-matches
/// on these to decide what to tell the user; none of them is fatal.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion endpoint rejected credentials: {0}")]
    Auth(String),
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run one request/response exchange with the remote model, sending the
    /// full ordered message log as context and returning the reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::OpenRouter | LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

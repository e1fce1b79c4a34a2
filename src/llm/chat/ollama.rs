use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::{ ChatClient, CompletionError };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::ChatMessage;

/// Adapter for a local Ollama instance via its native `/api/chat` route.
/// Needs no API key, which makes it handy for keyless local runs.
#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: String,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| "llama3".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(Self::new(config.base_url.clone(), config.completion_model.clone()))
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let req = OllamaChatRequest {
            model: self.completion_model.clone(),
            messages,
            stream: false,
        };

        let resp = self.http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let data = resp
            .json::<OllamaChatResponse>()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        Ok(data.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{ method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    #[tokio::test]
    async fn complete_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(
                    json!({
                    "message": {"role": "assistant", "content": "local reply"},
                    "done": true
                })
                )
            )
            .mount(&server).await;

        let client = OllamaClient::new(Some(server.uri()), Some("test-model".to_string()));
        let reply = client.complete(&[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(reply, "local reply");
    }

    #[test]
    fn from_config_rejects_other_provider_types() {
        let config = LlmConfig {
            llm_type: LlmType::OpenAI,
            ..LlmConfig::default()
        };
        assert!(OllamaClient::from_config(&config).is_err());
    }
}

use async_trait::async_trait;
use reqwest::{
    Client as HttpClient,
    StatusCode,
    header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION },
};
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::{ ChatClient, CompletionError };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::ChatMessage;

/// Adapter for OpenAI-compatible `/chat/completions` endpoints. Covers both
/// OpenRouter (the default provider) and OpenAI itself; they differ only in
/// base URL, default model, and OpenRouter's optional attribution headers.
pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: String,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        referer: Option<String>,
        title: Option<String>,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?
        );
        if let Some(referer) = referer {
            headers.insert(
                "http-referer",
                HeaderValue::from_str(&referer)
                    .map_err(|e| format!("Invalid attribution URL: {}", e))?
            );
        }
        if let Some(title) = title {
            headers.insert(
                "x-title",
                HeaderValue::from_str(&title)
                    .map_err(|e| format!("Invalid attribution title: {}", e))?
            );
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "An API key is required for hosted chat completion".to_string())?;

        let (default_base_url, default_model) = match config.llm_type {
            LlmType::OpenRouter => ("https://openrouter.ai/api/v1", "openai/gpt-3.5-turbo"),
            _ => ("https://api.openai.com/v1", "gpt-4o"),
        };

        Self::new(
            api_key,
            config.completion_model.clone().unwrap_or_else(|| default_model.to_string()),
            config.base_url.clone().unwrap_or_else(|| default_base_url.to_string()),
            config.referer.clone(),
            config.title.clone(),
        )
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
        };

        let resp = self.http
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Auth(format!("{}: {}", status, body.trim())));
        }
        let resp = resp
            .error_for_status()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let data = resp
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        let choice = data.choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("no choices in response".to_string()))?;
        choice.message.content
            .ok_or_else(|| {
                CompletionError::MalformedResponse("choice carried no message content".to_string())
            })
    }
}

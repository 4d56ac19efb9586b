//! OpenAI-compatible chat completions adapter.
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style gateways, Ollama, vLLM, LM Studio).

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use panel_application::ports::generation::{GenerationError, GenerationService};
use panel_domain::{ConversationTurn, TurnRole};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// [`GenerationService`] backed by a chat completions endpoint
pub struct OpenAiGenerationService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiGenerationService {
    pub fn new(config: &FileProviderConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GenerationError::ConnectionError(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &FileProviderConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages<'a>(
        prompt: &'a str,
        system_prompt: Option<&'a str>,
        context: &'a [ConversationTurn],
    ) -> Vec<ChatMessage<'a>> {
        let mut messages = Vec::with_capacity(context.len() + 2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        for turn in context {
            messages.push(ChatMessage {
                role: turn.role.as_str(),
                content: &turn.content,
            });
        }
        messages.push(ChatMessage {
            role: TurnRole::User.as_str(),
            content: prompt,
        });
        messages
    }

    fn parse_response(body: &str) -> Result<String, GenerationError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("response contained no text".to_string()))
    }

    fn error_message(body: &str) -> String {
        serde_json::from_str::<ApiErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| body.chars().take(200).collect())
    }
}

#[async_trait]
impl GenerationService for OpenAiGenerationService {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        context: &[ConversationTurn],
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: Self::messages(prompt, system_prompt, context),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(
            model = %self.model,
            message_count = request.messages.len(),
            "Sending chat completion request"
        );

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::ConnectionError(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = Self::error_message(&body);
            warn!(status = status.as_u16(), "Chat completion request failed");
            return Err(GenerationError::RequestFailed(format!(
                "HTTP {} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                message
            )));
        }

        Self::parse_response(&body)
    }
}

//! LLM completion client.
//!
//! The chat service talks to the model through [`ChatCompletionClient`]. The
//! production implementation sends one non-streaming completion to OpenRouter
//! with rig-core; tests substitute a scripted client.

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{
    client::CompletionClient,
    completion::{Completion, Message},
    message::{AssistantContent, Text, UserContent},
    providers::openrouter,
    OneOrMany,
};

use crate::error::AiError;
use crate::types::ChatRole;

/// Model used when `OPENROUTER_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

const PROVIDER_ID: &str = "openrouter";

/// Sampling parameters for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: u64,
    pub temperature: f64,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
}

impl CompletionParams {
    /// Parameters for assistant replies.
    pub fn chat() -> Self {
        Self {
            max_tokens: 1500,
            temperature: 0.7,
            presence_penalty: Some(0.1),
            frequency_penalty: Some(0.1),
        }
    }

    /// Parameters for conversation titles.
    pub fn title() -> Self {
        Self {
            max_tokens: 20,
            temperature: 0.5,
            presence_penalty: None,
            frequency_penalty: None,
        }
    }

    fn additional_params(&self) -> Option<serde_json::Value> {
        let mut params = serde_json::Map::new();
        if let Some(penalty) = self.presence_penalty {
            params.insert("presence_penalty".to_string(), penalty.into());
        }
        if let Some(penalty) = self.frequency_penalty {
            params.insert("frequency_penalty".to_string(), penalty.into());
        }
        if params.is_empty() {
            None
        } else {
            Some(serde_json::Value::Object(params))
        }
    }
}

/// One completion: a system prompt, prior turns, and the message to answer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub history: Vec<(ChatRole, String)>,
    pub prompt: String,
    pub params: CompletionParams,
}

/// Model output. `content` is `None` when the provider returned no text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionOutput {
    pub content: Option<String>,
    pub tokens_used: i64,
}

#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, AiError>;
}

/// OpenRouter client built on rig-core.
pub struct OpenRouterClient {
    api_key: Option<String>,
    model: String,
}

impl OpenRouterClient {
    pub fn new(api_key: Option<String>, model: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> Result<openrouter::Client<HttpClient>, AiError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::MissingApiKey(PROVIDER_ID.to_string()))?;
        openrouter::Client::new(key).map_err(|e| AiError::Provider(e.to_string()))
    }
}

/// Converts stored turns into rig messages. Only user and assistant turns
/// exist on the wire here, so system turns are replayed as user turns.
fn to_rig_message(role: ChatRole, text: String) -> Message {
    match role {
        ChatRole::Assistant => Message::Assistant {
            id: None,
            content: OneOrMany::one(AssistantContent::Text(Text { text })),
        },
        ChatRole::User | ChatRole::System => Message::User {
            content: OneOrMany::one(UserContent::Text(Text { text })),
        },
    }
}

#[async_trait]
impl ChatCompletionClient for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, AiError> {
        let client = self.client()?;

        let mut builder = client
            .agent(&self.model)
            .preamble(&request.system_prompt)
            .max_tokens(request.params.max_tokens)
            .temperature(request.params.temperature);
        if let Some(params) = request.params.additional_params() {
            builder = builder.additional_params(params);
        }
        let agent = builder.build();

        let history: Vec<Message> = request
            .history
            .into_iter()
            .map(|(role, text)| to_rig_message(role, text))
            .collect();
        debug!(
            "Sending completion to {} with {} history messages",
            self.model,
            history.len()
        );

        let response = agent
            .completion(to_rig_message(ChatRole::User, request.prompt), history)
            .await
            .map_err(|e| AiError::Provider(e.to_string()))?
            .send()
            .await
            .map_err(|e| AiError::Provider(e.to_string()))?;

        let text = response
            .choice
            .iter()
            .filter_map(|content| match content {
                AssistantContent::Text(Text { text }) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionOutput {
            content: if text.trim().is_empty() { None } else { Some(text) },
            tokens_used: i64::try_from(response.usage.total_tokens).unwrap_or(i64::MAX),
        })
    }
}

//! Title generation for chat conversations.
//!
//! Asks the model for a short title based on the first user message.
//! Falls back to "New Conversation" if generation fails.

use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

use crate::error::AiError;
use crate::prompts::TITLE_PROMPT;
use crate::provider::{ChatCompletionClient, CompletionParams, CompletionRequest};
use crate::types::DEFAULT_CONVERSATION_TITLE;

// ============================================================================
// Title Generator Trait
// ============================================================================

/// Trait for generating conversation titles.
#[async_trait]
pub trait TitleGeneratorTrait: Send + Sync {
    /// Generate a title from the first user message. Never fails; returns
    /// [`DEFAULT_CONVERSATION_TITLE`] when no usable title comes back.
    async fn generate_title(&self, first_message: &str) -> String;
}

// ============================================================================
// Title Generator Implementation
// ============================================================================

/// Configuration for title generation.
pub struct TitleGeneratorConfig {
    /// Characters of the first message sent to the model.
    pub prompt_max_chars: usize,
    /// Words kept from the generated title.
    pub max_words: usize,
}

impl Default for TitleGeneratorConfig {
    fn default() -> Self {
        Self {
            prompt_max_chars: 200,
            max_words: 5,
        }
    }
}

/// Title generator backed by the completion client.
pub struct TitleGenerator {
    client: Arc<dyn ChatCompletionClient>,
    config: TitleGeneratorConfig,
}

impl TitleGenerator {
    pub fn new(client: Arc<dyn ChatCompletionClient>, config: TitleGeneratorConfig) -> Self {
        Self { client, config }
    }

    async fn generate_with_llm(&self, first_message: &str) -> Result<String, AiError> {
        let prompt: String = first_message
            .chars()
            .take(self.config.prompt_max_chars)
            .collect();

        let output = self
            .client
            .complete(CompletionRequest {
                system_prompt: TITLE_PROMPT.to_string(),
                history: Vec::new(),
                prompt,
                params: CompletionParams::title(),
            })
            .await?;

        let raw = output
            .content
            .ok_or_else(|| AiError::internal("Title response had no content"))?;
        let title = limit_words(&clean_generated_title(&raw), self.config.max_words);
        if title.is_empty() {
            return Err(AiError::internal("Generated title is empty"));
        }
        debug!("Generated conversation title '{}'", title);
        Ok(title)
    }
}

#[async_trait]
impl TitleGeneratorTrait for TitleGenerator {
    async fn generate_title(&self, first_message: &str) -> String {
        match self.generate_with_llm(first_message).await {
            Ok(title) => title,
            Err(e) => {
                warn!("Title generation failed, using default: {}", e);
                DEFAULT_CONVERSATION_TITLE.to_string()
            }
        }
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Strips the markdown and quoting that models wrap titles in.
pub fn clean_generated_title(raw: &str) -> String {
    let mut title = raw
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(raw)
        .trim()
        .to_string();

    let unprefixed = title
        .strip_prefix("Title:")
        .or_else(|| title.strip_prefix("Judul:"))
        .map(|rest| rest.trim().to_string());
    if let Some(rest) = unprefixed {
        title = rest;
    }
    title = trim_trailing_punctuation(&title);

    // Iteratively strip wrappers like **Title**, "Title", `Title`.
    for _ in 0..4 {
        let trimmed = title.trim();
        let mut changed = false;

        for wrapper in ["**", "__", "`", "\"", "'", "*"] {
            if trimmed.len() > wrapper.len() * 2
                && trimmed.starts_with(wrapper)
                && trimmed.ends_with(wrapper)
            {
                title = trimmed[wrapper.len()..trimmed.len() - wrapper.len()]
                    .trim()
                    .to_string();
                changed = true;
                break;
            }
        }

        if !changed {
            break;
        }
    }

    title = trim_trailing_punctuation(
        title.trim_matches(|c: char| matches!(c, '*' | '_' | '`' | '"' | '\'')),
    );

    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn trim_trailing_punctuation(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ':' | ';' | ','))
        .trim()
        .to_string()
}

/// Keeps at most `max_words` whitespace-separated words.
pub fn limit_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Fake Generator for Testing
// ============================================================================

/// A title generator returning a fixed title, for tests.
pub struct FakeTitleGenerator {
    /// Fixed title to return, or None to return the default title.
    pub fixed_title: Option<String>,
}

impl FakeTitleGenerator {
    pub fn with_title(title: &str) -> Self {
        Self {
            fixed_title: Some(title.to_string()),
        }
    }

    pub fn with_fallback() -> Self {
        Self { fixed_title: None }
    }
}

#[async_trait]
impl TitleGeneratorTrait for FakeTitleGenerator {
    async fn generate_title(&self, _first_message: &str) -> String {
        self.fixed_title
            .clone()
            .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Shared types for the chat assistant.
//!
//! This module defines the conversation domain used by the chat service and
//! its persistence layer:
//! - Domain types: ChatConversation, ChatMessage, ChatRole, ConversationStatus
//! - Request/Response types: ChatRequest, ChatResponse, ConversationDetail, ...
//! - Repository trait: ConversationRepositoryTrait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AiError;

// ============================================================================
// Constants
// ============================================================================

/// Title given to a conversation until one is generated.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

/// Number of most recent messages sent to the model as history.
pub const CHAT_HISTORY_LIMIT: i64 = 10;

/// Default page size for the conversation list.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

// ============================================================================
// Domain Types
// ============================================================================

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::System => "system",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            "system" => Ok(ChatRole::System),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Conversation lifecycle. Deleting a conversation archives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Active,
    Archived,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(ConversationStatus::Active),
            "archived" => Ok(ConversationStatus::Archived),
            _ => Err(format!("Unknown conversation status: {}", s)),
        }
    }
}

/// A conversation between one user and the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatConversation {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub status: ConversationStatus,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatConversation {
    /// Create a new active conversation with a generated id.
    pub fn new(user_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            status: ConversationStatus::Active,
            last_message_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single stored message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(conversation_id: impl Into<String>, role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            conversation_id: conversation_id.into(),
            role,
            content: content.into(),
            tokens_used: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_tokens_used(mut self, tokens_used: i64) -> Self {
        self.tokens_used = Some(tokens_used);
        self
    }
}

/// Conversation fields that can change after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub status: Option<ConversationStatus>,
}

impl ConversationUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none()
    }
}

/// Conversation list row with message statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub last_message_at: DateTime<Utc>,
    pub message_count: i64,
}

// ============================================================================
// Request / Response Types
// ============================================================================

fn default_true() -> bool {
    true
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default = "default_true")]
    pub include_financial_context: bool,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            message: String::new(),
            conversation_id: None,
            include_financial_context: true,
        }
    }
}

/// Role, content and timestamp of a message as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatMessage> for MessageView {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            timestamp: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetadata {
    pub tokens_used: i64,
    pub financial_context_included: bool,
}

/// Result of a chat turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: String,
    pub response: MessageView,
    pub metadata: ChatMetadata,
}

/// Query of the conversation list. Missing values take the defaults
/// `page = 1`, `limit = 20`, `status = active`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListConversationsRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ConversationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPage {
    pub conversations: Vec<ConversationSummary>,
    pub pagination: Pagination,
}

/// A conversation with its full message history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub id: String,
    pub title: String,
    pub status: ConversationStatus,
    pub messages: Vec<MessageView>,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Body of `PUT /chat/conversations/{id}`.
///
/// `status` stays a raw string: unknown values are ignored instead of
/// rejecting the whole request.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUpdateRequest {
    pub title: Option<String>,
    pub status: Option<String>,
}

impl From<ConversationUpdateRequest> for ConversationUpdate {
    fn from(request: ConversationUpdateRequest) -> Self {
        Self {
            title: request.title,
            status: request.status.and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUpdated {
    pub id: String,
    pub title: String,
    pub status: ConversationStatus,
    pub message: String,
}

// ============================================================================
// Repository Trait
// ============================================================================

/// Result type for repository operations.
pub type ConversationRepositoryResult<T> = Result<T, AiError>;

/// Repository for conversation persistence. Every lookup is scoped to the
/// owning user; a conversation of another user behaves as missing.
#[async_trait]
pub trait ConversationRepositoryTrait: Send + Sync {
    async fn create_conversation(
        &self,
        conversation: ChatConversation,
    ) -> ConversationRepositoryResult<ChatConversation>;

    fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> ConversationRepositoryResult<Option<ChatConversation>>;

    /// Returns one page of summaries ordered by `last_message_at` (newest first)
    /// and the total count for the status.
    fn list_conversations(
        &self,
        user_id: &str,
        status: ConversationStatus,
        limit: i64,
        offset: i64,
    ) -> ConversationRepositoryResult<(Vec<ConversationSummary>, i64)>;

    /// Applies the update and returns the new row, or `None` when the
    /// conversation does not exist for this user.
    async fn update_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
        update: ConversationUpdate,
    ) -> ConversationRepositoryResult<Option<ChatConversation>>;

    /// Archives every active conversation of the user. Returns the count.
    async fn archive_all_conversations(&self, user_id: &str) -> ConversationRepositoryResult<usize>;

    /// Stores a message and bumps the conversation's `last_message_at`.
    async fn append_message(&self, message: ChatMessage) -> ConversationRepositoryResult<ChatMessage>;

    /// All messages of a conversation, oldest first.
    fn get_messages(&self, conversation_id: &str) -> ConversationRepositoryResult<Vec<ChatMessage>>;

    /// The `limit` most recent messages, returned oldest first.
    fn get_recent_messages(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> ConversationRepositoryResult<Vec<ChatMessage>>;
}

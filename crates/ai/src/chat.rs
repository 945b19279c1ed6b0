//! Chat service.
//!
//! Handles one user turn end to end: conversation lookup or creation,
//! persistence of both sides of the exchange, prompt assembly with the
//! user's financial snapshot, the model call, and title generation for new
//! conversations. Also serves the conversation management operations.

use chrono::Utc;
use chrono_tz::Tz;
use finbot_core::insights::FinancialContextServiceTrait;
use finbot_core::utils::time_utils::DEFAULT_REPORTING_TZ;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::error::AiError;
use crate::prompts::{base_system_prompt, compose_system_prompt, FALLBACK_REPLY};
use crate::provider::{ChatCompletionClient, CompletionParams, CompletionRequest};
use crate::title_generator::TitleGeneratorTrait;
use crate::types::{
    ChatConversation, ChatMessage, ChatMetadata, ChatRequest, ChatResponse, ChatRole,
    ConversationDetail, ConversationPage, ConversationRepositoryTrait, ConversationStatus,
    ConversationUpdate, ConversationUpdateRequest, ConversationUpdated, ListConversationsRequest,
    MessageView, Pagination, CHAT_HISTORY_LIMIT, DEFAULT_CONVERSATION_TITLE, DEFAULT_PAGE_LIMIT,
};

/// Chat service configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Most recent messages replayed to the model, including the new one.
    pub history_limit: i64,
    /// Largest page size accepted by the conversation list.
    pub max_page_limit: i64,
    /// Timezone of the date stamped into the system prompt.
    pub timezone: Tz,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_limit: CHAT_HISTORY_LIMIT,
            max_page_limit: 100,
            timezone: DEFAULT_REPORTING_TZ,
        }
    }
}

pub struct ChatService {
    repo: Arc<dyn ConversationRepositoryTrait>,
    client: Arc<dyn ChatCompletionClient>,
    titles: Arc<dyn TitleGeneratorTrait>,
    context: Arc<dyn FinancialContextServiceTrait>,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(
        repo: Arc<dyn ConversationRepositoryTrait>,
        client: Arc<dyn ChatCompletionClient>,
        titles: Arc<dyn TitleGeneratorTrait>,
        context: Arc<dyn FinancialContextServiceTrait>,
        config: ChatConfig,
    ) -> Self {
        Self {
            repo,
            client,
            titles,
            context,
            config,
        }
    }

    /// Runs one chat turn for `user_id`.
    pub async fn send_message(
        &self,
        user_id: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        if request.message.trim().is_empty() {
            return Err(AiError::invalid_input("Message is required"));
        }

        let (conversation, is_new) = match request.conversation_id.as_deref() {
            Some(id) => {
                let existing = self
                    .repo
                    .get_conversation(user_id, id)?
                    .ok_or_else(|| AiError::ConversationNotFound(id.to_string()))?;
                (existing, false)
            }
            None => {
                let created = self
                    .repo
                    .create_conversation(ChatConversation::new(
                        user_id,
                        DEFAULT_CONVERSATION_TITLE,
                    ))
                    .await?;
                info!("Started conversation {} for user {}", created.id, user_id);
                (created, true)
            }
        };

        self.repo
            .append_message(ChatMessage::new(
                &conversation.id,
                ChatRole::User,
                request.message.clone(),
            ))
            .await?;

        let mut recent = self
            .repo
            .get_recent_messages(&conversation.id, self.config.history_limit)?;
        let prompt = recent
            .pop()
            .map(|m| m.content)
            .unwrap_or_else(|| request.message.clone());
        let history = recent.into_iter().map(|m| (m.role, m.content)).collect();

        let financial_context = if request.include_financial_context {
            match self.context.build_financial_context(user_id).await {
                Ok(context) => Some(context),
                Err(e) => {
                    warn!("Failed to build financial context for {}: {}", user_id, e);
                    None
                }
            }
        } else {
            None
        };
        let financial_context_included = financial_context.is_some();
        let system_prompt = compose_system_prompt(
            base_system_prompt(Utc::now(), self.config.timezone),
            financial_context.as_deref(),
        );

        let output = self
            .client
            .complete(CompletionRequest {
                system_prompt,
                history,
                prompt,
                params: CompletionParams::chat(),
            })
            .await?;
        let content = output.content.unwrap_or_else(|| {
            warn!("Model returned no content for conversation {}", conversation.id);
            FALLBACK_REPLY.to_string()
        });

        let reply = self
            .repo
            .append_message(
                ChatMessage::new(&conversation.id, ChatRole::Assistant, content)
                    .with_tokens_used(output.tokens_used),
            )
            .await?;

        if is_new {
            let title = self.titles.generate_title(&request.message).await;
            let update = ConversationUpdate {
                title: Some(title),
                status: None,
            };
            if let Err(e) = self
                .repo
                .update_conversation(user_id, &conversation.id, update)
                .await
            {
                warn!("Failed to store title for {}: {}", conversation.id, e);
            }
        }

        debug!(
            "Conversation {} answered with {} tokens",
            conversation.id, output.tokens_used
        );
        Ok(ChatResponse {
            conversation_id: conversation.id,
            response: MessageView::from(&reply),
            metadata: ChatMetadata {
                tokens_used: output.tokens_used,
                financial_context_included,
            },
        })
    }

    /// One page of the user's conversations.
    pub fn list_conversations(
        &self,
        user_id: &str,
        request: ListConversationsRequest,
    ) -> Result<ConversationPage, AiError> {
        let page = request.page.unwrap_or(1).max(1);
        let limit = request
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, self.config.max_page_limit);
        let status = request.status.unwrap_or_default();

        let (conversations, total) =
            self.repo
                .list_conversations(user_id, status, limit, (page - 1) * limit)?;
        Ok(ConversationPage {
            conversations,
            pagination: Pagination::new(page, limit, total),
        })
    }

    /// A conversation with its whole history.
    pub fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<ConversationDetail, AiError> {
        let conversation = self
            .repo
            .get_conversation(user_id, conversation_id)?
            .ok_or_else(|| AiError::ConversationNotFound(conversation_id.to_string()))?;
        let messages = self.repo.get_messages(&conversation.id)?;

        Ok(ConversationDetail {
            id: conversation.id,
            title: conversation.title,
            status: conversation.status,
            messages: messages.iter().map(MessageView::from).collect(),
            last_message_at: conversation.last_message_at,
            created_at: conversation.created_at,
        })
    }

    /// Renames or (un)archives a conversation.
    pub async fn update_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
        request: ConversationUpdateRequest,
    ) -> Result<ConversationUpdated, AiError> {
        let update = ConversationUpdate::from(request);
        if update.is_empty() {
            return Err(AiError::invalid_input("No valid fields to update"));
        }

        let updated = self
            .repo
            .update_conversation(user_id, conversation_id, update)
            .await?
            .ok_or_else(|| AiError::ConversationNotFound(conversation_id.to_string()))?;
        Ok(ConversationUpdated {
            id: updated.id,
            title: updated.title,
            status: updated.status,
            message: "Conversation updated".to_string(),
        })
    }

    /// Soft delete: the conversation is archived, never removed.
    pub async fn delete_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<(), AiError> {
        let update = ConversationUpdate {
            title: None,
            status: Some(ConversationStatus::Archived),
        };
        self.repo
            .update_conversation(user_id, conversation_id, update)
            .await?
            .map(|_| ())
            .ok_or_else(|| AiError::ConversationNotFound(conversation_id.to_string()))
    }

    /// Archives every active conversation of the user.
    pub async fn archive_all_conversations(&self, user_id: &str) -> Result<usize, AiError> {
        let archived = self.repo.archive_all_conversations(user_id).await?;
        info!("Archived {} conversations for user {}", archived, user_id);
        Ok(archived)
    }
}

//! Database models for chat conversations.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use finbot_ai::{ChatConversation, ChatMessage, ChatRole, ConversationStatus};

#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::chat_conversations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChatConversationDB {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub status: String,
    pub last_message_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Insertable, Associations, Selectable, PartialEq, Debug, Clone)]
#[diesel(belongs_to(ChatConversationDB, foreign_key = conversation_id))]
#[diesel(table_name = crate::schema::chat_messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChatMessageDB {
    pub id: String,
    pub conversation_id: String,
    pub role: String,
    pub content: String,
    pub tokens_used: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl From<&ChatConversation> for ChatConversationDB {
    fn from(conversation: &ChatConversation) -> Self {
        Self {
            id: conversation.id.clone(),
            user_id: conversation.user_id.clone(),
            title: conversation.title.clone(),
            status: conversation.status.as_str().to_string(),
            last_message_at: conversation.last_message_at.naive_utc(),
            created_at: conversation.created_at.naive_utc(),
            updated_at: conversation.updated_at.naive_utc(),
        }
    }
}

impl From<ChatConversationDB> for ChatConversation {
    fn from(db: ChatConversationDB) -> Self {
        Self {
            status: db.status.parse().unwrap_or_else(|e| {
                log::warn!("{} on conversation {}, reading as active", e, db.id);
                ConversationStatus::Active
            }),
            id: db.id,
            user_id: db.user_id,
            title: db.title,
            last_message_at: db.last_message_at.and_utc(),
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        }
    }
}

impl From<&ChatMessage> for ChatMessageDB {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            conversation_id: message.conversation_id.clone(),
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            tokens_used: message.tokens_used,
            created_at: message.created_at.naive_utc(),
        }
    }
}

impl From<ChatMessageDB> for ChatMessage {
    fn from(db: ChatMessageDB) -> Self {
        Self {
            role: db.role.parse().unwrap_or_else(|e| {
                log::warn!("{} on message {}, reading as user", e, db.id);
                ChatRole::User
            }),
            id: db.id,
            conversation_id: db.conversation_id,
            content: db.content,
            tokens_used: db.tokens_used,
            created_at: db.created_at.and_utc(),
        }
    }
}

//! Repository for chat persistence.
//!
//! Implements the `ConversationRepositoryTrait` from finbot-ai.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use finbot_ai::{
    AiError, ChatConversation, ChatMessage, ConversationRepositoryResult,
    ConversationRepositoryTrait, ConversationStatus, ConversationSummary, ConversationUpdate,
};
use finbot_core::errors::Error as CoreError;
use finbot_core::Result as CoreResult;

use super::model::{ChatConversationDB, ChatMessageDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{chat_conversations, chat_messages};

fn core_to_ai_error(e: CoreError) -> AiError {
    AiError::Core(e)
}

fn storage_to_ai_error(e: diesel::result::Error) -> AiError {
    AiError::Core(StorageError::from(e).into())
}

/// SQLite implementation of the conversation repository.
pub struct ConversationRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ConversationRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn summarize(
    conn: &mut SqliteConnection,
    conversation: ChatConversationDB,
) -> ConversationRepositoryResult<ConversationSummary> {
    let message_count = chat_messages::table
        .filter(chat_messages::conversation_id.eq(&conversation.id))
        .count()
        .get_result::<i64>(conn)
        .map_err(storage_to_ai_error)?;
    let last_message = chat_messages::table
        .filter(chat_messages::conversation_id.eq(&conversation.id))
        .order((chat_messages::created_at.desc(), chat_messages::id.desc()))
        .select(chat_messages::content)
        .first::<String>(conn)
        .optional()
        .map_err(storage_to_ai_error)?;

    Ok(ConversationSummary {
        id: conversation.id,
        title: conversation.title,
        last_message: last_message.unwrap_or_default(),
        last_message_at: conversation.last_message_at.and_utc(),
        message_count,
    })
}

#[async_trait]
impl ConversationRepositoryTrait for ConversationRepository {
    async fn create_conversation(
        &self,
        conversation: ChatConversation,
    ) -> ConversationRepositoryResult<ChatConversation> {
        let row = ChatConversationDB::from(&conversation);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> CoreResult<ChatConversation> {
                diesel::insert_into(chat_conversations::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(ChatConversation::from(row))
            })
            .await
            .map_err(core_to_ai_error)
    }

    fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> ConversationRepositoryResult<Option<ChatConversation>> {
        let mut conn = get_connection(&self.pool).map_err(core_to_ai_error)?;
        let row = chat_conversations::table
            .filter(chat_conversations::id.eq(conversation_id))
            .filter(chat_conversations::user_id.eq(user_id))
            .select(ChatConversationDB::as_select())
            .first::<ChatConversationDB>(&mut conn)
            .optional()
            .map_err(storage_to_ai_error)?;
        Ok(row.map(ChatConversation::from))
    }

    fn list_conversations(
        &self,
        user_id: &str,
        status: ConversationStatus,
        limit: i64,
        offset: i64,
    ) -> ConversationRepositoryResult<(Vec<ConversationSummary>, i64)> {
        let mut conn = get_connection(&self.pool).map_err(core_to_ai_error)?;

        let total = chat_conversations::table
            .filter(chat_conversations::user_id.eq(user_id))
            .filter(chat_conversations::status.eq(status.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(storage_to_ai_error)?;

        let rows = chat_conversations::table
            .filter(chat_conversations::user_id.eq(user_id))
            .filter(chat_conversations::status.eq(status.as_str()))
            .order((
                chat_conversations::last_message_at.desc(),
                chat_conversations::id.desc(),
            ))
            .limit(limit)
            .offset(offset)
            .select(ChatConversationDB::as_select())
            .load::<ChatConversationDB>(&mut conn)
            .map_err(storage_to_ai_error)?;

        let summaries = rows
            .into_iter()
            .map(|row| summarize(&mut conn, row))
            .collect::<ConversationRepositoryResult<Vec<_>>>()?;
        Ok((summaries, total))
    }

    async fn update_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
        update: ConversationUpdate,
    ) -> ConversationRepositoryResult<Option<ChatConversation>> {
        let owner = user_id.to_string();
        let target = conversation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> CoreResult<Option<ChatConversation>> {
                let existing = chat_conversations::table
                    .filter(chat_conversations::id.eq(&target))
                    .filter(chat_conversations::user_id.eq(&owner))
                    .select(ChatConversationDB::as_select())
                    .first::<ChatConversationDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                let Some(mut row) = existing else {
                    return Ok(None);
                };

                if let Some(title) = update.title {
                    row.title = title;
                }
                if let Some(status) = update.status {
                    row.status = status.as_str().to_string();
                }
                row.updated_at = Utc::now().naive_utc();

                diesel::update(chat_conversations::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Some(ChatConversation::from(row)))
            })
            .await
            .map_err(core_to_ai_error)
    }

    async fn archive_all_conversations(&self, user_id: &str) -> ConversationRepositoryResult<usize> {
        let owner = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> CoreResult<usize> {
                Ok(diesel::update(
                    chat_conversations::table
                        .filter(chat_conversations::user_id.eq(owner))
                        .filter(chat_conversations::status.eq(ConversationStatus::Active.as_str())),
                )
                .set((
                    chat_conversations::status.eq(ConversationStatus::Archived.as_str()),
                    chat_conversations::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
            .map_err(core_to_ai_error)
    }

    async fn append_message(&self, message: ChatMessage) -> ConversationRepositoryResult<ChatMessage> {
        let row = ChatMessageDB::from(&message);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> CoreResult<ChatMessage> {
                diesel::insert_into(chat_messages::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::update(chat_conversations::table.find(&row.conversation_id))
                    .set((
                        chat_conversations::last_message_at.eq(row.created_at),
                        chat_conversations::updated_at.eq(row.created_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(ChatMessage::from(row))
            })
            .await
            .map_err(core_to_ai_error)
    }

    fn get_messages(&self, conversation_id: &str) -> ConversationRepositoryResult<Vec<ChatMessage>> {
        let mut conn = get_connection(&self.pool).map_err(core_to_ai_error)?;
        let rows = chat_messages::table
            .filter(chat_messages::conversation_id.eq(conversation_id))
            .order((chat_messages::created_at.asc(), chat_messages::id.asc()))
            .select(ChatMessageDB::as_select())
            .load::<ChatMessageDB>(&mut conn)
            .map_err(storage_to_ai_error)?;
        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    fn get_recent_messages(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> ConversationRepositoryResult<Vec<ChatMessage>> {
        let mut conn = get_connection(&self.pool).map_err(core_to_ai_error)?;
        let mut rows = chat_messages::table
            .filter(chat_messages::conversation_id.eq(conversation_id))
            .order((chat_messages::created_at.desc(), chat_messages::id.desc()))
            .limit(limit)
            .select(ChatMessageDB::as_select())
            .load::<ChatMessageDB>(&mut conn)
            .map_err(storage_to_ai_error)?;
        rows.reverse();
        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{insert_user, setup};
    use finbot_ai::ChatRole;

    #[tokio::test]
    async fn messages_bump_conversation_and_feed_summaries() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        let repo = ConversationRepository::new(ctx.pool.clone(), ctx.writer.clone());

        let conversation = repo
            .create_conversation(ChatConversation::new("u1", "New Conversation"))
            .await
            .unwrap();
        for i in 0..12 {
            let role = if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant };
            repo.append_message(ChatMessage::new(&conversation.id, role, format!("pesan {}", i)))
                .await
                .unwrap();
        }

        let recent = repo.get_recent_messages(&conversation.id, 10).unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.first().unwrap().content, "pesan 2");
        assert_eq!(recent.last().unwrap().content, "pesan 11");
        assert_eq!(repo.get_messages(&conversation.id).unwrap().len(), 12);

        let (page, total) = repo
            .list_conversations("u1", ConversationStatus::Active, 20, 0)
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].message_count, 12);
        assert_eq!(page[0].last_message, "pesan 11");
        assert!(page[0].last_message_at >= conversation.last_message_at);
    }

    #[tokio::test]
    async fn updates_and_archiving_are_owner_scoped() {
        let ctx = setup();
        insert_user(&ctx, "u1");
        insert_user(&ctx, "u2");
        let repo = ConversationRepository::new(ctx.pool.clone(), ctx.writer.clone());

        let first = repo.create_conversation(ChatConversation::new("u1", "A")).await.unwrap();
        repo.create_conversation(ChatConversation::new("u1", "B")).await.unwrap();
        let other = repo.create_conversation(ChatConversation::new("u2", "C")).await.unwrap();

        assert!(repo.get_conversation("u1", &other.id).unwrap().is_none());
        let missing = repo
            .update_conversation("u2", &first.id, ConversationUpdate { title: Some("X".into()), status: None })
            .await
            .unwrap();
        assert!(missing.is_none());

        let renamed = repo
            .update_conversation("u1", &first.id, ConversationUpdate { title: Some("Budget".into()), status: None })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.title, "Budget");

        assert_eq!(repo.archive_all_conversations("u1").await.unwrap(), 2);
        let (_, active) = repo.list_conversations("u1", ConversationStatus::Active, 20, 0).unwrap();
        let (_, archived) = repo.list_conversations("u1", ConversationStatus::Archived, 20, 0).unwrap();
        assert_eq!((active, archived), (0, 2));
        let (_, untouched) = repo.list_conversations("u2", ConversationStatus::Active, 20, 0).unwrap();
        assert_eq!(untouched, 1);
    }
}

//! SQLite storage implementation for chat conversations and messages.

mod model;
mod repository;

pub use model::{ChatConversationDB, ChatMessageDB};
pub use repository::ConversationRepository;

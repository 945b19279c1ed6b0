//! FinBot AI - the assistant's chat orchestration using rig-core.
//!
//! # Architecture
//!
//! - `chat`: one chat turn end to end, plus conversation management
//! - `provider`: completion client abstraction and the OpenRouter client
//! - `prompts`: the FinBot system prompt and title instruction
//! - `title_generator`: short titles for new conversations
//! - `types`: conversation domain types, DTOs and the repository trait
//!
//! # Example
//!
//! ```ignore
//! use finbot_ai::{ChatConfig, ChatRequest, ChatService, OpenRouterClient, TitleGenerator};
//!
//! let client = Arc::new(OpenRouterClient::new(api_key, model));
//! let titles = Arc::new(TitleGenerator::new(client.clone(), Default::default()));
//! let service = ChatService::new(repo, client, titles, context, ChatConfig::default());
//!
//! let reply = service.send_message(&user_id, ChatRequest {
//!     message: "Bagaimana cara mulai menabung?".to_string(),
//!     ..Default::default()
//! }).await?;
//! ```

pub mod chat;
pub mod error;
pub mod prompts;
pub mod provider;
pub mod title_generator;
pub mod types;

pub use chat::{ChatConfig, ChatService};
pub use error::AiError;
pub use provider::{
    ChatCompletionClient, CompletionOutput, CompletionParams, CompletionRequest, OpenRouterClient,
    DEFAULT_MODEL,
};
pub use title_generator::{
    FakeTitleGenerator, TitleGenerator, TitleGeneratorConfig, TitleGeneratorTrait,
};
pub use types::{
    // Domain types
    ChatConversation, ChatMessage, ChatRole, ConversationRepositoryResult,
    ConversationRepositoryTrait, ConversationStatus, ConversationSummary, ConversationUpdate,
    // Request and response types
    ChatMetadata, ChatRequest, ChatResponse, ConversationDetail, ConversationPage,
    ConversationUpdateRequest, ConversationUpdated, ListConversationsRequest, MessageView,
    Pagination,
    // Constants
    CHAT_HISTORY_LIMIT, DEFAULT_CONVERSATION_TITLE, DEFAULT_PAGE_LIMIT,
};

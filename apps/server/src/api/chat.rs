use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use finbot_ai::{
    ChatRequest, ConversationDetail, ConversationPage, ConversationUpdateRequest,
    ConversationUpdated, ListConversationsRequest,
};
use finbot_core::rate_limit::CHAT_OPERATION;
use serde::Serialize;

use crate::{api::rate_limit::enforce, auth::AuthUser, error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    archived_count: Option<usize>,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<impl IntoResponse> {
    let headers = enforce(&state, &user.id, CHAT_OPERATION)?;
    let response = state.chat_service.send_message(&user.id, request).await?;
    Ok((headers, Json(response)))
}

async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListConversationsRequest>,
) -> ApiResult<Json<ConversationPage>> {
    let page = state.chat_service.list_conversations(&user.id, query)?;
    Ok(Json(page))
}

async fn archive_all_conversations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ArchiveResponse>> {
    let archived = state
        .chat_service
        .archive_all_conversations(&user.id)
        .await?;
    Ok(Json(ArchiveResponse {
        message: "All conversations archived".to_string(),
        archived_count: Some(archived),
    }))
}

async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConversationDetail>> {
    let detail = state.chat_service.get_conversation(&user.id, &id)?;
    Ok(Json(detail))
}

async fn update_conversation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<ConversationUpdateRequest>,
) -> ApiResult<Json<ConversationUpdated>> {
    let updated = state
        .chat_service
        .update_conversation(&user.id, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ArchiveResponse>> {
    state.chat_service.delete_conversation(&user.id, &id).await?;
    Ok(Json(ArchiveResponse {
        message: "Conversation deleted".to_string(),
        archived_count: None,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(send_message))
        .route(
            "/chat/conversations",
            get(list_conversations).delete(archive_all_conversations),
        )
        .route(
            "/chat/conversations/{id}",
            get(get_conversation)
                .put(update_conversation)
                .delete(delete_conversation),
        )
}

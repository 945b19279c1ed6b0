use std::sync::Arc;

use axum::{extract::State, routing::put, Extension, Json, Router};
use finbot_core::users::{ProfileUpdate, User};
use serde::Serialize;

use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

#[derive(Debug, Serialize)]
struct ProfileResponse {
    message: String,
    user: User,
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<ProfileResponse>> {
    let update = update.normalized()?;
    let user = state
        .user_repository
        .update_profile(&user.id, update)
        .await?;
    tracing::info!("Updated profile of user {}", user.id);
    Ok(Json(ProfileResponse {
        message: "Profile updated".to_string(),
        user,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/profile", put(update_profile))
}

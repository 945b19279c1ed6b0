use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Extension, Json, Router};
use finbot_core::rate_limit::INSIGHTS_OPERATION;

use crate::{
    api::rate_limit::enforce,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let headers = enforce(&state, &user.id, INSIGHTS_OPERATION)?;
    let summary = state
        .financial_context
        .get_financial_summary(&user.id)
        .await
        .map_err(|e| {
            tracing::error!("Error fetching financial summary for {}: {}", user.id, e);
            ApiError::Internal("Failed to fetch financial summary".to_string())
        })?;
    Ok((headers, Json(summary)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/insights/summary", get(get_summary))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use finbot_core::portfolio::{NewPortfolioHolding, PortfolioHolding, PortfolioHoldingUpdate};

use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

async fn list_holdings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<PortfolioHolding>>> {
    let holdings = state.portfolio_service.get_holdings(&user.id).await?;
    Ok(Json(holdings))
}

async fn create_holding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(mut holding): Json<NewPortfolioHolding>,
) -> ApiResult<(StatusCode, Json<PortfolioHolding>)> {
    holding.user_id = user.id;
    let created = state.portfolio_service.create_holding(holding).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_holding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<PortfolioHoldingUpdate>,
) -> ApiResult<Json<PortfolioHolding>> {
    let updated = state
        .portfolio_service
        .update_holding(&user.id, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn delete_holding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.portfolio_service.delete_holding(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(list_holdings).post(create_holding))
        .route(
            "/portfolio/{id}",
            put(update_holding).delete(delete_holding),
        )
}

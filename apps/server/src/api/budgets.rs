use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::Utc;
use finbot_core::budgets::{Budget, BudgetUpdate, BudgetWithSpending, NewBudget};
use finbot_core::utils::time_utils::{calendar_month_of, DEFAULT_REPORTING_TZ};
use serde::Deserialize;

use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

/// Defaults to the current month and active budgets only.
#[derive(Debug, Default, Deserialize)]
struct BudgetQuery {
    year: Option<i32>,
    month: Option<u32>,
    active: Option<bool>,
}

async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BudgetQuery>,
) -> ApiResult<Json<Vec<BudgetWithSpending>>> {
    let (current_year, current_month) = calendar_month_of(Utc::now(), DEFAULT_REPORTING_TZ);
    let budgets = state
        .budget_service
        .get_budgets(
            &user.id,
            query.year.unwrap_or(current_year),
            query.month.unwrap_or(current_month),
            query.active.unwrap_or(true),
        )
        .await?;
    Ok(Json(budgets))
}

async fn create_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(mut budget): Json<NewBudget>,
) -> ApiResult<(StatusCode, Json<Budget>)> {
    budget.user_id = user.id;
    let created = state.budget_service.create_budget(budget).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<BudgetUpdate>,
) -> ApiResult<Json<Budget>> {
    let updated = state
        .budget_service
        .update_budget(&user.id, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.budget_service.delete_budget(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/{id}", put(update_budget).delete(delete_budget))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use finbot_core::goals::{
    ContributionOutcome, GoalStatus, GoalStatusFilter, NewGoalContribution, NewSavingGoal,
    SavingGoalUpdate, SavingGoalWithProgress,
};
use serde::Deserialize;

use crate::{auth::AuthUser, error::ApiResult, main_lib::AppState};

#[derive(Debug, Default, Deserialize)]
struct GoalQuery {
    /// `active` (default), `completed`, `abandoned` or `all`.
    status: Option<String>,
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<GoalQuery>,
) -> ApiResult<Json<Vec<SavingGoalWithProgress>>> {
    let filter = match query.status.as_deref() {
        Some(raw) => raw.parse::<GoalStatusFilter>()?,
        None => GoalStatusFilter::Only(GoalStatus::Active),
    };
    let goals = state.goal_service.get_goals(&user.id, filter)?;
    Ok(Json(goals))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(mut goal): Json<NewSavingGoal>,
) -> ApiResult<(StatusCode, Json<SavingGoalWithProgress>)> {
    goal.user_id = user.id;
    let created = state.goal_service.create_goal(goal).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<SavingGoalUpdate>,
) -> ApiResult<Json<SavingGoalWithProgress>> {
    let updated = state
        .goal_service
        .update_goal(&user.id, &id, update)
        .await?;
    Ok(Json(updated))
}

async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.goal_service.delete_goal(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn contribute(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(contribution): Json<NewGoalContribution>,
) -> ApiResult<Json<ContributionOutcome>> {
    let outcome = state
        .goal_service
        .contribute(&user.id, &id, contribution)
        .await?;
    Ok(Json(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/{id}", put(update_goal).delete(delete_goal))
        .route("/goals/{id}/contribute", post(contribute))
}

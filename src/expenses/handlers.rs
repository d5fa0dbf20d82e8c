use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    error::AppError,
    expenses::{dto::ExpenseRequest, repo_types::Expense},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses/user/:user_id", get(list_user_expenses))
        .route("/expenses/:id", get(get_expense))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

#[instrument(skip(state))]
pub async fn list_expenses(State(state): State<AppState>) -> Result<Json<Vec<Expense>>, AppError> {
    Ok(Json(state.expenses.list_all().await?))
}

#[instrument(skip(state))]
pub async fn list_user_expenses(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Expense>>, AppError> {
    Ok(Json(state.expenses.list_by_user(user_id).await?))
}

#[instrument(skip(state))]
pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    match state.expenses.get_by_id(id).await? {
        Some(e) => Ok(Json(e)),
        None => {
            debug!(id, "expense not found");
            Err(AppError::NotFound)
        }
    }
}

#[instrument(skip(state, body))]
pub async fn create_expense(
    State(state): State<AppState>,
    Json(body): Json<ExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(state.expenses.create(body).await?))
}

#[instrument(skip(state, body))]
pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(state.expenses.update(id, body).await?))
}

#[instrument(skip(state))]
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.expenses.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

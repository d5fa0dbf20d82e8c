use axum::{routing::get, Router};

use crate::state::AppState;

pub const BANNER: &str = "Expense Tracker API is running!";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { BANNER }))
        .route("/status", get(|| async { "OK" }))
}

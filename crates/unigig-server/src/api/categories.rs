//! Public category lookup.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use unigig_store::models::CategoryRow;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryRow>>, ApiError> {
    let categories = state
        .store
        .list_categories()
        .await
        .map_err(|e| ApiError::internal("Error fetching categories", e))?;
    Ok(Json(categories))
}

//! Reviews. A review hangs off one activity-log entry; the unique constraint
//! on the log id is what enforces one review per activity, so the duplicate
//! case surfaces as a store conflict rather than a pre-check.

use crate::error::ApiError;
use crate::middleware::auth::{require_auth, AuthUser};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use unigig_core::FieldError;
use unigig_store::models::ReviewWithActivity;
use unigig_store::StoreError;
use uuid::Uuid;

use super::parse_id;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_review))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/gig/{gig_id}", get(reviews_for_gig))
        .merge(protected)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewBody {
    rating: Option<i32>,
    comment: Option<String>,
    activity_log_id: Option<String>,
}

async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ReviewBody>,
) -> Result<(StatusCode, Json<ReviewWithActivity>), ApiError> {
    let mut errors = Vec::new();
    let rating = body.rating.filter(|r| (1..=5).contains(r));
    if rating.is_none() {
        errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
    }
    let activity_log_id = parse_id(&body.activity_log_id);
    if activity_log_id.is_none() {
        errors.push(FieldError::new("activityLogId", "Activity log is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let activity_log_id = activity_log_id.unwrap();

    state
        .store
        .find_activity_owned(activity_log_id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error creating review", e))?
        .ok_or_else(|| ApiError::not_found("Activity log not found or unauthorized"))?;

    let review = state
        .store
        .create_review(rating.unwrap(), body.comment.as_deref(), activity_log_id)
        .await
        .map_err(|e| match e {
            StoreError::Conflict => {
                ApiError::conflict("Review already exists for this activity")
            }
            other => ApiError::internal("Error creating review", other),
        })?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn reviews_for_gig(
    State(state): State<AppState>,
    Path(gig_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewWithActivity>>, ApiError> {
    let reviews = state
        .store
        .reviews_for_gig(gig_id)
        .await
        .map_err(|e| ApiError::internal("Error fetching reviews", e))?;
    Ok(Json(reviews))
}

//! Current-user endpoints.

use crate::error::ApiError;
use crate::middleware::auth::{require_auth, AuthUser};
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, put};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use unigig_core::{FieldError, Role};

use super::non_empty;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = state
        .store
        .user_profile(user.id)
        .await
        .map_err(|e| ApiError::internal("Error fetching user", e))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "user": profile })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileBody {
    name: Option<String>,
    university: Option<String>,
    major: Option<String>,
    graduation_year: Option<i32>,
    company: Option<String>,
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut errors = Vec::new();
    let name = non_empty(&body.name);
    if name.is_none() {
        errors.push(FieldError::new("name", "Name is required"));
    }
    match user.role {
        Role::Student => {
            if non_empty(&body.university).is_none() {
                errors.push(FieldError::new("university", "University is required"));
            }
            if non_empty(&body.major).is_none() {
                errors.push(FieldError::new("major", "Major is required"));
            }
            if body.graduation_year.is_none() {
                errors.push(FieldError::new("graduationYear", "Invalid graduation year"));
            }
        }
        Role::Client => {}
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    state
        .store
        .update_user_name(user.id, name.unwrap())
        .await
        .map_err(|e| ApiError::internal("Error updating profile", e))?;

    match user.role {
        Role::Student => {
            state
                .store
                .update_student_profile(
                    user.id,
                    non_empty(&body.university).unwrap_or_default(),
                    non_empty(&body.major).unwrap_or_default(),
                    body.graduation_year.unwrap_or_default(),
                )
                .await
                .map_err(|e| ApiError::internal("Error updating profile", e))?;
        }
        Role::Client => {
            state
                .store
                .update_client_profile(user.id, non_empty(&body.company))
                .await
                .map_err(|e| ApiError::internal("Error updating profile", e))?;
        }
    }

    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

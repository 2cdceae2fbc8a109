//! Gig CRUD, status transitions, and the apply flow.
//!
//! Applying runs as an explicit step list with per-step compensation: the
//! activity log is removed again if the conversation or opening message
//! cannot be written, so a half-applied gig never lingers.

use crate::error::ApiError;
use crate::middleware::auth::{require_auth, AuthUser};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use unigig_core::{actions, FieldError, GigStatus};
use unigig_store::gigs::{GigFilter, GigUpdate, NewGig};
use unigig_store::models::{GigDetailView, GigView};
use uuid::Uuid;

use super::{non_empty, parse_id};

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_gig))
        .route("/{id}", put(update_gig).delete(delete_gig))
        .route("/{id}/status", patch(change_gig_status))
        .route("/{id}/apply", post(apply_to_gig))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/", get(list_gigs))
        .route("/{id}", get(get_gig))
        .merge(protected)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GigBody {
    title: Option<String>,
    description: Option<String>,
    budget: Option<f64>,
    category_id: Option<String>,
}

/// Validate a gig payload; all four fields are required on create and update.
fn validate_gig(body: &GigBody) -> Result<(&str, &str, f64, Uuid), ApiError> {
    let mut errors = Vec::new();
    let title = non_empty(&body.title);
    if title.is_none() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    let description = non_empty(&body.description);
    if description.is_none() {
        errors.push(FieldError::new("description", "Description is required"));
    }
    let budget = body.budget.filter(|b| *b >= 0.0);
    if budget.is_none() {
        errors.push(FieldError::new("budget", "Budget must be a positive number"));
    }
    let category_id = parse_id(&body.category_id);
    if category_id.is_none() {
        errors.push(FieldError::new("categoryId", "Category is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    Ok((
        title.unwrap(),
        description.unwrap(),
        budget.unwrap(),
        category_id.unwrap(),
    ))
}

async fn create_gig(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<GigBody>,
) -> Result<(StatusCode, Json<GigView>), ApiError> {
    let (title, description, budget, category_id) = validate_gig(&body)?;

    let client = state
        .store
        .client_by_user(user.id)
        .await
        .map_err(|e| ApiError::internal("Error creating gig", e))?
        .ok_or_else(|| ApiError::forbidden("Only clients can create gigs"))?;

    let id = state
        .store
        .create_gig(NewGig {
            title,
            description,
            budget,
            client_id: client.id,
            category_id,
        })
        .await
        .map_err(|e| ApiError::internal("Error creating gig", e))?;

    state
        .store
        .log_activity(actions::GIG_CREATED, user.id, id)
        .await
        .map_err(|e| ApiError::internal("Error creating gig", e))?;

    let view = state
        .store
        .gig_view(id)
        .await
        .map_err(|e| ApiError::internal("Error creating gig", e))?
        .ok_or_else(|| ApiError::not_found("Gig not found"))?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GigListQuery {
    status: Option<String>,
    search: Option<String>,
    min_budget: Option<f64>,
    max_budget: Option<f64>,
}

async fn list_gigs(
    State(state): State<AppState>,
    Query(query): Query<GigListQuery>,
) -> Result<Json<Vec<GigView>>, ApiError> {
    let status = match non_empty(&query.status) {
        Some(raw) => Some(GigStatus::from_str(raw).map_err(|_| {
            ApiError::Validation(vec![FieldError::new("status", "Invalid status")])
        })?),
        None => None,
    };

    let gigs = state
        .store
        .list_gigs(GigFilter {
            status,
            search: non_empty(&query.search).map(str::to_string),
            min_budget: query.min_budget,
            max_budget: query.max_budget,
        })
        .await
        .map_err(|e| ApiError::internal("Error fetching gigs", e))?;
    Ok(Json(gigs))
}

async fn get_gig(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GigDetailView>, ApiError> {
    let detail = state
        .store
        .gig_detail(id)
        .await
        .map_err(|e| ApiError::internal("Error fetching gig", e))?
        .ok_or_else(|| ApiError::not_found("Gig not found"))?;
    Ok(Json(detail))
}

async fn update_gig(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<GigBody>,
) -> Result<Json<GigView>, ApiError> {
    let (title, description, budget, category_id) = validate_gig(&body)?;

    state
        .store
        .find_gig_owned(id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error updating gig", e))?
        .ok_or_else(|| ApiError::not_found("Gig not found or unauthorized"))?;

    state
        .store
        .update_gig(
            id,
            GigUpdate {
                title,
                description,
                budget,
                category_id,
            },
        )
        .await
        .map_err(|e| ApiError::internal("Error updating gig", e))?;

    state
        .store
        .log_activity(actions::GIG_UPDATED, user.id, id)
        .await
        .map_err(|e| ApiError::internal("Error updating gig", e))?;

    let view = state
        .store
        .gig_view(id)
        .await
        .map_err(|e| ApiError::internal("Error updating gig", e))?
        .ok_or_else(|| ApiError::not_found("Gig not found"))?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: Option<String>,
}

async fn change_gig_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<GigView>, ApiError> {
    let status = non_empty(&body.status)
        .and_then(|raw| GigStatus::from_str(raw).ok())
        .filter(GigStatus::is_transition_target)
        .ok_or_else(|| {
            ApiError::Validation(vec![FieldError::new("status", "Invalid status")])
        })?;

    let allowed = state
        .store
        .can_manage_gig_status(id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error updating gig status", e))?;
    if !allowed {
        return Err(ApiError::not_found("Gig not found or unauthorized"));
    }

    state
        .store
        .set_gig_status(id, status)
        .await
        .map_err(|e| ApiError::internal("Error updating gig status", e))?;

    state
        .store
        .log_activity(&actions::gig_status_changed(status), user.id, id)
        .await
        .map_err(|e| ApiError::internal("Error updating gig status", e))?;

    let view = state
        .store
        .gig_view(id)
        .await
        .map_err(|e| ApiError::internal("Error updating gig status", e))?
        .ok_or_else(|| ApiError::not_found("Gig not found"))?;
    Ok(Json(view))
}

async fn delete_gig(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .find_gig_owned(id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error deleting gig", e))?
        .ok_or_else(|| ApiError::not_found("Gig not found or unauthorized"))?;

    state
        .store
        .delete_gig(id)
        .await
        .map_err(|e| ApiError::internal("Error deleting gig", e))?;

    Ok(Json(json!({ "message": "Gig deleted successfully" })))
}

async fn apply_to_gig(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .student_by_user(user.id)
        .await
        .map_err(|e| ApiError::internal("Error applying for gig", e))?
        .ok_or_else(|| ApiError::forbidden("Only students can apply for gigs"))?;

    let gig = state
        .store
        .find_open_gig(id)
        .await
        .map_err(|e| ApiError::internal("Error applying for gig", e))?
        .ok_or_else(|| ApiError::not_found("Gig not found or not open for applications"))?;

    // Step 1: record the application.
    let log = state
        .store
        .log_activity(actions::STUDENT_APPLIED, user.id, gig.id)
        .await
        .map_err(|e| ApiError::internal("Error applying for gig", e))?;

    // Step 2: find or create the applicant/client conversation. The upsert is
    // idempotent, so it needs no compensation of its own.
    let (conversation, _created) = match state
        .store
        .ensure_conversation(user.id, gig.client_user_id)
        .await
    {
        Ok(pair) => pair,
        Err(e) => {
            unwind_application(&state, log.id).await;
            return Err(ApiError::internal("Error applying for gig", e));
        }
    };

    // Step 3: open with a canned message and bump the conversation.
    let content = format!("I would like to apply for your gig: {}", gig.title);
    if let Err(e) = state
        .store
        .create_message(conversation.id, user.id, &content)
        .await
    {
        unwind_application(&state, log.id).await;
        return Err(ApiError::internal("Error applying for gig", e));
    }

    Ok(Json(json!({ "message": "Application submitted successfully" })))
}

/// Best-effort compensation: a failure here is logged, not retried.
async fn unwind_application(state: &AppState, log_id: Uuid) {
    if let Err(e) = state.store.delete_activity_log(log_id).await {
        tracing::warn!(activity_log = %log_id, error = %e, "failed to unwind application log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::DisabledProvider;
    use crate::config::AppConfig;
    use sqlx::PgPool;
    use std::sync::Arc;
    use unigig_core::Role;
    use unigig_store::users::NewUser;
    use unigig_store::Store;
    use unigig_token::{TokenIssuer, TokenVerifier};

    fn test_state(pool: PgPool) -> AppState {
        AppState {
            cfg: Arc::new(AppConfig::default()),
            store: Store::from_pool(pool),
            issuer: TokenIssuer::new("test-secret").unwrap(),
            verifier: TokenVerifier::new("test-secret").unwrap(),
            identity: Arc::new(DisabledProvider),
        }
    }

    #[sqlx::test(migrations = "../unigig-store/migrations")]
    async fn applying_returns_a_plain_success_message(pool: PgPool) {
        let state = test_state(pool.clone());

        let client_user = state
            .store
            .create_user(NewUser {
                email: "client@x.com",
                password_hash: "$argon2id$unused",
                name: "Client",
                role: Role::Client,
            })
            .await
            .unwrap();
        let client = state
            .store
            .create_client(client_user.id, None)
            .await
            .unwrap();

        let student_user = state
            .store
            .create_user(NewUser {
                email: "student@x.com",
                password_hash: "$argon2id$unused",
                name: "Student",
                role: Role::Student,
            })
            .await
            .unwrap();
        state
            .store
            .create_student(student_user.id, "U", "M", 2027)
            .await
            .unwrap();

        let category_id = Uuid::new_v4();
        sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, 'Design', '')")
            .bind(category_id)
            .execute(&pool)
            .await
            .unwrap();
        let gig_id = state
            .store
            .create_gig(NewGig {
                title: "Logo refresh",
                description: "New logo for the landing page",
                budget: 150.0,
                client_id: client.id,
                category_id,
            })
            .await
            .unwrap();

        let Json(body) = apply_to_gig(
            State(state),
            Extension(AuthUser {
                id: student_user.id,
                role: Role::Student,
            }),
            Path(gig_id),
        )
        .await
        .unwrap();

        assert_eq!(body, json!({ "message": "Application submitted successfully" }));

        // The saga's three writes all landed.
        let logs: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM activity_logs WHERE gig_id = $1 AND action = 'STUDENT_APPLIED'",
        )
        .bind(gig_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(logs, 1);

        let messages: i64 = sqlx::query_scalar("SELECT count(*) FROM messages")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(messages, 1);
    }
}

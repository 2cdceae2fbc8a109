//! Registration and login.

use crate::api::non_empty;
use crate::auth::password;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use unigig_core::{validation::is_valid_email, FieldError, Role};
use unigig_store::users::NewUser;
use unigig_store::StoreError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
    role: Option<String>,
    // STUDENT profile fields
    university: Option<String>,
    major: Option<String>,
    graduation_year: Option<i32>,
    // CLIENT profile field
    company: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mut errors = Vec::new();

    let email = non_empty(&body.email).filter(|e| is_valid_email(e));
    if email.is_none() {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }

    let policy = &state.cfg.auth.password_policy;
    let password = body.password.as_deref().filter(|p| policy.validate(p));
    if password.is_none() {
        errors.push(FieldError::new("password", policy.requirement_message()));
    }

    let name = non_empty(&body.name);
    if name.is_none() {
        errors.push(FieldError::new("name", "Name is required"));
    }

    let role = body.role.as_deref().and_then(|r| Role::from_str(r).ok());
    if role.is_none() {
        errors.push(FieldError::new("role", "Invalid role"));
    }

    if role == Some(Role::Student) {
        if non_empty(&body.university).is_none() {
            errors.push(FieldError::new("university", "University is required"));
        }
        if non_empty(&body.major).is_none() {
            errors.push(FieldError::new("major", "Major is required"));
        }
        let current_year = Utc::now().year();
        if body.graduation_year.is_none_or(|y| y < current_year) {
            errors.push(FieldError::new("graduationYear", "Invalid graduation year"));
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let (email, password, name, role) = (
        email.unwrap().to_string(),
        password.unwrap().to_string(),
        name.unwrap().to_string(),
        role.unwrap(),
    );

    let existing = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal("Error registering user", e))?;
    if existing.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    // Mirror the identity upstream first; if any local write fails below, the
    // upstream record is removed best-effort.
    let identity_id = state
        .identity
        .create_identity(&email, &password)
        .await
        .map_err(|e| ApiError::internal("Error registering user", e))?;

    let password_hash =
        password::hash(&password).map_err(|e| ApiError::internal("Error registering user", e))?;

    let user = match state
        .store
        .create_user(NewUser {
            email: &email,
            password_hash: &password_hash,
            name: &name,
            role,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::Conflict) => {
            rollback_identity(&state, identity_id.as_deref()).await;
            return Err(ApiError::conflict("User already exists"));
        }
        Err(e) => {
            rollback_identity(&state, identity_id.as_deref()).await;
            return Err(ApiError::internal("Error registering user", e));
        }
    };

    let profile_result = match role {
        Role::Student => state
            .store
            .create_student(
                user.id,
                body.university.as_deref().unwrap_or_default().trim(),
                body.major.as_deref().unwrap_or_default().trim(),
                body.graduation_year.unwrap_or_default(),
            )
            .await
            .map(|_| ()),
        Role::Client => state
            .store
            .create_client(user.id, non_empty(&body.company))
            .await
            .map(|_| ()),
    };
    if let Err(e) = profile_result {
        rollback_identity(&state, identity_id.as_deref()).await;
        return Err(ApiError::internal("Error registering user", e));
    }

    let token = state
        .issuer
        .issue(user.id, role)
        .map_err(|e| ApiError::internal("Error registering user", e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": {
                "id": user.id,
                "email": user.email,
                "name": user.name,
                "role": user.role,
            },
        })),
    ))
}

/// Best-effort compensation: remove the upstream identity record. Failures
/// are logged, not retried.
async fn rollback_identity(state: &AppState, identity_id: Option<&str>) {
    let Some(id) = identity_id else { return };
    if let Err(e) = state.identity.delete_identity(id).await {
        tracing::warn!(error = %e, identity_id = id, "failed to roll back external identity");
    }
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut errors = Vec::new();
    let email = non_empty(&body.email).filter(|e| is_valid_email(e));
    if email.is_none() {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }
    let password = non_empty(&body.password);
    if password.is_none() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let (email, password) = (email.unwrap(), password.unwrap());

    if state.identity.sign_in(email, password).await.is_err() {
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let user = state
        .store
        .find_user_by_email(email)
        .await
        .map_err(|e| ApiError::internal("Error logging in", e))?
        .ok_or_else(|| ApiError::unauthenticated("Invalid credentials"))?;

    if !password::verify(&user.password_hash, password) {
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let role = Role::from_str(&user.role)
        .map_err(|e| ApiError::internal("Error logging in", anyhow::Error::new(e)))?;
    let token = state
        .issuer
        .issue(user.id, role)
        .map_err(|e| ApiError::internal("Error logging in", e))?;

    Ok(Json(json!({
        "message": "Logged in successfully",
        "token": token,
        "user": {
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "role": user.role,
        },
    })))
}

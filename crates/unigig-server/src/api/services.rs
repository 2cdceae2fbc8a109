//! Service CRUD. Students own services; reads are public.

use crate::error::ApiError;
use crate::middleware::auth::{require_auth, AuthUser};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use unigig_core::FieldError;
use unigig_store::models::ServiceView;
use unigig_store::services::{NewService, ServiceFilter, ServicePatch};
use uuid::Uuid;

use super::{non_empty, parse_id};

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_service))
        .route("/{id}", axum::routing::put(update_service).delete(delete_service))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/", get(list_services))
        .route("/{id}", get(get_service))
        .merge(protected)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceBody {
    title: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    category_id: Option<String>,
}

async fn create_service(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ServiceBody>,
) -> Result<(StatusCode, Json<ServiceView>), ApiError> {
    let mut errors = Vec::new();
    let title = non_empty(&body.title);
    if title.is_none() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    let description = non_empty(&body.description);
    if description.is_none() {
        errors.push(FieldError::new("description", "Description is required"));
    }
    let price = body.price.filter(|p| *p >= 0.0);
    if price.is_none() {
        errors.push(FieldError::new("price", "Price must be a positive number"));
    }
    let category_id = parse_id(&body.category_id);
    if category_id.is_none() {
        errors.push(FieldError::new("categoryId", "Category is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let student = state
        .store
        .student_by_user(user.id)
        .await
        .map_err(|e| ApiError::internal("Error creating service", e))?
        .ok_or_else(|| ApiError::forbidden("Only students can create services"))?;

    let id = state
        .store
        .create_service(NewService {
            title: title.unwrap(),
            description: description.unwrap(),
            price: price.unwrap(),
            student_id: student.id,
            category_id: category_id.unwrap(),
        })
        .await
        .map_err(|e| ApiError::internal("Error creating service", e))?;

    let view = state
        .store
        .service_view(id)
        .await
        .map_err(|e| ApiError::internal("Error creating service", e))?
        .ok_or_else(|| ApiError::not_found("Service not found"))?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceListQuery {
    category: Option<String>,
    search: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
}

async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServiceListQuery>,
) -> Result<Json<Vec<ServiceView>>, ApiError> {
    let category = match non_empty(&query.category) {
        Some(raw) => Some(Uuid::parse_str(raw).map_err(|_| {
            ApiError::Validation(vec![FieldError::new("category", "Invalid category")])
        })?),
        None => None,
    };

    let services = state
        .store
        .list_services(ServiceFilter {
            category,
            search: non_empty(&query.search).map(str::to_string),
            min_price: query.min_price,
            max_price: query.max_price,
        })
        .await
        .map_err(|e| ApiError::internal("Error fetching services", e))?;
    Ok(Json(services))
}

async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceView>, ApiError> {
    let service = state
        .store
        .service_view(id)
        .await
        .map_err(|e| ApiError::internal("Error fetching service", e))?
        .ok_or_else(|| ApiError::not_found("Service not found"))?;
    Ok(Json(service))
}

async fn update_service(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ServiceBody>,
) -> Result<Json<ServiceView>, ApiError> {
    // All fields optional, but present fields must be valid.
    let mut errors = Vec::new();
    if body.title.is_some() && non_empty(&body.title).is_none() {
        errors.push(FieldError::new("title", "Title cannot be empty"));
    }
    if body.description.is_some() && non_empty(&body.description).is_none() {
        errors.push(FieldError::new("description", "Description cannot be empty"));
    }
    if body.price.is_some_and(|p| p < 0.0) {
        errors.push(FieldError::new("price", "Price must be a positive number"));
    }
    if body.category_id.is_some() && parse_id(&body.category_id).is_none() {
        errors.push(FieldError::new("categoryId", "Category cannot be empty"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    state
        .store
        .find_service_owned(id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error updating service", e))?
        .ok_or_else(|| ApiError::not_found("Service not found or unauthorized"))?;

    state
        .store
        .update_service(
            id,
            ServicePatch {
                title: non_empty(&body.title),
                description: non_empty(&body.description),
                price: body.price,
                category_id: parse_id(&body.category_id),
            },
        )
        .await
        .map_err(|e| ApiError::internal("Error updating service", e))?;

    let view = state
        .store
        .service_view(id)
        .await
        .map_err(|e| ApiError::internal("Error updating service", e))?
        .ok_or_else(|| ApiError::not_found("Service not found"))?;
    Ok(Json(view))
}

async fn delete_service(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .find_service_owned(id, user.id)
        .await
        .map_err(|e| ApiError::internal("Error deleting service", e))?
        .ok_or_else(|| ApiError::not_found("Service not found or unauthorized"))?;

    state
        .store
        .delete_service(id)
        .await
        .map_err(|e| ApiError::internal("Error deleting service", e))?;

    Ok(Json(json!({ "message": "Service deleted successfully" })))
}

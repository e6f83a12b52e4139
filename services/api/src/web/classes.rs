//! services/api/src/web/classes.rs
//!
//! Recorded class handlers: public listing/detail plus instructor-only
//! creation and edits.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use learnhub_core::domain::{NewRecordedClass, RecordedClassUpdate};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::courses::{validate_title, validate_url};
use crate::web::identity::ensure_instructor;
use crate::web::middleware::optional_user_id;
use crate::web::rest::{port_error_response, subscription_for, ClassDto};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct CreateClassRequest {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub is_free: bool,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateClassRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub is_free: Option<bool>,
}

/// List recorded classes, newest first.
#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Recorded classes", body = [ClassDto]),
        (status = 502, description = "Could not load classes")
    )
)]
pub async fn list_classes_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = Utc::now();
    let caller = optional_user_id(&state, &headers).await;
    let subscription = subscription_for(&state, caller, now)
        .await
        .map_err(|e| port_error_response("your subscription", e))?;

    let classes = state
        .repo
        .list_classes()
        .await
        .map_err(|e| port_error_response("recorded classes", e))?;
    let dtos: Vec<ClassDto> = classes
        .into_iter()
        .map(|c| ClassDto::project(c, subscription.as_ref(), now))
        .collect();
    Ok(Json(dtos))
}

/// Fetch one recorded class by id.
#[utoipa::path(
    get,
    path = "/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "Recorded class", body = ClassDto),
        (status = 404, description = "No such class"),
        (status = 502, description = "Could not load the class")
    )
)]
pub async fn get_class_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = Utc::now();
    let caller = optional_user_id(&state, &headers).await;
    let subscription = subscription_for(&state, caller, now)
        .await
        .map_err(|e| port_error_response("your subscription", e))?;

    let class = state
        .repo
        .get_class_by_id(id)
        .await
        .map_err(|e| port_error_response("the class", e))?;
    Ok(Json(ClassDto::project(class, subscription.as_ref(), now)))
}

/// Create a recorded class. Instructor only.
#[utoipa::path(
    post,
    path = "/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassDto),
        (status = 403, description = "Caller is not the instructor"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create_class_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let caller = ensure_instructor(&state, user_id).await?;

    validate_title(&req.title).map_err(|m| (StatusCode::UNPROCESSABLE_ENTITY, m))?;
    validate_url(&req.video_url).map_err(|m| (StatusCode::UNPROCESSABLE_ENTITY, m))?;

    let class = state
        .repo
        .create_class(NewRecordedClass {
            title: req.title.trim().to_string(),
            description: req.description,
            video_url: req.video_url,
            instructor_id: caller.id,
            is_free: req.is_free,
        })
        .await
        .map_err(|e| port_error_response("the new class", e))?;

    let now = Utc::now();
    Ok((StatusCode::CREATED, Json(ClassDto::project(class, None, now))))
}

/// Update a recorded class. Instructor only.
#[utoipa::path(
    put,
    path = "/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Class updated"),
        (status = 403, description = "Caller is not the instructor"),
        (status = 404, description = "No such class"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn update_class_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClassRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_instructor(&state, user_id).await?;

    if let Some(title) = &req.title {
        validate_title(title).map_err(|m| (StatusCode::UNPROCESSABLE_ENTITY, m))?;
    }
    if let Some(url) = &req.video_url {
        validate_url(url).map_err(|m| (StatusCode::UNPROCESSABLE_ENTITY, m))?;
    }

    state
        .repo
        .update_class(
            id,
            RecordedClassUpdate {
                title: req.title.map(|t| t.trim().to_string()),
                description: req.description,
                video_url: req.video_url,
                is_free: req.is_free,
            },
        )
        .await
        .map_err(|e| port_error_response("the class", e))?;
    Ok(StatusCode::OK)
}

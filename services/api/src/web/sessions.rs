//! services/api/src/web/sessions.rs
//!
//! Live session handlers. Liveness is an explicit stored status, not
//! inferred from a row's existence; ended sessions drop out of listings.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use learnhub_core::domain::NewLiveSession;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::courses::{validate_title, validate_url};
use crate::web::identity::ensure_instructor;
use crate::web::middleware::optional_user_id;
use crate::web::rest::{port_error_response, subscription_for, LiveSessionDto};
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct StartSessionRequest {
    pub title: String,
    pub description: String,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub is_free: bool,
    pub meeting_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct StartSessionResponse {
    pub id: Uuid,
}

/// List sessions that have not ended.
#[utoipa::path(
    get,
    path = "/live-sessions",
    responses(
        (status = 200, description = "Upcoming and live sessions", body = [LiveSessionDto]),
        (status = 502, description = "Could not load sessions")
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = Utc::now();
    let caller = optional_user_id(&state, &headers).await;
    let subscription = subscription_for(&state, caller, now)
        .await
        .map_err(|e| port_error_response("your subscription", e))?;

    let sessions = state
        .repo
        .list_live_sessions()
        .await
        .map_err(|e| port_error_response("live sessions", e))?;
    let dtos: Vec<LiveSessionDto> = sessions
        .into_iter()
        .map(|s| LiveSessionDto::project(s, subscription.as_ref(), now))
        .collect();
    Ok(Json(dtos))
}

/// Go live: create a session in the `live` state. Instructor only.
#[utoipa::path(
    post,
    path = "/live-sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = StartSessionResponse),
        (status = 403, description = "Caller is not the instructor"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn start_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let caller = ensure_instructor(&state, user_id).await?;

    validate_title(&req.title).map_err(|m| (StatusCode::UNPROCESSABLE_ENTITY, m))?;
    validate_url(&req.meeting_url).map_err(|m| (StatusCode::UNPROCESSABLE_ENTITY, m))?;

    let id = state
        .repo
        .start_live_session(NewLiveSession {
            title: req.title.trim().to_string(),
            description: req.description,
            instructor_id: caller.id,
            scheduled_time: req.scheduled_time.unwrap_or_else(Utc::now),
            is_free: req.is_free,
            meeting_url: req.meeting_url,
        })
        .await
        .map_err(|e| port_error_response("the new session", e))?;
    Ok((StatusCode::CREATED, Json(StartSessionResponse { id })))
}

/// End a live session. Instructor only.
#[utoipa::path(
    post,
    path = "/live-sessions/{id}/end",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session ended"),
        (status = 403, description = "Caller is not the instructor"),
        (status = 404, description = "No such session")
    )
)]
pub async fn end_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_instructor(&state, user_id).await?;
    state
        .repo
        .end_live_session(id)
        .await
        .map_err(|e| port_error_response("the session", e))?;
    Ok(StatusCode::OK)
}

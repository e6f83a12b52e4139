//! services/api/src/web/admin.rs
//!
//! Admin-panel endpoints: registered-user listing and the one-time
//! instructor claim.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use learnhub_core::domain::ClaimOutcome;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::identity::{ensure_instructor, resolve_caller};
use crate::web::rest::port_error_response;
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ClaimResponse {
    pub instructor_uid: Uuid,
    pub claimed: bool,
}

/// List all registered users. Instructor only.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Registered users", body = [UserDto]),
        (status = 403, description = "Caller is not the instructor"),
        (status = 502, description = "Could not load users")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_instructor(&state, user_id).await?;
    let users = state
        .repo
        .list_users()
        .await
        .map_err(|e| port_error_response("registered users", e))?;
    let dtos: Vec<UserDto> = users
        .into_iter()
        .map(|u| UserDto {
            id: u.id,
            name: u.name,
            email: u.email,
        })
        .collect();
    Ok(Json(dtos))
}

/// Claim the instructor designation for the signed-in caller.
///
/// First successful claim wins, atomically; every later attempt is rejected
/// with the standing designation, never overwritten.
#[utoipa::path(
    post,
    path = "/admin/instructor",
    responses(
        (status = 200, description = "Designation claimed", body = ClaimResponse),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Designation already held"),
        (status = 502, description = "Claim could not be recorded")
    )
)]
pub async fn claim_instructor_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let caller = resolve_caller(&state, user_id)
        .await
        .map_err(|e| port_error_response("your profile", e))?;

    let outcome = state
        .repo
        .claim_instructor(caller.id, caller.email.as_deref())
        .await
        .map_err(|e| port_error_response("the instructor claim", e))?;

    match outcome {
        ClaimOutcome::Won(designation) => Ok((
            StatusCode::OK,
            Json(ClaimResponse {
                instructor_uid: designation.uid,
                claimed: true,
            }),
        )),
        ClaimOutcome::Lost(standing) => Err((
            StatusCode::CONFLICT,
            format!("The instructor designation is already held by {}", standing.uid),
        )),
    }
}

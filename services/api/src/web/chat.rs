//! services/api/src/web/chat.rs
//!
//! The AI tutor endpoint. Forwards the caller's identity and message to the
//! opaque completion service and relays the text back.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::identity::resolve_caller;
use crate::web::rest::port_error_response;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

/// Ask the tutor a question.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Tutor reply", body = ChatResponse),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Empty message"),
        (status = 502, description = "The assistant could not answer")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.message.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Message cannot be empty".to_string(),
        ));
    }

    // Anonymous display name is fine if the user row is unreadable; the
    // tutor reply should not fail on a profile hiccup.
    let display_name = match resolve_caller(&state, user_id).await {
        Ok(caller) => Some(caller.name),
        Err(e) => {
            error!("Could not resolve caller for chat: {:?}", e);
            None
        }
    };

    let response = state
        .chat
        .tutor_reply(display_name.as_deref(), req.message.trim())
        .await
        .map_err(|e| port_error_response("a tutor reply", e))?;
    Ok(Json(ChatResponse { response }))
}

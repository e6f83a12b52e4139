//! services/api/src/web/identity.rs
//!
//! Resolves the current caller and their instructor status. The designation
//! is data in the store, read on every check; nothing here mutates
//! process-wide configuration.

use axum::http::StatusCode;
use learnhub_core::policy;
use learnhub_core::ports::PortResult;
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;

/// The resolved identity of a signed-in caller.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

pub async fn resolve_caller(state: &AppState, user_id: Uuid) -> PortResult<Caller> {
    let user = state.repo.get_user(user_id).await?;
    Ok(Caller {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}

/// Pure read: evaluates the management policy for the caller against the
/// stored designation and the legacy configured email alias.
pub async fn caller_may_manage(state: &AppState, caller: &Caller) -> PortResult<bool> {
    let designation = state.repo.instructor_designation().await?;
    Ok(policy::can_manage(
        caller.id,
        caller.email.as_deref(),
        designation.as_ref(),
        state.config.instructor_email.as_deref(),
    ))
}

/// Gate for management endpoints. Resolves the caller and rejects with 403
/// unless they hold the instructor designation. Safe to call redundantly.
pub async fn ensure_instructor(
    state: &AppState,
    user_id: Uuid,
) -> Result<Caller, (StatusCode, String)> {
    let caller = resolve_caller(state, user_id).await.map_err(|e| {
        error!("Failed to resolve caller {}: {:?}", user_id, e);
        (StatusCode::UNAUTHORIZED, "Unknown caller".to_string())
    })?;

    let may_manage = caller_may_manage(state, &caller).await.map_err(|e| {
        error!("Failed to check instructor designation: {:?}", e);
        (
            StatusCode::BAD_GATEWAY,
            "Could not verify instructor status".to_string(),
        )
    })?;

    if !may_manage {
        return Err((
            StatusCode::FORBIDDEN,
            "Only the instructor may perform this action".to_string(),
        ));
    }
    Ok(caller)
}

//! services/api/src/web/billing.rs
//!
//! The simulated checkout flow and the billing page's subscription listing.
//! No payment provider is involved; checkout validates the card form, waits
//! briefly, and creates the subscription record.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use learnhub_core::domain::{Subscription, SubscriptionStatus};
use learnhub_core::subscription::purchase;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::port_error_response;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub card_name: String,
    pub card_number: String,
    /// MM/YY
    pub expiry_date: String,
    pub cvc: String,
}

#[derive(Serialize, ToSchema)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Whether this row currently grants access (expiry checked lazily).
    pub active: bool,
}

fn status_label(status: SubscriptionStatus) -> String {
    match status {
        SubscriptionStatus::Active => "active".to_string(),
        SubscriptionStatus::Inactive => "inactive".to_string(),
        SubscriptionStatus::Cancelled => "cancelled".to_string(),
    }
}

impl SubscriptionDto {
    fn project(s: Subscription, now: DateTime<Utc>) -> Self {
        Self {
            id: s.id,
            status: status_label(s.status),
            start_date: s.start_date,
            end_date: s.end_date,
            active: s.is_active_at(now),
        }
    }
}

/// Mirrors the card form checks the checkout page performs; nothing here is
/// sent anywhere.
pub fn validate_card(req: &CheckoutRequest) -> Result<(), String> {
    if req.card_name.trim().len() < 2 {
        return Err("Name on card is required".to_string());
    }
    if req.card_number.len() != 16 || !req.card_number.chars().all(|c| c.is_ascii_digit()) {
        return Err("Card number must be 16 digits".to_string());
    }
    let expiry_ok = req.expiry_date.len() == 5
        && req.expiry_date.as_bytes()[2] == b'/'
        && matches!(&req.expiry_date[..2], "01" | "02" | "03" | "04" | "05" | "06" | "07" | "08" | "09" | "10" | "11" | "12")
        && req.expiry_date[3..].chars().all(|c| c.is_ascii_digit());
    if !expiry_ok {
        return Err("Expiry date must be in MM/YY format".to_string());
    }
    if req.cvc.len() != 3 || !req.cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err("CVC must be 3 digits".to_string());
    }
    Ok(())
}

/// Simulated checkout: creates a one-month subscription for the caller.
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionDto),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Invalid card details or already subscribed"),
        (status = 502, description = "Subscription could not be created")
    )
)]
pub async fn checkout_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    validate_card(&req).map_err(|m| (StatusCode::UNPROCESSABLE_ENTITY, m))?;

    // Stand-in for the payment provider round trip.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let now = Utc::now();
    let subscription = purchase(state.repo.as_ref(), user_id, now)
        .await
        .map_err(|e| port_error_response("your subscription", e))?;
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionDto::project(subscription, now)),
    ))
}

/// List the caller's subscriptions for the billing page.
#[utoipa::path(
    get,
    path = "/billing/subscriptions",
    responses(
        (status = 200, description = "The caller's subscriptions", body = [SubscriptionDto]),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "Could not load subscriptions")
    )
)]
pub async fn list_subscriptions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = Utc::now();
    let subs = state
        .repo
        .subscriptions_for_user(user_id)
        .await
        .map_err(|e| port_error_response("your subscriptions", e))?;
    let dtos: Vec<SubscriptionDto> = subs
        .into_iter()
        .map(|s| SubscriptionDto::project(s, now))
        .collect();
    Ok(Json(dtos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_card() -> CheckoutRequest {
        CheckoutRequest {
            card_name: "Ada Lovelace".to_string(),
            card_number: "4242424242424242".to_string(),
            expiry_date: "09/27".to_string(),
            cvc: "123".to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_card() {
        assert!(validate_card(&valid_card()).is_ok());
    }

    #[test]
    fn rejects_bad_card_numbers() {
        let mut req = valid_card();
        req.card_number = "4242".to_string();
        assert!(validate_card(&req).is_err());
        req.card_number = "4242-4242-4242-42".to_string();
        assert!(validate_card(&req).is_err());
    }

    #[test]
    fn rejects_bad_expiry_months() {
        let mut req = valid_card();
        req.expiry_date = "13/27".to_string();
        assert!(validate_card(&req).is_err());
        req.expiry_date = "9/27".to_string();
        assert!(validate_card(&req).is_err());
    }

    #[test]
    fn rejects_bad_cvc() {
        let mut req = valid_card();
        req.cvc = "12".to_string();
        assert!(validate_card(&req).is_err());
        req.cvc = "abc".to_string();
        assert!(validate_card(&req).is_err());
    }
}

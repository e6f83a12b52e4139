//! crates/learnhub_core/src/subscription.rs
//!
//! The subscription lifecycle: the sole stateful gate on premium access.
//! Payment itself is simulated upstream; this module owns the record
//! creation and the calendar date math.

use chrono::{DateTime, Months, Utc};
use uuid::Uuid;

use crate::domain::{Subscription, SubscriptionStatus};
use crate::ports::{ContentRepository, PortError, PortResult};

/// Same day-of-month next month, clamped to the last valid day when that
/// day does not exist (Jan 31 -> Feb 28/29, never Mar 3).
pub fn add_one_month(from: DateTime<Utc>) -> DateTime<Utc> {
    // None only at the far edge of the representable range.
    from.checked_add_months(Months::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Creates the subscription row for a completed (simulated) checkout.
///
/// Re-purchase while an active, unexpired subscription exists is rejected
/// rather than extended, so exactly one row stays authoritative. The write
/// is a single record; a failure leaves nothing visible to readers.
pub async fn purchase(
    repo: &dyn ContentRepository,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> PortResult<Subscription> {
    let existing = repo.subscriptions_for_user(user_id).await?;
    if existing.iter().any(|s| s.is_active_at(now)) {
        return Err(PortError::Validation(
            "an active subscription already exists for this account".to_string(),
        ));
    }

    let subscription = Subscription {
        id: Uuid::new_v4(),
        user_id,
        status: SubscriptionStatus::Active,
        start_date: now,
        end_date: add_one_month(now),
    };
    repo.create_subscription(subscription.clone()).await?;
    Ok(subscription)
}

/// The subscription the gating policy treats as authoritative: first active
/// one if any, else the first found.
pub fn authoritative<'a>(
    subscriptions: &'a [Subscription],
    now: DateTime<Utc>,
) -> Option<&'a Subscription> {
    subscriptions
        .iter()
        .find(|s| s.is_active_at(now))
        .or_else(|| subscriptions.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use chrono::{Duration, TimeZone};

    #[test]
    fn end_date_clamps_to_last_valid_day() {
        let jan31 = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let end = add_one_month(jan31);
        // 2024 is a leap year.
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());

        let jan31_common = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(
            add_one_month(jan31_common),
            Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn end_date_keeps_day_when_valid() {
        let mar15 = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        assert_eq!(add_one_month(mar15), Utc.with_ymd_and_hms(2024, 4, 15, 9, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn purchase_creates_one_active_month() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

        let sub = purchase(&store, user, now).await.unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.start_date, now);
        assert_eq!(sub.end_date, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());

        let stored = store.subscriptions_for_user(user).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn repurchase_while_active_is_rejected() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        let now = Utc::now();

        purchase(&store, user, now).await.unwrap();
        let err = purchase(&store, user, now).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));

        let stored = store.subscriptions_for_user(user).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn repurchase_after_expiry_is_allowed() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();
        let then = Utc::now() - Duration::days(90);

        purchase(&store, user, then).await.unwrap();
        purchase(&store, user, Utc::now()).await.unwrap();

        let stored = store.subscriptions_for_user(user).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn authoritative_prefers_the_active_row() {
        let now = Utc::now();
        let user = Uuid::new_v4();
        let stale = Subscription {
            id: Uuid::new_v4(),
            user_id: user,
            status: SubscriptionStatus::Active,
            start_date: now - Duration::days(60),
            end_date: now - Duration::days(30),
        };
        let live = Subscription {
            id: Uuid::new_v4(),
            user_id: user,
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: now + Duration::days(30),
        };

        let subs = vec![stale.clone(), live.clone()];
        assert_eq!(authoritative(&subs, now).unwrap().id, live.id);

        let only_stale = vec![stale.clone()];
        assert_eq!(authoritative(&only_stale, now).unwrap().id, stale.id);
        assert!(authoritative(&[], now).is_none());
    }
}

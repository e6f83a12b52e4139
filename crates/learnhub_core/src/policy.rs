//! crates/learnhub_core/src/policy.rs
//!
//! Pure access-policy functions. Nothing in this module performs I/O; every
//! decision is a function of the caller, the item, and the clock.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{InstructorDesignation, Subscription};

/// The content badge shown on cards. A pure projection of `is_free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessBadge {
    None,
    Pro,
}

pub fn badge(is_free: bool) -> AccessBadge {
    if is_free {
        AccessBadge::None
    } else {
        AccessBadge::Pro
    }
}

/// Whether a content item is viewable by the caller.
///
/// Free items are always viewable. Gated items require an active,
/// non-expired subscription; an expired subscription behaves identically
/// to none at all.
pub fn can_view(is_free: bool, subscription: Option<&Subscription>, now: DateTime<Utc>) -> bool {
    if is_free {
        return true;
    }
    subscription.is_some_and(|s| s.is_active_at(now))
}

/// Whether the caller holds the instructor designation.
///
/// The id-based and email-based predicates are aliases of the same
/// designation: either a matching uid, a matching designation email, or a
/// match against the legacy configured instructor email counts.
pub fn is_instructor(
    caller_id: Uuid,
    caller_email: Option<&str>,
    designation: Option<&InstructorDesignation>,
    legacy_instructor_email: Option<&str>,
) -> bool {
    if let Some(d) = designation {
        if d.uid == caller_id {
            return true;
        }
        if let (Some(caller), Some(designated)) = (caller_email, d.email.as_deref()) {
            if caller.eq_ignore_ascii_case(designated) {
                return true;
            }
        }
    }
    if let (Some(caller), Some(legacy)) = (caller_email, legacy_instructor_email) {
        if caller.eq_ignore_ascii_case(legacy) {
            return true;
        }
    }
    false
}

/// Management operations (create/update/delete content, start a session)
/// are permitted only to the instructor. Safe to call redundantly.
pub fn can_manage(
    caller_id: Uuid,
    caller_email: Option<&str>,
    designation: Option<&InstructorDesignation>,
    legacy_instructor_email: Option<&str>,
) -> bool {
    is_instructor(caller_id, caller_email, designation, legacy_instructor_email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubscriptionStatus;
    use chrono::Duration;

    fn subscription(status: SubscriptionStatus, end_in_days: i64, now: DateTime<Utc>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status,
            start_date: now - Duration::days(5),
            end_date: now + Duration::days(end_in_days),
        }
    }

    #[test]
    fn free_item_is_always_viewable() {
        let now = Utc::now();
        assert!(can_view(true, None, now));
        let expired = subscription(SubscriptionStatus::Active, -1, now);
        assert!(can_view(true, Some(&expired), now));
    }

    #[test]
    fn gated_item_requires_active_subscription() {
        let now = Utc::now();
        assert!(!can_view(false, None, now));
        let active = subscription(SubscriptionStatus::Active, 10, now);
        assert!(can_view(false, Some(&active), now));
    }

    #[test]
    fn expired_subscription_equals_no_subscription() {
        let now = Utc::now();
        let expired = subscription(SubscriptionStatus::Active, -1, now);
        assert_eq!(can_view(false, Some(&expired), now), can_view(false, None, now));
    }

    #[test]
    fn cancelled_subscription_grants_nothing() {
        let now = Utc::now();
        let cancelled = subscription(SubscriptionStatus::Cancelled, 10, now);
        assert!(!can_view(false, Some(&cancelled), now));
    }

    #[test]
    fn making_an_item_free_never_reduces_access() {
        let now = Utc::now();
        for sub in [
            None,
            Some(subscription(SubscriptionStatus::Active, 10, now)),
            Some(subscription(SubscriptionStatus::Active, -1, now)),
            Some(subscription(SubscriptionStatus::Inactive, 10, now)),
        ] {
            let gated = can_view(false, sub.as_ref(), now);
            let free = can_view(true, sub.as_ref(), now);
            assert!(free >= gated);
        }
    }

    #[test]
    fn badge_projects_is_free() {
        assert_eq!(badge(true), AccessBadge::None);
        assert_eq!(badge(false), AccessBadge::Pro);
    }

    #[test]
    fn management_gate_follows_the_designation() {
        let uid = Uuid::new_v4();
        let designation = InstructorDesignation {
            uid,
            email: None,
            claimed_at: Utc::now(),
        };
        assert!(can_manage(uid, None, Some(&designation), None));
        assert!(!can_manage(Uuid::new_v4(), None, Some(&designation), None));
        assert!(!can_manage(uid, None, None, None));
    }

    #[test]
    fn instructor_by_uid_or_email_alias() {
        let uid = Uuid::new_v4();
        let designation = InstructorDesignation {
            uid,
            email: Some("teach@example.com".to_string()),
            claimed_at: Utc::now(),
        };

        assert!(is_instructor(uid, None, Some(&designation), None));
        assert!(is_instructor(
            Uuid::new_v4(),
            Some("Teach@Example.com"),
            Some(&designation),
            None
        ));
        assert!(is_instructor(
            Uuid::new_v4(),
            Some("legacy@example.com"),
            None,
            Some("legacy@example.com")
        ));
        assert!(!is_instructor(Uuid::new_v4(), Some("student@example.com"), Some(&designation), None));
        assert!(!is_instructor(Uuid::new_v4(), None, None, None));
    }
}

//! crates/learnhub_core/src/compose.rs
//!
//! The view-model composer: joins repository reads, applies the access
//! policy, and produces the denormalized shapes the presentation layer
//! consumes. Composition is all-or-nothing; a failed fetch mid-join
//! propagates instead of yielding a partially populated view.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Course, Lecture, Subscription};
use crate::images;
use crate::policy::{self, AccessBadge};
use crate::ports::{ContentRepository, PortError, PortResult};
use crate::slug::slugify;

/// The presentation-ready projection of a course.
#[derive(Debug, Clone)]
pub struct CourseView {
    pub course: Course,
    /// Derived from the title at read time, never stored.
    pub slug: String,
    /// Placeholder value, not backed by real completion tracking.
    pub progress: u8,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
    /// Populated only when lectures were explicitly requested.
    pub lectures: Vec<Lecture>,
    pub accessible: bool,
    pub badge: AccessBadge,
}

// Stable stand-in until real completion tracking lands; keeps the 0-80
// range the UI expects.
fn placeholder_progress(course_id: Uuid) -> u8 {
    (course_id.as_u128() % 81) as u8
}

/// Projects one course into its presentation shape. Used by the list/detail
/// composers and directly after a create, where the written row is already
/// in hand and a slug re-lookup could land on a colliding older title.
pub fn course_view(
    course: Course,
    lectures: Vec<Lecture>,
    subscription: Option<&Subscription>,
    now: DateTime<Utc>,
) -> CourseView {
    let image = images::lookup(&course.image_id);
    CourseView {
        slug: slugify(&course.title),
        progress: placeholder_progress(course.id),
        image_url: image.map(|i| i.url.to_string()),
        image_hint: image.map(|i| i.hint.to_string()),
        accessible: policy::can_view(course.is_free, subscription, now),
        badge: policy::badge(course.is_free),
        lectures,
        course,
    }
}

/// Composes the course catalog. Lectures are not fetched for list views.
pub async fn compose_course_list(
    repo: &dyn ContentRepository,
    subscription: Option<&Subscription>,
    now: DateTime<Utc>,
) -> PortResult<Vec<CourseView>> {
    let courses = repo.list_courses().await?;
    Ok(courses
        .into_iter()
        .map(|c| course_view(c, Vec::new(), subscription, now))
        .collect())
}

/// Composes a single course by derived slug.
///
/// The lookup scans all courses and matches on the derived slug; when two
/// titles collide the first match in stored order wins. Returns `NotFound`
/// when no slug matches and propagates `Transient` if any fetch step fails.
pub async fn compose_course_detail(
    repo: &dyn ContentRepository,
    slug: &str,
    subscription: Option<&Subscription>,
    include_lectures: bool,
    now: DateTime<Utc>,
) -> PortResult<CourseView> {
    let courses = repo.list_courses().await?;
    for course in courses {
        if slugify(&course.title) == slug {
            let mut lectures = if include_lectures {
                repo.list_lectures(course.id).await?
            } else {
                Vec::new()
            };
            lectures.sort_by(|a, b| a.title.cmp(&b.title));
            return Ok(course_view(course, lectures, subscription, now));
        }
    }
    Err(PortError::NotFound(format!("no course with slug '{slug}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewCourse, NewLecture, SubscriptionStatus};
    use crate::memory::InMemoryStore;
    use chrono::Duration;

    fn new_course(title: &str, is_free: bool) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            description: "desc".to_string(),
            instructor_id: Uuid::new_v4(),
            author: "Dr. Evelyn Reed".to_string(),
            category_id: "web-dev".to_string(),
            price: if is_free { 0 } else { 4900 },
            is_free,
            image_id: "web-dev-intro".to_string(),
            materials_url: None,
        }
    }

    fn active_subscription(user_id: Uuid, now: DateTime<Utc>, end_in_days: i64) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id,
            status: SubscriptionStatus::Active,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(end_in_days),
        }
    }

    #[tokio::test]
    async fn list_derives_slug_image_and_access() {
        let store = InMemoryStore::new();
        store
            .create_course(new_course("Introduction to Web Development", true))
            .await
            .unwrap();
        store.create_course(new_course("Pro Rust", false)).await.unwrap();

        let now = Utc::now();
        let views = compose_course_list(&store, None, now).await.unwrap();
        assert_eq!(views.len(), 2);

        let free = views.iter().find(|v| v.course.is_free).unwrap();
        assert_eq!(free.slug, "introduction-to-web-development");
        assert!(free.accessible);
        assert_eq!(free.badge, AccessBadge::None);
        assert!(free.image_url.is_some());
        assert!(free.lectures.is_empty());

        let gated = views.iter().find(|v| !v.course.is_free).unwrap();
        assert!(!gated.accessible);
        assert_eq!(gated.badge, AccessBadge::Pro);
    }

    #[tokio::test]
    async fn active_subscription_unlocks_gated_course() {
        let store = InMemoryStore::new();
        store.create_course(new_course("Pro Rust", false)).await.unwrap();

        let now = Utc::now();
        let user = Uuid::new_v4();
        let sub = active_subscription(user, now, 10);
        let views = compose_course_list(&store, Some(&sub), now).await.unwrap();
        assert!(views[0].accessible);

        let expired = Subscription {
            end_date: now - Duration::days(1),
            ..sub
        };
        let views = compose_course_list(&store, Some(&expired), now).await.unwrap();
        assert!(!views[0].accessible);
    }

    #[tokio::test]
    async fn detail_sorts_lectures_by_title() {
        let store = InMemoryStore::new();
        let course = store
            .create_course(new_course("Intro to Web Dev!", true))
            .await
            .unwrap();
        for title in ["Styling with CSS", "The Basics of HTML", "Intro to JavaScript"] {
            store
                .create_lecture(NewLecture {
                    course_id: course.id,
                    title: title.to_string(),
                    description: String::new(),
                    video_url: "https://cdn.example.com/v.mp4".to_string(),
                    duration_minutes: 15,
                    is_free: true,
                })
                .await
                .unwrap();
        }

        let view = compose_course_detail(&store, "intro-to-web-dev", None, true, Utc::now())
            .await
            .unwrap();
        let titles: Vec<&str> = view.lectures.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Intro to JavaScript", "Styling with CSS", "The Basics of HTML"]
        );
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let store = InMemoryStore::new();
        let err = compose_course_detail(&store, "nonexistent", None, true, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn title_collisions_resolve_first_match_wins() {
        let store = InMemoryStore::new();
        let first = store.create_course(new_course("Same Title", true)).await.unwrap();
        store.create_course(new_course("Same! Title?", false)).await.unwrap();

        let view = compose_course_detail(&store, "same-title", None, false, Utc::now())
            .await
            .unwrap();
        assert_eq!(view.course.id, first.id);
    }

    #[tokio::test]
    async fn failed_lecture_fetch_propagates_not_partial() {
        let store = InMemoryStore::new();
        store.create_course(new_course("Intro to Web Dev!", true)).await.unwrap();
        store.poison_lectures();

        let err = compose_course_detail(&store, "intro-to-web-dev", None, true, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Transient(_)));
    }

    #[test]
    fn progress_placeholder_is_stable_and_bounded() {
        let id = Uuid::new_v4();
        assert_eq!(placeholder_progress(id), placeholder_progress(id));
        assert!(placeholder_progress(id) <= 80);
    }
}

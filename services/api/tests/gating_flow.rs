//! End-to-end gating flow against the in-memory repository: checkout turns a
//! locked course card into an accessible one, expiry turns it back.

use api_lib::web::rest::port_error_response;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use learnhub_core::compose::{compose_course_detail, compose_course_list};
use learnhub_core::domain::NewCourse;
use learnhub_core::memory::InMemoryStore;
use learnhub_core::ports::{ContentRepository, PortError};
use learnhub_core::subscription::{authoritative, purchase};
use uuid::Uuid;

fn gated_course(title: &str) -> NewCourse {
    NewCourse {
        title: title.to_string(),
        description: "Build real services".to_string(),
        instructor_id: Uuid::new_v4(),
        author: "Dr. Evelyn Reed".to_string(),
        category_id: "web-dev".to_string(),
        price: 4900,
        is_free: false,
        image_id: "web-dev-intro".to_string(),
        materials_url: None,
    }
}

#[tokio::test]
async fn checkout_unlocks_the_catalog_until_expiry() {
    let store = InMemoryStore::new();
    store.create_course(gated_course("Pro Backend Rust")).await.unwrap();

    let user = Uuid::new_v4();
    let now = Utc::now();

    // Before purchase the card is visible but locked.
    let views = compose_course_list(&store, None, now).await.unwrap();
    assert!(!views[0].accessible);

    purchase(&store, user, now).await.unwrap();
    let subs = store.subscriptions_for_user(user).await.unwrap();
    let sub = authoritative(&subs, now).unwrap();

    let views = compose_course_list(&store, Some(sub), now).await.unwrap();
    assert!(views[0].accessible);

    let detail = compose_course_detail(&store, "pro-backend-rust", Some(sub), true, now)
        .await
        .unwrap();
    assert!(detail.accessible);
    assert_eq!(detail.slug, "pro-backend-rust");

    // Two months out the same row no longer grants access.
    let later = now + Duration::days(62);
    let views = compose_course_list(&store, Some(sub), later).await.unwrap();
    assert!(!views[0].accessible);
}

#[test]
fn port_errors_map_to_distinct_statuses() {
    let (status, _) = port_error_response("courses", PortError::NotFound("x".into()));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = port_error_response("courses", PortError::Validation("x".into()));
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) =
        port_error_response("courses", PortError::denied("courses", "create", "payload"));
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A failed fetch surfaces as a gateway error, never an empty success.
    let (status, body) = port_error_response("courses", PortError::Transient("db down".into()));
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("courses"));
}

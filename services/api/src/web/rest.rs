//! services/api/src/web/rest.rs
//!
//! Shared REST plumbing: the PortError -> HTTP mapping, the view-model DTOs,
//! and the master OpenAPI definition.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use learnhub_core::compose::CourseView;
use learnhub_core::domain::{Lecture, LiveSession, LiveSessionStatus, RecordedClass, Subscription};
use learnhub_core::policy::AccessBadge;
use learnhub_core::ports::{PortError, PortResult};
use learnhub_core::subscription;
use serde::Serialize;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::state::AppState;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a port error to a distinct HTTP response. A failed fetch becomes a
/// visible 502, never an empty 200; not-found, validation, and permission
/// failures each keep their own status.
pub fn port_error_response(context: &str, err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        PortError::PermissionDenied { .. } => (StatusCode::FORBIDDEN, err.to_string()),
        PortError::Transient(msg) => {
            error!("Transient failure while {}: {}", context, msg);
            (StatusCode::BAD_GATEWAY, format!("Could not load {context}"))
        }
    }
}

/// Resolves the subscription the gating policy should consult for an
/// optionally signed-in caller.
pub async fn subscription_for(
    state: &AppState,
    user_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> PortResult<Option<Subscription>> {
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    let subs = state.repo.subscriptions_for_user(user_id).await?;
    Ok(subscription::authoritative(&subs, now).cloned())
}

//=========================================================================================
// View-Model DTOs
//=========================================================================================

fn badge_label(badge: AccessBadge) -> Option<String> {
    match badge {
        AccessBadge::None => None,
        AccessBadge::Pro => Some("PRO".to_string()),
    }
}

#[derive(Serialize, ToSchema)]
pub struct LectureDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration_minutes: i32,
    pub is_free: bool,
}

impl From<Lecture> for LectureDto {
    fn from(l: Lecture) -> Self {
        Self {
            id: l.id,
            title: l.title,
            description: l.description,
            video_url: l.video_url,
            duration_minutes: l.duration_minutes,
            is_free: l.is_free,
        }
    }
}

/// The denormalized course projection the catalog and detail pages consume.
#[derive(Serialize, ToSchema)]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub author: String,
    pub category_id: String,
    pub price: i64,
    pub is_free: bool,
    /// Placeholder completion value; not backed by real tracking.
    pub progress: u8,
    pub image_url: Option<String>,
    pub image_hint: Option<String>,
    pub materials_url: Option<String>,
    pub accessible: bool,
    pub badge: Option<String>,
    pub lectures: Vec<LectureDto>,
}

impl From<CourseView> for CourseDto {
    fn from(view: CourseView) -> Self {
        Self {
            id: view.course.id,
            title: view.course.title,
            slug: view.slug,
            description: view.course.description,
            author: view.course.author,
            category_id: view.course.category_id,
            price: view.course.price,
            is_free: view.course.is_free,
            progress: view.progress,
            image_url: view.image_url,
            image_hint: view.image_hint,
            materials_url: view.course.materials_url,
            accessible: view.accessible,
            badge: badge_label(view.badge),
            lectures: view.lectures.into_iter().map(LectureDto::from).collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ClassDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub instructor_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_free: bool,
    pub accessible: bool,
    pub badge: Option<String>,
}

impl ClassDto {
    pub fn project(class: RecordedClass, subscription: Option<&Subscription>, now: DateTime<Utc>) -> Self {
        let accessible = learnhub_core::policy::can_view(class.is_free, subscription, now);
        Self {
            id: class.id,
            title: class.title,
            description: class.description,
            video_url: class.video_url,
            instructor_id: class.instructor_id,
            created_at: class.created_at,
            is_free: class.is_free,
            accessible,
            badge: badge_label(learnhub_core::policy::badge(class.is_free)),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LiveSessionDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub is_free: bool,
    /// Omitted for callers without access to a gated session.
    pub meeting_url: Option<String>,
    pub status: String,
    pub accessible: bool,
    pub badge: Option<String>,
}

fn session_status_label(status: LiveSessionStatus) -> String {
    match status {
        LiveSessionStatus::Scheduled => "scheduled".to_string(),
        LiveSessionStatus::Live => "live".to_string(),
        LiveSessionStatus::Ended => "ended".to_string(),
    }
}

impl LiveSessionDto {
    pub fn project(
        session: LiveSession,
        subscription: Option<&Subscription>,
        now: DateTime<Utc>,
    ) -> Self {
        let accessible = learnhub_core::policy::can_view(session.is_free, subscription, now);
        Self {
            id: session.id,
            title: session.title,
            description: session.description,
            instructor_id: session.instructor_id,
            scheduled_time: session.scheduled_time,
            is_free: session.is_free,
            meeting_url: accessible.then_some(session.meeting_url),
            status: session_status_label(session.status),
            accessible,
            badge: badge_label(learnhub_core::policy::badge(session.is_free)),
        }
    }
}

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::signup_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::courses::list_courses_handler,
        crate::web::courses::get_course_handler,
        crate::web::courses::create_course_handler,
        crate::web::courses::update_course_handler,
        crate::web::courses::delete_course_handler,
        crate::web::courses::create_lecture_handler,
        crate::web::classes::list_classes_handler,
        crate::web::classes::get_class_handler,
        crate::web::classes::create_class_handler,
        crate::web::classes::update_class_handler,
        crate::web::sessions::list_sessions_handler,
        crate::web::sessions::start_session_handler,
        crate::web::sessions::end_session_handler,
        crate::web::billing::checkout_handler,
        crate::web::billing::list_subscriptions_handler,
        crate::web::chat::chat_handler,
        crate::web::admin::list_users_handler,
        crate::web::admin::claim_instructor_handler,
        crate::web::uploads::upload_handler,
    ),
    components(schemas(
        crate::web::auth::SignupRequest,
        crate::web::auth::LoginRequest,
        crate::web::auth::AuthResponse,
        CourseDto,
        LectureDto,
        ClassDto,
        LiveSessionDto,
        crate::web::courses::CreateCourseRequest,
        crate::web::courses::UpdateCourseRequest,
        crate::web::courses::CreateLectureRequest,
        crate::web::classes::CreateClassRequest,
        crate::web::classes::UpdateClassRequest,
        crate::web::sessions::StartSessionRequest,
        crate::web::sessions::StartSessionResponse,
        crate::web::billing::CheckoutRequest,
        crate::web::billing::SubscriptionDto,
        crate::web::chat::ChatRequest,
        crate::web::chat::ChatResponse,
        crate::web::admin::UserDto,
        crate::web::admin::ClaimResponse,
        crate::web::uploads::UploadResponse,
    )),
    tags(
        (name = "LearnHub API", description = "Course catalog, gated content, and instructor tooling.")
    )
)]
pub struct ApiDoc;

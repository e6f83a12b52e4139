//! services/api/src/web/courses.rs
//!
//! Course catalog and course management handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use learnhub_core::compose::{compose_course_detail, compose_course_list, course_view};
use learnhub_core::domain::{CourseUpdate, NewCourse, NewLecture};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::identity::ensure_instructor;
use crate::web::middleware::optional_user_id;
use crate::web::rest::{port_error_response, subscription_for, CourseDto};
use crate::web::state::AppState;

//=========================================================================================
// Payloads and Validation
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub price: i64,
    pub is_free: bool,
    pub image_id: String,
    pub materials_url: Option<String>,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub price: Option<i64>,
    pub is_free: Option<bool>,
    pub image_id: Option<String>,
    pub materials_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLectureRequest {
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub duration_minutes: i32,
    pub is_free: bool,
}

pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().len() < 3 {
        return Err("Title must be at least 3 characters".to_string());
    }
    Ok(())
}

pub fn validate_url(url: &str) -> Result<(), String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(format!("'{url}' is not a valid http(s) URL"));
    }
    Ok(())
}

fn validation_error(msg: String) -> (StatusCode, String) {
    (StatusCode::UNPROCESSABLE_ENTITY, msg)
}

//=========================================================================================
// Catalog Handlers (public; gating reflects the caller's subscription)
//=========================================================================================

/// List all courses as denormalized catalog cards.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Course catalog", body = [CourseDto]),
        (status = 502, description = "Could not load courses")
    )
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = Utc::now();
    let caller = optional_user_id(&state, &headers).await;
    let subscription = subscription_for(&state, caller, now)
        .await
        .map_err(|e| port_error_response("your subscription", e))?;

    let views = compose_course_list(state.repo.as_ref(), subscription.as_ref(), now)
        .await
        .map_err(|e| port_error_response("the course catalog", e))?;
    let courses: Vec<CourseDto> = views.into_iter().map(CourseDto::from).collect();
    Ok(Json(courses))
}

/// Fetch one course by its derived slug, lectures included.
#[utoipa::path(
    get,
    path = "/courses/{slug}",
    params(("slug" = String, Path, description = "URL slug derived from the course title")),
    responses(
        (status = 200, description = "Course detail", body = CourseDto),
        (status = 404, description = "No course with that slug"),
        (status = 502, description = "Could not load the course")
    )
)]
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let now = Utc::now();
    let caller = optional_user_id(&state, &headers).await;
    let subscription = subscription_for(&state, caller, now)
        .await
        .map_err(|e| port_error_response("your subscription", e))?;

    let view = compose_course_detail(state.repo.as_ref(), &slug, subscription.as_ref(), true, now)
        .await
        .map_err(|e| port_error_response("the course", e))?;
    Ok(Json(CourseDto::from(view)))
}

//=========================================================================================
// Management Handlers (instructor only)
//=========================================================================================

/// Create a course. Instructor only.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseDto),
        (status = 403, description = "Caller is not the instructor"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let caller = ensure_instructor(&state, user_id).await?;

    validate_title(&req.title).map_err(validation_error)?;
    if req.price < 0 {
        return Err(validation_error("Price must not be negative".to_string()));
    }
    if let Some(url) = &req.materials_url {
        validate_url(url).map_err(validation_error)?;
    }

    let course = state
        .repo
        .create_course(NewCourse {
            title: req.title.trim().to_string(),
            description: req.description,
            instructor_id: caller.id,
            author: caller.name,
            category_id: req.category_id,
            price: if req.is_free { 0 } else { req.price },
            is_free: req.is_free,
            image_id: req.image_id,
            materials_url: req.materials_url,
        })
        .await
        .map_err(|e| port_error_response("the new course", e))?;

    // Project the row just written; resolving by derived slug could land on
    // an older course with a colliding title.
    let view = course_view(course, Vec::new(), None, Utc::now());
    Ok((StatusCode::CREATED, Json(CourseDto::from(view))))
}

/// Update a course with an explicit partial payload. Instructor only.
#[utoipa::path(
    put,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated"),
        (status = 403, description = "Caller is not the instructor"),
        (status = 404, description = "No such course"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn update_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_instructor(&state, user_id).await?;

    if let Some(title) = &req.title {
        validate_title(title).map_err(validation_error)?;
    }
    if let Some(price) = req.price {
        if price < 0 {
            return Err(validation_error("Price must not be negative".to_string()));
        }
    }
    if let Some(url) = &req.materials_url {
        validate_url(url).map_err(validation_error)?;
    }

    state
        .repo
        .update_course(
            id,
            CourseUpdate {
                title: req.title.map(|t| t.trim().to_string()),
                description: req.description,
                category_id: req.category_id,
                price: req.price,
                is_free: req.is_free,
                image_id: req.image_id,
                materials_url: req.materials_url,
            },
        )
        .await
        .map_err(|e| port_error_response("the course", e))?;
    Ok(StatusCode::OK)
}

/// Delete a course and its lectures. Instructor only.
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 403, description = "Caller is not the instructor"),
        (status = 404, description = "No such course")
    )
)]
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_instructor(&state, user_id).await?;
    state
        .repo
        .delete_course(id)
        .await
        .map_err(|e| port_error_response("the course", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a lecture to a course. Instructor only.
#[utoipa::path(
    post,
    path = "/courses/{id}/lectures",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = CreateLectureRequest,
    responses(
        (status = 201, description = "Lecture created"),
        (status = 403, description = "Caller is not the instructor"),
        (status = 404, description = "No such course"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create_lecture_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateLectureRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    ensure_instructor(&state, user_id).await?;

    validate_title(&req.title).map_err(validation_error)?;
    validate_url(&req.video_url).map_err(validation_error)?;
    if req.duration_minutes < 0 {
        return Err(validation_error("Duration must not be negative".to_string()));
    }

    // Confirm the parent exists so a bad id reads as 404, not a write error.
    state
        .repo
        .get_course(id)
        .await
        .map_err(|e| port_error_response("the course", e))?;

    state
        .repo
        .create_lecture(NewLecture {
            course_id: id,
            title: req.title.trim().to_string(),
            description: req.description.unwrap_or_default(),
            video_url: req.video_url,
            duration_minutes: req.duration_minutes,
            is_free: req.is_free,
        })
        .await
        .map_err(|e| port_error_response("the new lecture", e))?;
    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use learnhub_core::memory::InMemoryStore;
    use learnhub_core::ports::{ChatService, ContentRepository, MediaStorageService, PortResult};

    struct NoopChat;

    #[async_trait]
    impl ChatService for NoopChat {
        async fn tutor_reply(&self, _name: Option<&str>, _message: &str) -> PortResult<String> {
            Ok(String::new())
        }
    }

    struct NoopMedia;

    #[async_trait]
    impl MediaStorageService for NoopMedia {
        async fn store(
            &self,
            _path: &str,
            _file_name: &str,
            _content_type: &str,
            _bytes: Vec<u8>,
        ) -> PortResult<String> {
            Ok("https://media.example.com/x".to_string())
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            database_url: String::new(),
            log_level: tracing::Level::INFO,
            openai_api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            instructor_email: None,
            s3_bucket: "test-bucket".to_string(),
            s3_endpoint: None,
            s3_public_base_url: "https://test-bucket.s3.amazonaws.com".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
        }
    }

    /// In-memory app state with a signed-up user holding the designation.
    async fn instructor_state() -> (Arc<AppState>, Uuid) {
        let repo = Arc::new(InMemoryStore::new());
        let user = repo
            .create_user_with_email("Dr. Evelyn Reed", "evelyn@example.com", "hash")
            .await
            .unwrap();
        repo.claim_instructor(user.id, user.email.as_deref())
            .await
            .unwrap();
        let state = Arc::new(AppState {
            repo,
            config: Arc::new(test_config()),
            chat: Arc::new(NoopChat),
            media: Arc::new(NoopMedia),
        });
        (state, user.id)
    }

    #[tokio::test]
    async fn created_course_is_returned_even_when_titles_collide() {
        let (state, instructor) = instructor_state().await;
        let older = state
            .repo
            .create_course(NewCourse {
                title: "Same Title".to_string(),
                description: "older".to_string(),
                instructor_id: instructor,
                author: "Dr. Evelyn Reed".to_string(),
                category_id: "web-dev".to_string(),
                price: 0,
                is_free: true,
                image_id: "web-dev-intro".to_string(),
                materials_url: None,
            })
            .await
            .unwrap();

        // "Same! Title?" derives the same slug as "Same Title".
        let resp = create_course_handler(
            State(state.clone()),
            Extension(instructor),
            Json(CreateCourseRequest {
                title: "Same! Title?".to_string(),
                description: "newer".to_string(),
                category_id: "web-dev".to_string(),
                price: 0,
                is_free: true,
                image_id: "web-dev-intro".to_string(),
                materials_url: None,
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let newer = state
            .repo
            .list_courses()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.id != older.id)
            .unwrap();

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(&newer.id.to_string()));
        assert!(!body.contains(&older.id.to_string()));
    }

    #[tokio::test]
    async fn non_instructor_cannot_create_courses() {
        let (state, _) = instructor_state().await;
        let student = state
            .repo
            .create_user_with_email("Sam Student", "sam@example.com", "hash")
            .await
            .unwrap();

        let err = create_course_handler(
            State(state),
            Extension(student.id),
            Json(CreateCourseRequest {
                title: "Unauthorized Course".to_string(),
                description: String::new(),
                category_id: "web-dev".to_string(),
                price: 0,
                is_free: true,
                image_id: "web-dev-intro".to_string(),
                materials_url: None,
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn title_validation_trims() {
        assert!(validate_title("Rust").is_ok());
        assert!(validate_title("  ab  ").is_err());
        assert!(validate_title("").is_err());
    }

    #[test]
    fn url_validation_requires_http_scheme() {
        assert!(validate_url("https://cdn.example.com/a.pdf").is_ok());
        assert!(validate_url("ftp://example.com/a.pdf").is_err());
        assert!(validate_url("notaurl").is_err());
    }
}

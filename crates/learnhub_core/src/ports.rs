//! crates/learnhub_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AuthSession, ClaimOutcome, Course, CourseUpdate, InstructorDesignation, Lecture, LiveSession,
    NewCourse, NewLecture, NewLiveSession, NewRecordedClass, RecordedClass, RecordedClassUpdate,
    Subscription, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The variants are deliberately distinguishable at the presentation boundary:
/// a denied write, a rejected payload, a missing record, and a failed fetch
/// each map to a different user-visible outcome and must never collapse into
/// one another.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Permission denied for {operation} on {path}: {detail}")]
    PermissionDenied {
        path: String,
        operation: String,
        /// Summary of the attempted payload, for diagnostics.
        detail: String,
    },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Transient store failure: {0}")]
    Transient(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Normalized storage access for the platform's content and account records.
///
/// Implementations must make write failures caller-visible as a structured
/// `PortError` and must never leave a partial write observable to readers.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    // --- User Management ---
    async fn get_user(&self, id: Uuid) -> PortResult<User>;
    async fn list_users(&self) -> PortResult<Vec<User>>;

    // --- Auth Methods ---
    async fn create_user_with_email(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;
    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials>;
    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()>;
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;
    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Instructor Designation ---
    /// Conditional create against the single designation record. Must be
    /// atomic (create-if-absent), never read-then-write.
    async fn claim_instructor(&self, uid: Uuid, email: Option<&str>) -> PortResult<ClaimOutcome>;
    async fn instructor_designation(&self) -> PortResult<Option<InstructorDesignation>>;

    // --- Courses and Lectures ---
    async fn list_courses(&self) -> PortResult<Vec<Course>>;
    async fn get_course(&self, id: Uuid) -> PortResult<Course>;
    async fn create_course(&self, course: NewCourse) -> PortResult<Course>;
    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> PortResult<Course>;
    async fn delete_course(&self, id: Uuid) -> PortResult<()>;
    async fn list_lectures(&self, course_id: Uuid) -> PortResult<Vec<Lecture>>;
    async fn create_lecture(&self, lecture: NewLecture) -> PortResult<Lecture>;

    // --- Recorded Classes ---
    async fn list_classes(&self) -> PortResult<Vec<RecordedClass>>;
    async fn get_class_by_id(&self, id: Uuid) -> PortResult<RecordedClass>;
    async fn create_class(&self, class: NewRecordedClass) -> PortResult<RecordedClass>;
    async fn update_class(&self, id: Uuid, update: RecordedClassUpdate)
        -> PortResult<RecordedClass>;

    // --- Live Sessions ---
    /// Lists sessions that have not ended.
    async fn list_live_sessions(&self) -> PortResult<Vec<LiveSession>>;
    async fn start_live_session(&self, session: NewLiveSession) -> PortResult<Uuid>;
    async fn end_live_session(&self, id: Uuid) -> PortResult<()>;

    // --- Subscriptions ---
    async fn subscriptions_for_user(&self, user_id: Uuid) -> PortResult<Vec<Subscription>>;
    async fn create_subscription(&self, subscription: Subscription) -> PortResult<()>;
}

/// Opaque AI text-completion boundary for the tutor chat. The core only
/// forwards the caller's identity and message and relays the text back.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn tutor_reply(&self, display_name: Option<&str>, message: &str) -> PortResult<String>;
}

/// Blob storage boundary. Accepts file bytes and returns the public URL;
/// only the URL string is ever persisted.
#[async_trait]
pub trait MediaStorageService: Send + Sync {
    async fn store(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> PortResult<String>;
}

impl PortError {
    /// Builds the structured error for a rejected write.
    pub fn denied(path: impl Into<String>, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        PortError::PermissionDenied {
            path: path.into(),
            operation: operation.into(),
            detail: detail.into(),
        }
    }
}

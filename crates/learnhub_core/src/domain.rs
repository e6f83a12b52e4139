//! crates/learnhub_core/src/domain.rs
//!
//! Defines the pure, core data structures for the platform.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered learner (or the instructor). Created on first sign-up,
/// never hard-deleted.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The single privileged account for a deployment. At most one row exists;
/// once claimed it is immutable.
#[derive(Debug, Clone)]
pub struct InstructorDesignation {
    pub uid: Uuid,
    pub email: Option<String>,
    pub claimed_at: DateTime<Utc>,
}

/// Outcome of an instructor claim attempt. Exactly one caller can ever win.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    Won(InstructorDesignation),
    /// The designation was already held; carries the standing record.
    Lost(InstructorDesignation),
}

#[derive(Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor_id: Uuid,
    /// Denormalized instructor display name.
    pub author: String,
    pub category_id: String,
    /// Price in cents. Ignored when `is_free` is set.
    pub price: i64,
    pub is_free: bool,
    pub image_id: String,
    pub materials_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Lecture {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration_minutes: i32,
    pub is_free: bool,
}

/// A recorded class. Top-level content, not nested under a course.
#[derive(Debug, Clone)]
pub struct RecordedClass {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub instructor_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_free: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveSessionStatus {
    Scheduled,
    Live,
    Ended,
}

#[derive(Debug, Clone)]
pub struct LiveSession {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub is_free: bool,
    pub meeting_url: String,
    pub status: LiveSessionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Subscription {
    /// Expiry is never written back; a stored `Active` row past its end date
    /// counts as inactive at read time.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && now <= self.end_date
    }
}

//=========================================================================================
// Creation and Update Payloads
//=========================================================================================
// Updates are explicit typed structs, validated before merge. Absent fields
// leave the stored value untouched; no duck-typed partial maps.

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub instructor_id: Uuid,
    pub author: String,
    pub category_id: String,
    pub price: i64,
    pub is_free: bool,
    pub image_id: String,
    pub materials_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub price: Option<i64>,
    pub is_free: Option<bool>,
    pub image_id: Option<String>,
    pub materials_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewLecture {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration_minutes: i32,
    pub is_free: bool,
}

#[derive(Debug, Clone)]
pub struct NewRecordedClass {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub instructor_id: Uuid,
    pub is_free: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedClassUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub is_free: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewLiveSession {
    pub title: String,
    pub description: String,
    pub instructor_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub is_free: bool,
    pub meeting_url: String,
}

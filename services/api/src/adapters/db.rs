//! services/api/src/adapters/db.rs
//!
//! The PostgreSQL adapter: the concrete implementation of the
//! `ContentRepository` port from the `core` crate, built on `sqlx`.
//!
//! Status enums are stored as text. Errors are mapped so callers can always
//! distinguish "permission denied" from "validation" from "transient".

use async_trait::async_trait;
use chrono::Utc;
use learnhub_core::domain::{
    AuthSession, ClaimOutcome, Course, CourseUpdate, InstructorDesignation, Lecture, LiveSession,
    LiveSessionStatus, NewCourse, NewLecture, NewLiveSession, NewRecordedClass, RecordedClass,
    RecordedClassUpdate, Subscription, SubscriptionStatus, User, UserCredentials,
};
use learnhub_core::ports::{ContentRepository, PortError, PortResult};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ContentRepository` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn map_read_err(what: &str, e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what.to_string()),
        other => PortError::Transient(other.to_string()),
    }
}

fn map_write_err(path: &str, operation: &str, detail: &str, e: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(db) = &e {
        let code = db.code().map(|c| c.to_string()).unwrap_or_default();
        return match code.as_str() {
            // unique_violation, check_violation, not_null_violation, fk_violation
            "23505" | "23514" | "23502" | "23503" => PortError::Validation(db.message().to_string()),
            // insufficient_privilege
            "42501" => PortError::denied(path, operation, detail),
            _ => PortError::Transient(e.to_string()),
        };
    }
    PortError::Transient(e.to_string())
}

//=========================================================================================
// Row -> Domain Mapping
//=========================================================================================

fn subscription_status_from_str(s: &str) -> SubscriptionStatus {
    match s {
        "active" => SubscriptionStatus::Active,
        "cancelled" => SubscriptionStatus::Cancelled,
        _ => SubscriptionStatus::Inactive,
    }
}

fn subscription_status_to_str(s: SubscriptionStatus) -> &'static str {
    match s {
        SubscriptionStatus::Active => "active",
        SubscriptionStatus::Inactive => "inactive",
        SubscriptionStatus::Cancelled => "cancelled",
    }
}

fn session_status_from_str(s: &str) -> LiveSessionStatus {
    match s {
        "live" => LiveSessionStatus::Live,
        "ended" => LiveSessionStatus::Ended,
        _ => LiveSessionStatus::Scheduled,
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }
}

fn course_from_row(row: &PgRow) -> Course {
    Course {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        instructor_id: row.get("instructor_id"),
        author: row.get("author"),
        category_id: row.get("category_id"),
        price: row.get("price"),
        is_free: row.get("is_free"),
        image_id: row.get("image_id"),
        materials_url: row.get("materials_url"),
    }
}

fn lecture_from_row(row: &PgRow) -> Lecture {
    Lecture {
        id: row.get("id"),
        course_id: row.get("course_id"),
        title: row.get("title"),
        description: row.get("description"),
        video_url: row.get("video_url"),
        duration_minutes: row.get("duration_minutes"),
        is_free: row.get("is_free"),
    }
}

fn class_from_row(row: &PgRow) -> RecordedClass {
    RecordedClass {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        video_url: row.get("video_url"),
        instructor_id: row.get("instructor_id"),
        created_at: row.get("created_at"),
        is_free: row.get("is_free"),
    }
}

fn live_session_from_row(row: &PgRow) -> LiveSession {
    let status: String = row.get("status");
    LiveSession {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        instructor_id: row.get("instructor_id"),
        scheduled_time: row.get("scheduled_time"),
        is_free: row.get("is_free"),
        meeting_url: row.get("meeting_url"),
        status: session_status_from_str(&status),
    }
}

fn subscription_from_row(row: &PgRow) -> Subscription {
    let status: String = row.get("status");
    Subscription {
        id: row.get("id"),
        user_id: row.get("user_id"),
        status: subscription_status_from_str(&status),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
    }
}

const COURSE_COLUMNS: &str =
    "id, title, description, instructor_id, author, category_id, price, is_free, image_id, materials_url";

//=========================================================================================
// `ContentRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentRepository for PgStore {
    async fn get_user(&self, id: Uuid) -> PortResult<User> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_err(&format!("user {id}"), e))?;
        Ok(user_from_row(&row))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, name, email FROM users ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn create_user_with_email(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let id = Uuid::new_v4();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Transient(e.to_string()))?;

        sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(email)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_err("users", "create", email, e))?;
        sqlx::query("INSERT INTO credentials (user_id, email, hashed_password) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(email)
            .bind(hashed_password)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_err("credentials", "create", email, e))?;

        tx.commit()
            .await
            .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(User {
            id,
            name: name.to_string(),
            email: Some(email.to_string()),
        })
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let row = sqlx::query(
            "SELECT user_id, email, hashed_password FROM credentials WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_err(&format!("no account for {email}"), e))?;
        Ok(UserCredentials {
            user_id: row.get("user_id"),
            email: row.get("email"),
            hashed_password: row.get("hashed_password"),
        })
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err("auth_sessions", "create", "session", e))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let row = sqlx::query(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > $2",
        )
        .bind(session_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_err("auth session expired or missing", e))?;
        Ok(row.get("user_id"))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err("auth_sessions", "delete", session_id, e))?;
        Ok(())
    }

    async fn claim_instructor(&self, uid: Uuid, email: Option<&str>) -> PortResult<ClaimOutcome> {
        // Conditional create against the single-row table: the insert either
        // lands (first claim) or hits the fixed-key conflict and does
        // nothing. No read-then-write window.
        let claimed_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO instructor_designation (singleton, uid, email, claimed_at)
             VALUES (TRUE, $1, $2, $3)
             ON CONFLICT (singleton) DO NOTHING",
        )
        .bind(uid)
        .bind(email)
        .bind(claimed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err("instructor_designation", "create", &uid.to_string(), e))?;

        if result.rows_affected() == 1 {
            return Ok(ClaimOutcome::Won(InstructorDesignation {
                uid,
                email: email.map(str::to_string),
                claimed_at,
            }));
        }

        let standing = self
            .instructor_designation()
            .await?
            .ok_or_else(|| PortError::Transient("designation vanished after conflict".to_string()))?;
        Ok(ClaimOutcome::Lost(standing))
    }

    async fn instructor_designation(&self) -> PortResult<Option<InstructorDesignation>> {
        let row = sqlx::query("SELECT uid, email, claimed_at FROM instructor_designation")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(row.map(|r| InstructorDesignation {
            uid: r.get("uid"),
            email: r.get("email"),
            claimed_at: r.get("claimed_at"),
        }))
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let rows = sqlx::query(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(rows.iter().map(course_from_row).collect())
    }

    async fn get_course(&self, id: Uuid) -> PortResult<Course> {
        let row = sqlx::query(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_read_err(&format!("course {id}"), e))?;
        Ok(course_from_row(&row))
    }

    async fn create_course(&self, course: NewCourse) -> PortResult<Course> {
        let row = sqlx::query(&format!(
            "INSERT INTO courses (id, title, description, instructor_id, author, category_id, price, is_free, image_id, materials_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.instructor_id)
        .bind(&course.author)
        .bind(&course.category_id)
        .bind(course.price)
        .bind(course.is_free)
        .bind(&course.image_id)
        .bind(&course.materials_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err("courses", "create", &course.title, e))?;
        Ok(course_from_row(&row))
    }

    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> PortResult<Course> {
        let row = sqlx::query(&format!(
            "UPDATE courses SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 category_id = COALESCE($4, category_id),
                 price = COALESCE($5, price),
                 is_free = COALESCE($6, is_free),
                 image_id = COALESCE($7, image_id),
                 materials_url = COALESCE($8, materials_url)
             WHERE id = $1
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.category_id)
        .bind(update.price)
        .bind(update.is_free)
        .bind(&update.image_id)
        .bind(&update.materials_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("course {id}")),
            other => map_write_err("courses", "update", &id.to_string(), other),
        })?;
        Ok(course_from_row(&row))
    }

    async fn delete_course(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err("courses", "delete", &id.to_string(), e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("course {id}")));
        }
        Ok(())
    }

    async fn list_lectures(&self, course_id: Uuid) -> PortResult<Vec<Lecture>> {
        let rows = sqlx::query(
            "SELECT id, course_id, title, description, video_url, duration_minutes, is_free
             FROM lectures WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(rows.iter().map(lecture_from_row).collect())
    }

    async fn create_lecture(&self, lecture: NewLecture) -> PortResult<Lecture> {
        let row = sqlx::query(
            "INSERT INTO lectures (id, course_id, title, description, video_url, duration_minutes, is_free)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, course_id, title, description, video_url, duration_minutes, is_free",
        )
        .bind(Uuid::new_v4())
        .bind(lecture.course_id)
        .bind(&lecture.title)
        .bind(&lecture.description)
        .bind(&lecture.video_url)
        .bind(lecture.duration_minutes)
        .bind(lecture.is_free)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err("lectures", "create", &lecture.title, e))?;
        Ok(lecture_from_row(&row))
    }

    async fn list_classes(&self) -> PortResult<Vec<RecordedClass>> {
        let rows = sqlx::query(
            "SELECT id, title, description, video_url, instructor_id, created_at, is_free
             FROM classes ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(rows.iter().map(class_from_row).collect())
    }

    async fn get_class_by_id(&self, id: Uuid) -> PortResult<RecordedClass> {
        let row = sqlx::query(
            "SELECT id, title, description, video_url, instructor_id, created_at, is_free
             FROM classes WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_read_err(&format!("class {id}"), e))?;
        Ok(class_from_row(&row))
    }

    async fn create_class(&self, class: NewRecordedClass) -> PortResult<RecordedClass> {
        let row = sqlx::query(
            "INSERT INTO classes (id, title, description, video_url, instructor_id, created_at, is_free)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, title, description, video_url, instructor_id, created_at, is_free",
        )
        .bind(Uuid::new_v4())
        .bind(&class.title)
        .bind(&class.description)
        .bind(&class.video_url)
        .bind(class.instructor_id)
        .bind(Utc::now())
        .bind(class.is_free)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err("classes", "create", &class.title, e))?;
        Ok(class_from_row(&row))
    }

    async fn update_class(
        &self,
        id: Uuid,
        update: RecordedClassUpdate,
    ) -> PortResult<RecordedClass> {
        let row = sqlx::query(
            "UPDATE classes SET
                 title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 video_url = COALESCE($4, video_url),
                 is_free = COALESCE($5, is_free)
             WHERE id = $1
             RETURNING id, title, description, video_url, instructor_id, created_at, is_free",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.video_url)
        .bind(update.is_free)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("class {id}")),
            other => map_write_err("classes", "update", &id.to_string(), other),
        })?;
        Ok(class_from_row(&row))
    }

    async fn list_live_sessions(&self) -> PortResult<Vec<LiveSession>> {
        let rows = sqlx::query(
            "SELECT id, title, description, instructor_id, scheduled_time, is_free, meeting_url, status
             FROM live_sessions WHERE status <> 'ended' ORDER BY scheduled_time ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(rows.iter().map(live_session_from_row).collect())
    }

    async fn start_live_session(&self, session: NewLiveSession) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO live_sessions (id, title, description, instructor_id, scheduled_time, is_free, meeting_url, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'live')",
        )
        .bind(id)
        .bind(&session.title)
        .bind(&session.description)
        .bind(session.instructor_id)
        .bind(session.scheduled_time)
        .bind(session.is_free)
        .bind(&session.meeting_url)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err("live_sessions", "create", &session.title, e))?;
        Ok(id)
    }

    async fn end_live_session(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("UPDATE live_sessions SET status = 'ended' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_err("live_sessions", "update", &id.to_string(), e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("live session {id}")));
        }
        Ok(())
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> PortResult<Vec<Subscription>> {
        let rows = sqlx::query(
            "SELECT id, user_id, status, start_date, end_date
             FROM subscriptions WHERE user_id = $1 ORDER BY start_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Transient(e.to_string()))?;
        Ok(rows.iter().map(subscription_from_row).collect())
    }

    async fn create_subscription(&self, subscription: Subscription) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO subscriptions (id, user_id, status, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription_status_to_str(subscription.status))
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_write_err(
                "subscriptions",
                "create",
                &subscription.user_id.to_string(),
                e,
            )
        })?;
        Ok(())
    }
}

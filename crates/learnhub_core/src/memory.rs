//! crates/learnhub_core/src/memory.rs
//!
//! An in-memory `ContentRepository` used by the core test suite and handy
//! for running the service without a database. All state lives behind one
//! mutex; no lock is held across an await point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    AuthSession, ClaimOutcome, Course, CourseUpdate, InstructorDesignation, Lecture, LiveSession,
    LiveSessionStatus, NewCourse, NewLecture, NewLiveSession, NewRecordedClass, RecordedClass,
    RecordedClassUpdate, Subscription, User, UserCredentials,
};
use crate::ports::{ContentRepository, PortError, PortResult};

#[derive(Default)]
struct State {
    users: Vec<User>,
    credentials: Vec<UserCredentials>,
    auth_sessions: Vec<AuthSession>,
    designation: Option<InstructorDesignation>,
    courses: Vec<Course>,
    lectures: Vec<Lecture>,
    classes: Vec<RecordedClass>,
    live_sessions: Vec<LiveSession>,
    subscriptions: Vec<Subscription>,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    lectures_poisoned: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent lecture fetches fail, for composition-atomicity
    /// tests.
    pub fn poison_lectures(&self) {
        self.lectures_poisoned.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned mutex only happens after a panic in a test.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ContentRepository for InMemoryStore {
    async fn get_user(&self, id: Uuid) -> PortResult<User> {
        self.lock()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("user {id}")))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.lock().users.clone())
    }

    async fn create_user_with_email(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut state = self.lock();
        if state
            .credentials
            .iter()
            .any(|c| c.email.eq_ignore_ascii_case(email))
        {
            return Err(PortError::Validation(format!(
                "an account already exists for {email}"
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: Some(email.to_string()),
        };
        state.credentials.push(UserCredentials {
            user_id: user.id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        });
        state.users.push(user.clone());
        Ok(user)
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.lock()
            .credentials
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("no account for {email}")))
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        self.lock().auth_sessions.push(session);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let now = Utc::now();
        self.lock()
            .auth_sessions
            .iter()
            .find(|s| s.id == session_id && s.expires_at > now)
            .map(|s| s.user_id)
            .ok_or_else(|| PortError::NotFound("auth session expired or missing".to_string()))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.lock().auth_sessions.retain(|s| s.id != session_id);
        Ok(())
    }

    async fn claim_instructor(&self, uid: Uuid, email: Option<&str>) -> PortResult<ClaimOutcome> {
        // Create-if-absent under a single lock: the first claim wins, every
        // later claim observes the standing record.
        let mut state = self.lock();
        match &state.designation {
            Some(existing) => Ok(ClaimOutcome::Lost(existing.clone())),
            None => {
                let designation = InstructorDesignation {
                    uid,
                    email: email.map(str::to_string),
                    claimed_at: Utc::now(),
                };
                state.designation = Some(designation.clone());
                Ok(ClaimOutcome::Won(designation))
            }
        }
    }

    async fn instructor_designation(&self) -> PortResult<Option<InstructorDesignation>> {
        Ok(self.lock().designation.clone())
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        Ok(self.lock().courses.clone())
    }

    async fn get_course(&self, id: Uuid) -> PortResult<Course> {
        self.lock()
            .courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("course {id}")))
    }

    async fn create_course(&self, course: NewCourse) -> PortResult<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            title: course.title,
            description: course.description,
            instructor_id: course.instructor_id,
            author: course.author,
            category_id: course.category_id,
            price: course.price,
            is_free: course.is_free,
            image_id: course.image_id,
            materials_url: course.materials_url,
        };
        self.lock().courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> PortResult<Course> {
        let mut state = self.lock();
        let course = state
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound(format!("course {id}")))?;
        if let Some(title) = update.title {
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(category_id) = update.category_id {
            course.category_id = category_id;
        }
        if let Some(price) = update.price {
            course.price = price;
        }
        if let Some(is_free) = update.is_free {
            course.is_free = is_free;
        }
        if let Some(image_id) = update.image_id {
            course.image_id = image_id;
        }
        if let Some(materials_url) = update.materials_url {
            course.materials_url = Some(materials_url);
        }
        Ok(course.clone())
    }

    async fn delete_course(&self, id: Uuid) -> PortResult<()> {
        let mut state = self.lock();
        let before = state.courses.len();
        state.courses.retain(|c| c.id != id);
        if state.courses.len() == before {
            return Err(PortError::NotFound(format!("course {id}")));
        }
        state.lectures.retain(|l| l.course_id != id);
        Ok(())
    }

    async fn list_lectures(&self, course_id: Uuid) -> PortResult<Vec<Lecture>> {
        if self.lectures_poisoned.load(Ordering::SeqCst) {
            return Err(PortError::Transient("lecture fetch failed".to_string()));
        }
        Ok(self
            .lock()
            .lectures
            .iter()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_lecture(&self, lecture: NewLecture) -> PortResult<Lecture> {
        let lecture = Lecture {
            id: Uuid::new_v4(),
            course_id: lecture.course_id,
            title: lecture.title,
            description: lecture.description,
            video_url: lecture.video_url,
            duration_minutes: lecture.duration_minutes,
            is_free: lecture.is_free,
        };
        self.lock().lectures.push(lecture.clone());
        Ok(lecture)
    }

    async fn list_classes(&self) -> PortResult<Vec<RecordedClass>> {
        Ok(self.lock().classes.clone())
    }

    async fn get_class_by_id(&self, id: Uuid) -> PortResult<RecordedClass> {
        self.lock()
            .classes
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("class {id}")))
    }

    async fn create_class(&self, class: NewRecordedClass) -> PortResult<RecordedClass> {
        let class = RecordedClass {
            id: Uuid::new_v4(),
            title: class.title,
            description: class.description,
            video_url: class.video_url,
            instructor_id: class.instructor_id,
            created_at: Utc::now(),
            is_free: class.is_free,
        };
        self.lock().classes.push(class.clone());
        Ok(class)
    }

    async fn update_class(
        &self,
        id: Uuid,
        update: RecordedClassUpdate,
    ) -> PortResult<RecordedClass> {
        let mut state = self.lock();
        let class = state
            .classes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound(format!("class {id}")))?;
        if let Some(title) = update.title {
            class.title = title;
        }
        if let Some(description) = update.description {
            class.description = description;
        }
        if let Some(video_url) = update.video_url {
            class.video_url = video_url;
        }
        if let Some(is_free) = update.is_free {
            class.is_free = is_free;
        }
        Ok(class.clone())
    }

    async fn list_live_sessions(&self) -> PortResult<Vec<LiveSession>> {
        Ok(self
            .lock()
            .live_sessions
            .iter()
            .filter(|s| s.status != LiveSessionStatus::Ended)
            .cloned()
            .collect())
    }

    async fn start_live_session(&self, session: NewLiveSession) -> PortResult<Uuid> {
        let session = LiveSession {
            id: Uuid::new_v4(),
            title: session.title,
            description: session.description,
            instructor_id: session.instructor_id,
            scheduled_time: session.scheduled_time,
            is_free: session.is_free,
            meeting_url: session.meeting_url,
            status: LiveSessionStatus::Live,
        };
        let id = session.id;
        self.lock().live_sessions.push(session);
        Ok(id)
    }

    async fn end_live_session(&self, id: Uuid) -> PortResult<()> {
        let mut state = self.lock();
        let session = state
            .live_sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| PortError::NotFound(format!("live session {id}")))?;
        session.status = LiveSessionStatus::Ended;
        Ok(())
    }

    async fn subscriptions_for_user(&self, user_id: Uuid) -> PortResult<Vec<Subscription>> {
        Ok(self
            .lock()
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_subscription(&self, subscription: Subscription) -> PortResult<()> {
        self.lock().subscriptions.push(subscription);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn concurrent_claims_elect_exactly_one_instructor() {
        let store = Arc::new(InMemoryStore::new());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let store_a = store.clone();
        let store_b = store.clone();
        let claim_a = tokio::spawn(async move { store_a.claim_instructor(a, None).await });
        let claim_b = tokio::spawn(async move { store_b.claim_instructor(b, None).await });

        let outcomes = [
            claim_a.await.unwrap().unwrap(),
            claim_b.await.unwrap().unwrap(),
        ];
        let wins = outcomes
            .iter()
            .filter(|o| matches!(o, ClaimOutcome::Won(_)))
            .count();
        assert_eq!(wins, 1);

        let designation = store.instructor_designation().await.unwrap().unwrap();
        assert!(designation.uid == a || designation.uid == b);

        // A later claim never overwrites the winner.
        let late = store.claim_instructor(Uuid::new_v4(), None).await.unwrap();
        assert!(matches!(late, ClaimOutcome::Lost(d) if d.uid == designation.uid));
    }

    #[tokio::test]
    async fn duplicate_signup_email_is_rejected() {
        let store = InMemoryStore::new();
        store
            .create_user_with_email("Ada", "ada@example.com", "hash")
            .await
            .unwrap();
        let err = store
            .create_user_with_email("Ada Again", "ADA@example.com", "hash2")
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }

    #[tokio::test]
    async fn ended_sessions_drop_out_of_listings() {
        let store = InMemoryStore::new();
        let id = store
            .start_live_session(NewLiveSession {
                title: "Live Q&A".to_string(),
                description: String::new(),
                instructor_id: Uuid::new_v4(),
                scheduled_time: Utc::now(),
                is_free: true,
                meeting_url: "https://meet.example.com/q-a".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(store.list_live_sessions().await.unwrap().len(), 1);

        store.end_live_session(id).await.unwrap();
        assert!(store.list_live_sessions().await.unwrap().is_empty());
    }
}

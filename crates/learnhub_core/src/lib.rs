pub mod compose;
pub mod domain;
pub mod images;
pub mod memory;
pub mod policy;
pub mod ports;
pub mod slug;
pub mod subscription;

pub use compose::{compose_course_detail, compose_course_list, course_view, CourseView};
pub use domain::{
    ClaimOutcome, Course, InstructorDesignation, Lecture, LiveSession, LiveSessionStatus,
    RecordedClass, Subscription, SubscriptionStatus, User,
};
pub use policy::{badge, can_manage, can_view, is_instructor, AccessBadge};
pub use ports::{ChatService, ContentRepository, MediaStorageService, PortError, PortResult};
pub use slug::slugify;

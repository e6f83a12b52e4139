pub mod admin;
pub mod auth;
pub mod billing;
pub mod chat;
pub mod classes;
pub mod courses;
pub mod identity;
pub mod middleware;
pub mod rest;
pub mod sessions;
pub mod state;
pub mod uploads;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;

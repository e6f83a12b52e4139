//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use learnhub_core::ports::{ChatService, ContentRepository, MediaStorageService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. The repository handle is explicit; nothing in the core reaches
/// for a hidden global client.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ContentRepository>,
    pub config: Arc<Config>,
    pub chat: Arc<dyn ChatService>,
    pub media: Arc<dyn MediaStorageService>,
}

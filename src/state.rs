// src/state.rs
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::broadcast::Broadcaster;
use crate::services::upstream::UpstreamClient;
use crate::services::users::UserStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub upstream: UpstreamClient,
    pub broadcaster: Broadcaster,
    pub users: UserStore,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(upstream: UpstreamClient, users: UserStore, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            upstream,
            broadcaster: Broadcaster::new(),
            users,
            static_dir: static_dir.into(),
        }
    }
}

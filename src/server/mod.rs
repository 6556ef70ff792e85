//! JSON-RPC request layer.
//!
//! This module provides:
//! - a JSON-RPC 2.0 server over stdio
//! - method routing onto the services
//! - shared application state

mod handlers;
mod rpc;

pub use handlers::*;
pub use rpc::*;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::service::{AcceptanceTestService, MergeRequestService, StoryService};
use crate::storage::{DataStore, StateSnapshot};

/// Application state shared across handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The in-memory store.
    pub store: Arc<DataStore>,
    /// Story operations.
    pub stories: StoryService,
    /// Acceptance test operations.
    pub tests: AcceptanceTestService,
    /// Merge request operations.
    pub merge_requests: MergeRequestService,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, store: Arc<DataStore>) -> Self {
        info!(
            depth_limit = config.hierarchy.depth_limit,
            default_policy = %config.validation.default_policy,
            seed = %config.seed.path.display(),
            "AppState initializing"
        );

        let stories = StoryService::new(store.clone(), &config);
        let tests = AcceptanceTestService::new(store.clone());
        let merge_requests = MergeRequestService::new(store.clone());

        Self {
            config,
            store,
            stories,
            tests,
            merge_requests,
        }
    }

    /// Replace the store contents with the configured seed file.
    pub fn reset(&self) -> AppResult<StateSnapshot> {
        self.store.reset_from_seed(&self.config.seed.path)
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

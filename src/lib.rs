//! # pm-mindmap
//!
//! Story hierarchy planner for merge requests. Stories form ordered
//! trees under a merge request, carry acceptance tests, and are checked
//! by a validation engine that either warns about or blocks malformed
//! requirements.
//!
//! ## Features
//!
//! - **Story tree**: ordered children, move/reorder with contiguous
//!   sibling positions, cycle detection, depth limit, rollup counts
//! - **Validation**: INVEST-style prefixes for stories, Given/When/Then
//!   for acceptance tests, ambiguous-term and missing-unit warnings
//! - **Policies**: `warn` reports, `block` refuses writes with errors
//!
//! ## Architecture
//!
//! ```text
//! JSON-RPC client → RpcServer (stdio) → services → DataStore (RwLock)
//!                                          ↓
//!                                      validation
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pm_mindmap::{AppState, Config, DataStore, RpcServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(DataStore::new());
//!     let state = Arc::new(AppState::new(config, store));
//!     RpcServer::new(state).run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// JSON-RPC server and request routing.
pub mod server;
/// Story, acceptance test and merge request operations.
pub mod service;
/// In-memory records and the story hierarchy.
pub mod storage;
/// Story and acceptance test validation.
pub mod validation;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, RpcServer, SharedState};
pub use storage::DataStore;

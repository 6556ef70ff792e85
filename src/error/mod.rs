use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationMessage;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or unreadable configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },

    /// Record or hierarchy failure from the store.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Write refused under the block policy.
    #[error("Validation blocked: {message}")]
    Validation {
        /// Which record was refused.
        message: String,
        /// The blocking findings.
        details: Vec<ValidationMessage>,
    },

    /// Policy name other than `warn` or `block`.
    #[error("Invalid validation policy: {value}")]
    InvalidPolicy {
        /// The rejected value.
        value: String,
    },

    /// Placement would put a story deeper than the limit.
    #[error("Depth limit exceeded: depth {depth} exceeds limit {limit}")]
    DepthLimit {
        /// Depth the deepest affected story would reach.
        depth: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Seed file could not be loaded.
    #[error("Seed error: {message}")]
    Seed {
        /// Read or parse failure.
        message: String,
    },

    /// Malformed or unroutable request.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Unexpected failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

/// Record and hierarchy errors raised by the in-memory store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record looked up.
        entity: Entity,
        /// Missing id.
        id: String,
    },

    /// A record with this id already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// Kind of record.
        entity: Entity,
        /// Duplicate id.
        id: String,
    },

    /// The proposed parent is the story or one of its descendants.
    #[error("Cycle detected: {story_id} cannot be placed under {parent_id}")]
    Cycle {
        /// Story being placed.
        story_id: String,
        /// Proposed parent.
        parent_id: String,
    },

    /// The proposed parent lives in another merge request.
    #[error("Parent {parent_id} belongs to merge request {parent_merge_request}, not {merge_request}")]
    ForeignParent {
        /// Proposed parent.
        parent_id: String,
        /// Merge request the parent belongs to.
        parent_merge_request: String,
        /// Merge request of the story being placed.
        merge_request: String,
    },
}

/// Request-layer errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Envelope is not a valid JSON-RPC 2.0 request.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// What was malformed.
        message: String,
    },

    /// Method name is not routed.
    #[error("Unknown method: {method}")]
    UnknownMethod {
        /// Requested method name.
        method: String,
    },

    /// Params do not match the method.
    #[error("Invalid parameters for {method}: {message}")]
    InvalidParameters {
        /// Method being called.
        method: String,
        /// Deserialization failure.
        message: String,
    },

    /// Result could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A user story.
    Story,
    /// An acceptance test.
    AcceptanceTest,
    /// A merge request.
    MergeRequest,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Story => write!(f, "Story"),
            Entity::AcceptanceTest => write!(f, "Acceptance test"),
            Entity::MergeRequest => write!(f, "Merge request"),
        }
    }
}

/// Stable machine-readable error codes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Referenced entity is absent.
    NotFound,
    /// Duplicate id or structural conflict (cycle, foreign parent).
    Conflict,
    /// Content blocked by policy, or a malformed policy selector.
    Validation,
    /// Hierarchy would exceed the configured maximum depth.
    DepthLimit,
    /// Protocol or serialization fault.
    Internal,
}

impl ErrorCode {
    /// Wire spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::Conflict => "conflict",
            ErrorCode::Validation => "validation",
            ErrorCode::DepthLimit => "depth_limit",
            ErrorCode::Internal => "internal",
        }
    }

    /// JSON-RPC error code used when this error reaches the wire.
    pub fn rpc_code(&self) -> i32 {
        match self {
            ErrorCode::NotFound => -32001,
            ErrorCode::Conflict => -32002,
            ErrorCode::Validation => -32003,
            ErrorCode::DepthLimit => -32004,
            ErrorCode::Internal => -32603,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error body: code, message and optional validation details.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Offending validation messages, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationMessage>>,
}

impl AppError {
    /// Map the error onto its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Store(StoreError::NotFound { .. }) => ErrorCode::NotFound,
            AppError::Store(_) => ErrorCode::Conflict,
            AppError::Validation { .. } | AppError::InvalidPolicy { .. } => ErrorCode::Validation,
            AppError::Config { .. } | AppError::Seed { .. } => ErrorCode::Validation,
            AppError::DepthLimit { .. } => ErrorCode::DepthLimit,
            AppError::Protocol(_) | AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Build the structured body for this error.
    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            AppError::Validation { details, .. } => Some(details.clone()),
            _ => None,
        };
        ErrorResponse {
            code: self.code(),
            message: self.to_string(),
            details,
        }
    }

    /// Shorthand for a missing story.
    pub fn story_not_found(id: impl Into<String>) -> Self {
        AppError::Store(StoreError::NotFound {
            entity: Entity::Story,
            id: id.into(),
        })
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for request-layer operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

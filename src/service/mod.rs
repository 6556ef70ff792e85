//! Operation surface over the store.
//!
//! Each service method is one externally visible operation: it takes the
//! store lock it needs, checks its preconditions under that lock, runs
//! validation under the request's policy and only then writes.

mod merge_requests;
mod stories;

pub use acceptance_tests::{AcceptanceTestService, AcceptanceTestUpdate};
pub use merge_requests::{
    BranchUpdateResponse, MergeRequestCreate, MergeRequestService, MergeRequestUpdate,
};
pub use stories::{MoveStoryRequest, ReorderStoryRequest, StoryService, StoryUpdate};

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::storage::{AcceptanceTest, Status, Story};
use crate::validation::{Policy, ValidationResult};

/// Per-request settings resolved by the request layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id echoed back to the caller.
    pub request_id: String,
    /// Validation policy for writes in this request.
    pub policy: Policy,
}

impl RequestContext {
    /// Context with a generated request id.
    pub fn new(policy: Policy) -> Self {
        Self {
            request_id: format!("req-{}", Uuid::new_v4()),
            policy,
        }
    }

    /// Set the request id
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Policy::Warn)
    }
}

/// A story together with its validation findings (its own and its tests').
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryResponse {
    /// The stored story.
    pub data: Story,
    /// Combined findings.
    pub validation: ValidationResult,
}

/// An acceptance test together with its validation findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceTestResponse {
    /// The stored test.
    pub data: AcceptanceTest,
    /// Findings for this test.
    pub validation: ValidationResult,
}

/// New status for a record.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusPatch {
    /// Target status.
    pub status: Status,
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use together with `#[serde(default)]`.
pub(crate) fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

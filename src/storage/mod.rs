//! In-memory storage for merge requests, stories and acceptance tests.
//!
//! Records live in flat maps keyed by id. The story hierarchy is kept as
//! parent back-references plus a per-group ordered child index
//! ([`TreeIndex`]); trees are only ever materialized on read.

mod collections;
mod stories;
mod store;
mod tree;


pub use collections::{AcceptanceTestRepository, MergeRequestRepository};
pub use stories::StoryRepository;
pub use store::{load_seed, Collections, DataStore};
pub use tree::{HierarchyNode, TreeIndex, TreeNode};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Workflow status shared by merge requests, stories and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not started.
    #[default]
    Draft,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    Review,
    /// Finished.
    Done,
    /// Cannot progress.
    Blocked,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Draft => write!(f, "draft"),
            Status::InProgress => write!(f, "in_progress"),
            Status::Review => write!(f, "review"),
            Status::Done => write!(f, "done"),
            Status::Blocked => write!(f, "blocked"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Status::Draft),
            "in_progress" => Ok(Status::InProgress),
            "review" => Ok(Status::Review),
            "done" => Ok(Status::Done),
            "blocked" => Ok(Status::Blocked),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// A merge request grouping a set of stories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// Unique merge request identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Current status.
    #[serde(default)]
    pub status: Status,
    /// Repository identifier.
    #[serde(rename = "repo", alias = "repository")]
    pub repository: String,
    /// Source branch.
    pub branch: String,
    /// Whether the branch has drifted from its base.
    #[serde(default)]
    pub drift: bool,
    /// Last branch synchronisation.
    #[serde(default, alias = "last_sync_at")]
    pub last_sync_at: Option<DateTime<Utc>>,
}

/// A user story; `parent_id` places it in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Unique story identifier.
    pub id: String,
    /// Owning merge request.
    #[serde(alias = "merge_request_id")]
    pub merge_request_id: String,
    /// Parent story; `None` for roots.
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<String>,
    /// Title, stored trimmed.
    #[serde(deserialize_with = "trimmed")]
    pub title: String,
    /// "As a ..." clause.
    pub role: String,
    /// "I want ..." clause.
    pub goal: String,
    /// "So that ..." clause.
    pub benefit: String,
    /// Current status.
    #[serde(default)]
    pub status: Status,
    /// Position among siblings.
    #[serde(default)]
    pub order: i64,
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

/// An acceptance test attached to a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptanceTest {
    /// Unique test identifier.
    pub id: String,
    /// Owning story.
    #[serde(alias = "story_id")]
    pub story_id: String,
    /// Given clause.
    pub given: String,
    /// When clause.
    pub when: String,
    /// Then clause.
    pub then: String,
    /// Current status.
    #[serde(default)]
    pub status: Status,
}

/// Aggregate counts over a subtree, inclusive of its root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollup {
    /// Stories in the subtree.
    pub total: usize,
    /// Stories with status done.
    pub done: usize,
    /// Stories with status blocked.
    pub blocked: usize,
}

impl Rollup {
    /// Add another rollup into this one.
    pub fn absorb(&mut self, other: Rollup) {
        self.total += other.total;
        self.done += other.done;
        self.blocked += other.blocked;
    }
}

/// Story tree node as returned to callers: the node, its ordered
/// children, the story's acceptance tests and the subtree rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTreeNode {
    /// The story at this node.
    pub story: Story,
    /// Child nodes in sibling order.
    pub children: Vec<StoryTreeNode>,
    /// Acceptance tests of this story.
    pub acceptance_tests: Vec<AcceptanceTest>,
    /// Subtree aggregate.
    pub rollup: Rollup,
}

/// Full contents of the store; also the seed file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// All merge requests.
    #[serde(default)]
    pub merge_requests: Vec<MergeRequest>,
    /// All stories.
    #[serde(default)]
    pub stories: Vec<Story>,
    /// All acceptance tests.
    #[serde(default)]
    pub tests: Vec<AcceptanceTest>,
}

impl MergeRequest {
    /// Create a new draft merge request
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: Status::Draft,
            repository: repository.into(),
            branch: branch.into(),
            drift: false,
            last_sync_at: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Story {
    /// Create a new draft root story
    pub fn new(
        id: impl Into<String>,
        merge_request_id: impl Into<String>,
        title: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        benefit: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            merge_request_id: merge_request_id.into(),
            parent_id: None,
            title: title.into().trim().to_string(),
            role: role.into(),
            goal: goal.into(),
            benefit: benefit.into(),
            status: Status::Draft,
            order: 0,
        }
    }

    /// Set the parent story
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the sibling position
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }
}

impl AcceptanceTest {
    /// Create a new draft acceptance test
    pub fn new(
        id: impl Into<String>,
        story_id: impl Into<String>,
        given: impl Into<String>,
        when: impl Into<String>,
        then: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            story_id: story_id.into(),
            given: given.into(),
            when: when.into(),
            then: then.into(),
            status: Status::Draft,
        }
    }

    /// Set the status
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

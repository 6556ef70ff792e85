use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::{explicit_null, RequestContext, StoryResponse};
use crate::config::Config;
use crate::error::{AppError, AppResult, Entity, StoreError};
use crate::storage::{Collections, DataStore, Status, Story, StoryTreeNode, TreeNode};
use crate::validation::{validate_acceptance_tests, validate_story, Policy};

/// Partial story update. Absent fields are left unchanged; an explicit
/// `"parentId": null` turns the story into a root.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryUpdate {
    /// New title; surrounding whitespace is trimmed.
    pub title: Option<String>,
    /// New "As a ..." clause.
    pub role: Option<String>,
    /// New "I want ..." clause.
    pub goal: Option<String>,
    /// New "So that ..." clause.
    pub benefit: Option<String>,
    /// New status.
    pub status: Option<Status>,
    /// `Some(None)` detaches the story to the root level.
    #[serde(default, alias = "parent_id", deserialize_with = "explicit_null")]
    pub parent_id: Option<Option<String>>,
    /// Stored as given; siblings are not renumbered.
    pub order: Option<i64>,
}

/// Target of a move.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStoryRequest {
    /// New parent, or `None` for the root level.
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<String>,
    /// Target position among the new siblings, clamped to bounds.
    #[serde(default)]
    pub index: i64,
}

/// New leading sibling order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReorderStoryRequest {
    /// Ids to place first, in this order.
    pub order: Vec<String>,
}

/// Story operations: CRUD, hierarchy changes and tree reads.
pub struct StoryService {
    store: Arc<DataStore>,
    depth_limit: usize,
}

impl StoryService {
    /// Create a new story service
    pub fn new(store: Arc<DataStore>, config: &Config) -> Self {
        Self {
            store,
            depth_limit: config.hierarchy.depth_limit,
        }
    }

    /// Maximum story depth enforced on writes.
    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// All stories.
    pub fn list(&self) -> Vec<Story> {
        self.store.read().stories.list()
    }

    /// A story with its validation findings.
    pub fn get(&self, ctx: &RequestContext, id: &str) -> AppResult<StoryResponse> {
        let guard = self.store.read();
        let story = guard
            .stories
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::story_not_found(id))?;
        Ok(respond(&guard, story, ctx.policy))
    }

    /// Insert a new story.
    pub fn create(&self, ctx: &RequestContext, story: Story) -> AppResult<StoryResponse> {
        let mut guard = self.store.write();

        if guard.stories.get(&story.id).is_some() {
            warn!(story_id = %story.id, "Rejected duplicate story");
            return Err(StoreError::AlreadyExists {
                entity: Entity::Story,
                id: story.id,
            }
            .into());
        }

        self.check_placement(
            &guard,
            &story.id,
            &story.merge_request_id,
            story.parent_id.as_deref(),
        )?;
        check_policy(&story, ctx.policy)?;

        let story = guard.stories.upsert(story);
        debug!(
            request_id = %ctx.request_id,
            story_id = %story.id,
            parent_id = ?story.parent_id,
            "Story created"
        );
        Ok(respond(&guard, story, ctx.policy))
    }

    /// Apply a partial update to an existing story.
    pub fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        update: StoryUpdate,
    ) -> AppResult<StoryResponse> {
        let mut guard = self.store.write();
        let mut story = guard
            .stories
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::story_not_found(id))?;

        let reparent = update.parent_id.is_some();
        if let Some(title) = update.title {
            story.title = title.trim().to_string();
        }
        if let Some(role) = update.role {
            story.role = role;
        }
        if let Some(goal) = update.goal {
            story.goal = goal;
        }
        if let Some(benefit) = update.benefit {
            story.benefit = benefit;
        }
        if let Some(status) = update.status {
            story.status = status;
        }
        if let Some(parent_id) = update.parent_id {
            story.parent_id = parent_id;
        }
        if let Some(order) = update.order {
            story.order = order;
        }

        if reparent {
            self.check_placement(
                &guard,
                &story.id,
                &story.merge_request_id,
                story.parent_id.as_deref(),
            )?;
        }
        check_policy(&story, ctx.policy)?;

        let story = guard.stories.upsert(story);
        debug!(request_id = %ctx.request_id, story_id = %story.id, "Story updated");
        Ok(respond(&guard, story, ctx.policy))
    }

    /// Change only the status of a story.
    pub fn set_status(
        &self,
        ctx: &RequestContext,
        id: &str,
        status: Status,
    ) -> AppResult<StoryResponse> {
        let mut guard = self.store.write();
        let mut story = guard
            .stories
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::story_not_found(id))?;
        story.status = status;
        let story = guard.stories.upsert(story);
        debug!(story_id = %story.id, status = %status, "Story status changed");
        Ok(respond(&guard, story, ctx.policy))
    }

    /// Remove a story record. Its children and tests are kept; the
    /// children keep pointing at the removed id.
    pub fn delete(&self, id: &str) -> AppResult<Story> {
        let mut guard = self.store.write();
        let removed = guard
            .stories
            .delete(id)
            .ok_or_else(|| AppError::story_not_found(id))?;
        let orphans = guard.stories.children(Some(id)).len();
        debug!(story_id = %id, orphans, "Story deleted");
        Ok(removed)
    }

    /// Re-parent a story and place it at `index` among its new siblings.
    pub fn move_story(
        &self,
        ctx: &RequestContext,
        id: &str,
        request: MoveStoryRequest,
    ) -> AppResult<StoryResponse> {
        let mut guard = self.store.write();
        let merge_request_id = guard
            .stories
            .get(id)
            .map(|s| s.merge_request_id.clone())
            .ok_or_else(|| AppError::story_not_found(id))?;

        self.check_placement(&guard, id, &merge_request_id, request.parent_id.as_deref())?;

        let story = guard
            .stories
            .move_story(id, request.parent_id.as_deref(), request.index)?;
        debug!(
            request_id = %ctx.request_id,
            story_id = %id,
            parent_id = ?story.parent_id,
            order = story.order,
            "Story moved"
        );
        Ok(respond(&guard, story, ctx.policy))
    }

    /// Reorder the siblings of `anchor_id`: listed ids lead, in list
    /// order. Listed stories pulled in from another parent must keep their
    /// subtree within the depth limit. Returns the resulting sibling list.
    pub fn reorder(&self, anchor_id: &str, request: ReorderStoryRequest) -> AppResult<Vec<Story>> {
        let mut guard = self.store.write();
        let anchor = guard
            .stories
            .get(anchor_id)
            .cloned()
            .ok_or_else(|| AppError::story_not_found(anchor_id))?;

        let parent_id = anchor.parent_id.as_deref();
        for id in &request.order {
            let Some(story) = guard.stories.get(id) else {
                continue;
            };
            let moves = story.merge_request_id == anchor.merge_request_id
                && story.parent_id.as_deref() != parent_id;
            // Cyclic placements are rejected by the index below.
            if !moves || guard.stories.has_cycle(id, parent_id) {
                continue;
            }
            let parent_depth = parent_id.map_or(0, |p| guard.stories.depth(p));
            self.check_depth(id, parent_depth + guard.stories.subtree_height(id))?;
        }

        guard
            .stories
            .reorder(
                &anchor.merge_request_id,
                anchor.parent_id.as_deref(),
                &request.order,
            )
            .map_err(|e| {
                warn!(story_id = %anchor_id, error = %e, "Rejected reorder");
                e
            })?;

        debug!(story_id = %anchor_id, listed = request.order.len(), "Siblings reordered");
        Ok(guard
            .stories
            .siblings(&anchor.merge_request_id, anchor.parent_id.as_deref()))
    }

    /// Story forest of a merge request with tests attached.
    pub fn tree(&self, merge_request_id: &str, max_depth: Option<usize>) -> Vec<StoryTreeNode> {
        let guard = self.store.read();
        guard
            .stories
            .tree(merge_request_id, max_depth)
            .into_iter()
            .map(|node| attach_tests(&guard, node))
            .collect()
    }

    /// Path from the root down to the story's parent.
    pub fn path(&self, id: &str) -> AppResult<Vec<Story>> {
        let guard = self.store.read();
        if guard.stories.get(id).is_none() {
            return Err(AppError::story_not_found(id));
        }
        Ok(guard.stories.ancestors(id))
    }

    /// Direct children of a story, in order.
    pub fn children(&self, id: &str) -> AppResult<Vec<Story>> {
        let guard = self.store.read();
        if guard.stories.get(id).is_none() {
            return Err(AppError::story_not_found(id));
        }
        Ok(guard.stories.children(Some(id)))
    }

    /// Check that `story_id` may sit under `parent_id`: the parent exists
    /// in the same merge request, is not the story or one of its
    /// descendants, and the story's subtree stays within the depth limit.
    fn check_placement(
        &self,
        collections: &Collections,
        story_id: &str,
        merge_request_id: &str,
        parent_id: Option<&str>,
    ) -> AppResult<()> {
        let Some(parent_id) = parent_id else {
            let depth = collections.stories.subtree_height(story_id);
            return self.check_depth(story_id, depth);
        };

        let parent = collections
            .stories
            .get(parent_id)
            .ok_or_else(|| AppError::story_not_found(parent_id))?;

        if parent.merge_request_id != merge_request_id {
            warn!(story_id, parent_id, "Rejected parent from another merge request");
            return Err(StoreError::ForeignParent {
                parent_id: parent_id.to_string(),
                parent_merge_request: parent.merge_request_id.clone(),
                merge_request: merge_request_id.to_string(),
            }
            .into());
        }

        if collections.stories.has_cycle(story_id, Some(parent_id)) {
            warn!(story_id, parent_id, "Rejected cyclic placement");
            return Err(StoreError::Cycle {
                story_id: story_id.to_string(),
                parent_id: parent_id.to_string(),
            }
            .into());
        }

        let depth =
            collections.stories.depth(parent_id) + collections.stories.subtree_height(story_id);
        self.check_depth(story_id, depth)
    }

    fn check_depth(&self, story_id: &str, depth: usize) -> AppResult<()> {
        if depth > self.depth_limit {
            warn!(story_id, depth, limit = self.depth_limit, "Rejected placement beyond depth limit");
            return Err(AppError::DepthLimit {
                depth,
                limit: self.depth_limit,
            });
        }
        Ok(())
    }
}

fn check_policy(story: &Story, policy: Policy) -> AppResult<()> {
    validate_story(story, policy)
        .into_blocking_error(&format!("story {}", story.id))
        .map(|_| ())
        .map_err(|e| {
            warn!(story_id = %story.id, "Story write blocked by validation");
            e
        })
}

fn respond(collections: &Collections, story: Story, policy: Policy) -> StoryResponse {
    let mut validation = validate_story(&story, policy).validation;
    let tests = collections.tests.list_by_story(&story.id);
    validation.extend(validate_acceptance_tests(&tests, policy).validation);
    StoryResponse {
        data: story,
        validation,
    }
}

fn attach_tests(collections: &Collections, node: TreeNode<Story>) -> StoryTreeNode {
    let acceptance_tests = collections.tests.list_by_story(&node.node.id);
    StoryTreeNode {
        children: node
            .children
            .into_iter()
            .map(|child| attach_tests(collections, child))
            .collect(),
        acceptance_tests,
        rollup: node.rollup,
        story: node.node,
    }
}

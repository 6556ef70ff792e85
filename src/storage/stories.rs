use super::tree::{HierarchyNode, TreeIndex, TreeNode};
use super::{Rollup, Status, Story};
use crate::error::StoreResult;

impl HierarchyNode for Story {
    fn node_id(&self) -> &str {
        &self.id
    }

    fn group_id(&self) -> &str {
        &self.merge_request_id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn set_parent_id(&mut self, parent_id: Option<String>) {
        self.parent_id = parent_id;
    }

    fn position(&self) -> i64 {
        self.order
    }

    fn set_position(&mut self, position: i64) {
        self.order = position;
    }

    fn own_rollup(&self) -> Rollup {
        Rollup {
            total: 1,
            done: usize::from(self.status == Status::Done),
            blocked: usize::from(self.status == Status::Blocked),
        }
    }
}

/// Story records keyed by id, with the hierarchy kept in a [`TreeIndex`].
///
/// Sibling groups are scoped per merge request: two root stories of
/// different merge requests never share an ordering.
#[derive(Debug, Clone, Default)]
pub struct StoryRepository {
    index: TreeIndex<Story>,
}

impl StoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// All stories, sorted by merge request, then parent, then order.
    pub fn list(&self) -> Vec<Story> {
        let mut stories: Vec<Story> = self.index.values().cloned().collect();
        stories.sort_by(|a, b| {
            (&a.merge_request_id, &a.parent_id, a.order, &a.id)
                .cmp(&(&b.merge_request_id, &b.parent_id, b.order, &b.id))
        });
        stories
    }

    /// Stories of one merge request, in the same order as [`list`](Self::list).
    pub fn list_by_merge_request(&self, merge_request_id: &str) -> Vec<Story> {
        self.list()
            .into_iter()
            .filter(|s| s.merge_request_id == merge_request_id)
            .collect()
    }

    /// Number of stories.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether there are no stories.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up a story.
    pub fn get(&self, id: &str) -> Option<&Story> {
        self.index.get(id)
    }

    /// Insert or replace a story without renumbering its siblings.
    pub fn upsert(&mut self, story: Story) -> Story {
        self.index.upsert(story.clone());
        story
    }

    /// Remove a story record only. Children are left pointing at the
    /// removed id and former siblings keep their orders.
    pub fn delete(&mut self, id: &str) -> Option<Story> {
        self.index.remove(id)
    }

    /// Replace every story, keeping stored orders.
    pub fn reset(&mut self, stories: impl IntoIterator<Item = Story>) {
        self.index = TreeIndex::from_nodes(stories);
    }

    /// Children of a story (or every root for `None`), ordered by `order`.
    pub fn children(&self, parent_id: Option<&str>) -> Vec<Story> {
        self.index.children(parent_id).into_iter().cloned().collect()
    }

    /// Children of `parent_id` within one merge request, ordered by `order`.
    pub fn siblings(&self, merge_request_id: &str, parent_id: Option<&str>) -> Vec<Story> {
        self.index
            .children_in_group(merge_request_id, parent_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Path from the root to the story's parent.
    pub fn ancestors(&self, id: &str) -> Vec<Story> {
        self.index.ancestors(id).into_iter().cloned().collect()
    }

    /// Depth of a story; roots are depth 1.
    pub fn depth(&self, id: &str) -> usize {
        self.index.depth(id)
    }

    /// Levels in the subtree rooted at `id`, counting `id`.
    pub fn subtree_height(&self, id: &str) -> usize {
        self.index.subtree_height(id)
    }

    /// Whether `proposed_parent` is `story_id` or one of its descendants.
    pub fn has_cycle(&self, story_id: &str, proposed_parent: Option<&str>) -> bool {
        self.index.has_cycle(story_id, proposed_parent)
    }

    /// Re-parent a story and place it at `index` among its new siblings.
    pub fn move_story(
        &mut self,
        story_id: &str,
        parent_id: Option<&str>,
        index: i64,
    ) -> StoreResult<Story> {
        self.index
            .move_node(story_id, parent_id, index)
            .map(Clone::clone)
    }

    /// Put `order` first under `parent_id` within a merge request.
    pub fn reorder(
        &mut self,
        merge_request_id: &str,
        parent_id: Option<&str>,
        order: &[String],
    ) -> StoreResult<()> {
        self.index.reorder(merge_request_id, parent_id, order)
    }

    /// Story forest of a merge request, optionally cut off at `max_depth`.
    pub fn tree(&self, merge_request_id: &str, max_depth: Option<usize>) -> Vec<TreeNode<Story>> {
        self.index.build_forest(merge_request_id, max_depth)
    }
}

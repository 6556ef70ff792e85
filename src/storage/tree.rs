//! Ordered hierarchy index over flat records.
//!
//! Records are owned in a map keyed by id; each record points at its
//! parent by id. The index keeps, per `(group, parent)` pair, the ordered
//! list of child ids so sibling operations touch only one group. Reads
//! that walk parent links (ancestors, depth) stop quietly on a missing or
//! repeated link instead of failing.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::Rollup;
use crate::error::{Entity, StoreError, StoreResult};

/// A record that can be placed in a [`TreeIndex`].
pub trait HierarchyNode: Clone {
    /// Unique id of the record.
    fn node_id(&self) -> &str;
    /// Collection the record belongs to; siblings are grouped per collection.
    fn group_id(&self) -> &str;
    /// Parent record id, `None` for roots.
    fn parent_id(&self) -> Option<&str>;
    /// Replace the parent link.
    fn set_parent_id(&mut self, parent_id: Option<String>);
    /// Sibling position.
    fn position(&self) -> i64;
    /// Replace the sibling position.
    fn set_position(&mut self, position: i64);
    /// This record's own contribution to a rollup.
    fn own_rollup(&self) -> Rollup;
}

type GroupKey = (String, Option<String>);

fn key_of<N: HierarchyNode>(node: &N) -> GroupKey {
    (
        node.group_id().to_string(),
        node.parent_id().map(str::to_string),
    )
}

/// A materialized subtree with its rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode<N> {
    /// The record at this node.
    pub node: N,
    /// Child subtrees in sibling order.
    pub children: Vec<TreeNode<N>>,
    /// Aggregate over this node and every descendant that was visited.
    pub rollup: Rollup,
}

/// Flat record map plus per-group ordered child lists.
#[derive(Debug, Clone)]
pub struct TreeIndex<N> {
    nodes: HashMap<String, N>,
    groups: HashMap<GroupKey, Vec<String>>,
}

impl<N: HierarchyNode> Default for TreeIndex<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: HierarchyNode> TreeIndex<N> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Build an index from records, keeping their stored positions.
    pub fn from_nodes(nodes: impl IntoIterator<Item = N>) -> Self {
        let mut index = Self::new();
        for node in nodes {
            index.upsert(node);
        }
        index
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a record.
    pub fn get(&self, id: &str) -> Option<&N> {
        self.nodes.get(id)
    }

    /// Whether a record exists.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All records, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }

    /// Insert or replace a record. Positions are taken as given; the
    /// record is slotted after any sibling with an equal or lower position.
    pub fn upsert(&mut self, node: N) -> Option<N> {
        let id = node.node_id().to_string();
        let previous = self.nodes.remove(&id);
        if let Some(old) = &previous {
            self.detach(&key_of(old), &id);
        }

        let key = key_of(&node);
        let position = node.position();
        let nodes = &self.nodes;
        let siblings = self.groups.entry(key).or_default();
        let slot = siblings.partition_point(|sibling| {
            nodes
                .get(sibling)
                .map_or(true, |s| s.position() <= position)
        });
        siblings.insert(slot, id.clone());
        self.nodes.insert(id, node);

        previous
    }

    /// Remove a record. Its children keep their now-dangling parent link
    /// and its former siblings keep their positions.
    pub fn remove(&mut self, id: &str) -> Option<N> {
        let removed = self.nodes.remove(id)?;
        self.detach(&key_of(&removed), id);
        Some(removed)
    }

    /// Children of `parent` (roots for `None`) ordered by position. Groups
    /// are visited in group-id order when a parent spans several.
    pub fn children(&self, parent: Option<&str>) -> Vec<&N> {
        let mut keys: Vec<&GroupKey> = self
            .groups
            .keys()
            .filter(|(_, p)| p.as_deref() == parent)
            .collect();
        keys.sort();
        keys.into_iter()
            .flat_map(|key| self.group_members(key))
            .collect()
    }

    /// Children of `parent` within a single group, ordered by position.
    pub fn children_in_group(&self, group_id: &str, parent: Option<&str>) -> Vec<&N> {
        let key = (group_id.to_string(), parent.map(str::to_string));
        self.group_members(&key).collect()
    }

    fn group_members<'a>(&'a self, key: &GroupKey) -> impl Iterator<Item = &'a N> + 'a {
        self.groups
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.nodes.get(id))
    }

    /// Path from the root down to the record's parent, excluding the record.
    /// Stops at the first missing or already-visited link.
    pub fn ancestors(&self, id: &str) -> Vec<&N> {
        let mut path = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([id]);
        let mut current = self.nodes.get(id);

        while let Some(parent_id) = current.and_then(|n| n.parent_id()) {
            if !visited.insert(parent_id) {
                break;
            }
            let Some(parent) = self.nodes.get(parent_id) else {
                break;
            };
            path.push(parent);
            current = Some(parent);
        }

        path.reverse();
        path
    }

    /// Depth of a record, counting itself; roots are depth 1.
    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).len() + 1
    }

    /// Number of levels in the subtree under `id`, counting `id` itself.
    /// Children are found by parent link, so this also works for an id
    /// that is about to be inserted and already has orphans pointing at it.
    pub fn subtree_height(&self, id: &str) -> usize {
        let mut visited = HashSet::new();
        self.height_from(id, &mut visited)
    }

    fn height_from<'a>(&'a self, id: &'a str, visited: &mut HashSet<&'a str>) -> usize {
        if !visited.insert(id) {
            return 0;
        }
        let deepest_child = self
            .children(Some(id))
            .into_iter()
            .map(|child| self.height_from(child.node_id(), visited))
            .max()
            .unwrap_or(0);
        deepest_child + 1
    }

    /// Whether placing `node_id` under `proposed_parent` would close a loop:
    /// true when the proposed parent is the node itself or one of its
    /// descendants.
    pub fn has_cycle(&self, node_id: &str, proposed_parent: Option<&str>) -> bool {
        let mut visited = HashSet::new();
        let mut current = proposed_parent;

        while let Some(candidate) = current {
            if candidate == node_id {
                return true;
            }
            if !visited.insert(candidate) {
                return false;
            }
            current = self.nodes.get(candidate).and_then(|n| n.parent_id());
        }
        false
    }

    /// Re-parent a record and place it at `target_index` among its new
    /// siblings (clamped to the group bounds). Old and new groups are
    /// renumbered `0..n`.
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        target_index: i64,
    ) -> StoreResult<&N> {
        let node = self.nodes.get(id).ok_or_else(|| StoreError::NotFound {
            entity: Entity::Story,
            id: id.to_string(),
        })?;
        if let Some(parent_id) = new_parent {
            if self.has_cycle(id, Some(parent_id)) {
                return Err(StoreError::Cycle {
                    story_id: id.to_string(),
                    parent_id: parent_id.to_string(),
                });
            }
        }

        let old_key = key_of(node);
        let new_key = (old_key.0.clone(), new_parent.map(str::to_string));
        self.detach_keep_group(&old_key, id);

        if let Some(node) = self.nodes.get_mut(id) {
            node.set_parent_id(new_parent.map(str::to_string));
        }
        let siblings = self.groups.entry(new_key.clone()).or_default();
        let slot = usize::try_from(target_index.max(0))
            .unwrap_or(usize::MAX)
            .min(siblings.len());
        siblings.insert(slot, id.to_string());

        self.renumber(&old_key);
        if new_key != old_key {
            self.renumber(&new_key);
        }

        self.nodes.get(id).ok_or_else(|| StoreError::NotFound {
            entity: Entity::Story,
            id: id.to_string(),
        })
    }

    /// Make `ids` (those present in `group_id`) the leading children of
    /// `parent`, in list order, re-parenting any that lived elsewhere.
    /// Unlisted siblings follow in their previous order. Every touched
    /// group is renumbered `0..n`. Fails without changes if any listed id
    /// would become its own ancestor.
    pub fn reorder(&mut self, group_id: &str, parent: Option<&str>, ids: &[String]) -> StoreResult<()> {
        let target_key: GroupKey = (group_id.to_string(), parent.map(str::to_string));

        let mut seen: HashSet<String> = HashSet::new();
        let listed: Vec<String> = ids
            .iter()
            .filter(|id| {
                self.nodes
                    .get(id.as_str())
                    .is_some_and(|n| n.group_id() == group_id)
            })
            .filter(|id| seen.insert(id.to_string()))
            .cloned()
            .collect();

        for id in &listed {
            let moves = self
                .nodes
                .get(id)
                .is_some_and(|n| n.parent_id() != parent);
            if moves && self.has_cycle(id, parent) {
                return Err(StoreError::Cycle {
                    story_id: id.clone(),
                    parent_id: parent.unwrap_or_default().to_string(),
                });
            }
        }

        let mut touched: Vec<GroupKey> = Vec::new();
        for id in &listed {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let old_key = key_of(node);
            self.detach_keep_group(&old_key, id);
            if old_key != target_key {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.set_parent_id(parent.map(str::to_string));
                }
                if !touched.contains(&old_key) {
                    touched.push(old_key);
                }
            }
        }

        let siblings = self.groups.entry(target_key.clone()).or_default();
        let remaining = std::mem::take(siblings);
        siblings.extend(listed);
        siblings.extend(remaining);

        self.renumber(&target_key);
        for key in &touched {
            self.renumber(key);
        }
        Ok(())
    }

    /// Materialize the trees of `group_id`, one per root in sibling order.
    /// Descent stops once a node sits at `max_depth` (roots are depth 1);
    /// `None` descends fully.
    pub fn build_forest(&self, group_id: &str, max_depth: Option<usize>) -> Vec<TreeNode<N>> {
        self.children_in_group(group_id, None)
            .into_iter()
            .map(|root| self.build_node(root, 1, max_depth))
            .collect()
    }

    fn build_node(&self, node: &N, depth: usize, max_depth: Option<usize>) -> TreeNode<N> {
        let children: Vec<TreeNode<N>> = if max_depth.map_or(true, |limit| depth < limit) {
            self.children_in_group(node.group_id(), Some(node.node_id()))
                .into_iter()
                .map(|child| self.build_node(child, depth + 1, max_depth))
                .collect()
        } else {
            Vec::new()
        };

        let mut rollup = node.own_rollup();
        for child in &children {
            rollup.absorb(child.rollup);
        }

        TreeNode {
            node: node.clone(),
            children,
            rollup,
        }
    }

    fn detach(&mut self, key: &GroupKey, id: &str) {
        self.detach_keep_group(key, id);
        if self.groups.get(key).is_some_and(Vec::is_empty) {
            self.groups.remove(key);
        }
    }

    fn detach_keep_group(&mut self, key: &GroupKey, id: &str) {
        if let Some(siblings) = self.groups.get_mut(key) {
            siblings.retain(|sibling| sibling != id);
        }
    }

    fn renumber(&mut self, key: &GroupKey) {
        let Some(siblings) = self.groups.get(key) else {
            return;
        };
        if siblings.is_empty() {
            self.groups.remove(key);
            return;
        }
        for (position, id) in siblings.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(id) {
                node.set_position(position as i64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Status, Story};
    use pretty_assertions::assert_eq;

    fn story(id: &str, parent: Option<&str>, order: i64) -> Story {
        let mut s = Story::new(id, "MR-1", id, "As a tester", "I want X", "So that Y")
            .with_order(order);
        s.parent_id = parent.map(str::to_string);
        s
    }

    fn ids(nodes: &[&Story]) -> Vec<String> {
        nodes.iter().map(|n| n.id.clone()).collect()
    }

    fn orders(nodes: &[&Story]) -> Vec<i64> {
        nodes.iter().map(|n| n.order).collect()
    }

    /// root -> a -> b -> c, root -> d
    fn chain() -> TreeIndex<Story> {
        TreeIndex::from_nodes([
            story("root", None, 0),
            story("a", Some("root"), 0),
            story("d", Some("root"), 1),
            story("b", Some("a"), 0),
            story("c", Some("b"), 0),
        ])
    }

    #[test]
    fn test_children_sorted_by_stored_order() {
        let index = TreeIndex::from_nodes([
            story("p", None, 0),
            story("x", Some("p"), 2),
            story("y", Some("p"), 0),
            story("z", Some("p"), 1),
        ]);
        assert_eq!(ids(&index.children(Some("p"))), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_upsert_does_not_renumber() {
        let mut index = TreeIndex::from_nodes([story("p", None, 0), story("x", Some("p"), 5)]);
        index.upsert(story("y", Some("p"), 9));
        assert_eq!(orders(&index.children(Some("p"))), vec![5, 9]);
    }

    #[test]
    fn test_upsert_replaces_and_regroups() {
        let mut index = chain();
        let previous = index.upsert(story("d", Some("a"), 1));
        assert_eq!(previous.and_then(|p| p.parent_id), Some("root".to_string()));
        assert_eq!(ids(&index.children(Some("root"))), vec!["a"]);
        assert_eq!(ids(&index.children(Some("a"))), vec!["b", "d"]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_ancestors_root_to_parent() {
        let index = chain();
        assert_eq!(ids(&index.ancestors("c")), vec!["root", "a", "b"]);
        assert!(index.ancestors("root").is_empty());
        assert!(index.ancestors("missing").is_empty());
    }

    #[test]
    fn test_depth() {
        let index = chain();
        assert_eq!(index.depth("root"), 1);
        assert_eq!(index.depth("a"), 2);
        assert_eq!(index.depth("c"), 4);
        assert_eq!(index.depth("missing"), 1);
    }

    #[test]
    fn test_ancestors_stop_on_missing_parent() {
        let index = TreeIndex::from_nodes([story("a", Some("gone"), 0), story("b", Some("a"), 0)]);
        assert_eq!(ids(&index.ancestors("b")), vec!["a"]);
        assert_eq!(index.depth("b"), 2);
    }

    #[test]
    fn test_ancestors_stop_on_corrupted_cycle() {
        let index = TreeIndex::from_nodes([
            story("a", Some("c"), 0),
            story("b", Some("a"), 0),
            story("c", Some("b"), 0),
        ]);
        assert_eq!(ids(&index.ancestors("a")), vec!["b", "c"]);
        assert_eq!(index.depth("a"), 3);

        let self_loop = TreeIndex::from_nodes([story("s", Some("s"), 0)]);
        assert!(self_loop.ancestors("s").is_empty());
        assert_eq!(self_loop.depth("s"), 1);
    }

    #[test]
    fn test_has_cycle() {
        let index = chain();
        assert!(index.has_cycle("a", Some("a")));
        assert!(index.has_cycle("a", Some("b")));
        assert!(index.has_cycle("a", Some("c")));
        assert!(!index.has_cycle("a", Some("d")));
        assert!(!index.has_cycle("c", Some("a")));
        assert!(!index.has_cycle("a", None));
        assert!(!index.has_cycle("a", Some("missing")));
    }

    #[test]
    fn test_has_cycle_terminates_on_corrupted_chain() {
        let index = TreeIndex::from_nodes([story("a", Some("b"), 0), story("b", Some("a"), 0)]);
        assert!(!index.has_cycle("x", Some("a")));
    }

    #[test]
    fn test_subtree_height() {
        let index = chain();
        assert_eq!(index.subtree_height("root"), 4);
        assert_eq!(index.subtree_height("a"), 3);
        assert_eq!(index.subtree_height("d"), 1);
        assert_eq!(index.subtree_height("new"), 1);
    }

    #[test]
    fn test_move_renumbers_both_groups() {
        let mut index = TreeIndex::from_nodes([
            story("p", None, 0),
            story("q", None, 1),
            story("a", Some("p"), 0),
            story("b", Some("p"), 1),
            story("c", Some("p"), 2),
            story("x", Some("q"), 0),
            story("y", Some("q"), 1),
        ]);

        let moved = index.move_node("b", Some("q"), 1).unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some("q"));
        assert_eq!(moved.order, 1);

        let p_children = index.children(Some("p"));
        assert_eq!(ids(&p_children), vec!["a", "c"]);
        assert_eq!(orders(&p_children), vec![0, 1]);

        let q_children = index.children(Some("q"));
        assert_eq!(ids(&q_children), vec!["x", "b", "y"]);
        assert_eq!(orders(&q_children), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_clamps_target_index() {
        let mut index = TreeIndex::from_nodes([
            story("p", None, 0),
            story("a", Some("p"), 0),
            story("b", Some("p"), 1),
            story("c", None, 1),
        ]);
        index.move_node("c", Some("p"), 99).unwrap();
        assert_eq!(ids(&index.children(Some("p"))), vec!["a", "b", "c"]);

        index.move_node("c", Some("p"), -4).unwrap();
        let children = index.children(Some("p"));
        assert_eq!(ids(&children), vec!["c", "a", "b"]);
        assert_eq!(orders(&children), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_within_same_group() {
        let mut index = TreeIndex::from_nodes([
            story("a", None, 0),
            story("b", None, 1),
            story("c", None, 2),
        ]);
        index.move_node("a", None, 2).unwrap();
        let roots = index.children(None);
        assert_eq!(ids(&roots), vec!["b", "c", "a"]);
        assert_eq!(orders(&roots), vec![0, 1, 2]);
    }

    #[test]
    fn test_move_to_root() {
        let mut index = chain();
        index.move_node("b", None, 0).unwrap();
        assert_eq!(ids(&index.children(None)), vec!["b", "root"]);
        assert_eq!(index.depth("c"), 2);
        assert!(index.children(Some("a")).is_empty());
    }

    #[test]
    fn test_move_rejects_cycle_without_mutation() {
        let mut index = chain();
        let err = index.move_node("a", Some("c"), 0).unwrap_err();
        assert!(matches!(err, StoreError::Cycle { .. }));
        assert_eq!(index.get("a").and_then(|a| a.parent_id.clone()), Some("root".to_string()));
        assert_eq!(ids(&index.children(Some("root"))), vec!["a", "d"]);
    }

    #[test]
    fn test_move_missing_node() {
        let mut index = chain();
        assert!(matches!(
            index.move_node("nope", None, 0),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_reorder_lists_first_then_remaining() {
        let mut index = TreeIndex::from_nodes([
            story("a", None, 0),
            story("b", None, 1),
            story("c", None, 2),
            story("d", None, 3),
        ]);
        index
            .reorder("MR-1", None, &["c".to_string(), "a".to_string()])
            .unwrap();
        let roots = index.children(None);
        assert_eq!(ids(&roots), vec!["c", "a", "b", "d"]);
        assert_eq!(orders(&roots), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reorder_skips_unknown_and_duplicate_ids() {
        let mut index = TreeIndex::from_nodes([story("a", None, 0), story("b", None, 1)]);
        index
            .reorder(
                "MR-1",
                None,
                &["ghost".to_string(), "b".to_string(), "b".to_string()],
            )
            .unwrap();
        let roots = index.children(None);
        assert_eq!(ids(&roots), vec!["b", "a"]);
        assert_eq!(orders(&roots), vec![0, 1]);
    }

    #[test]
    fn test_reorder_reparents_foreign_ids() {
        let mut index = chain();
        index
            .reorder("MR-1", Some("root"), &["b".to_string(), "d".to_string()])
            .unwrap();
        let children = index.children(Some("root"));
        assert_eq!(ids(&children), vec!["b", "d", "a"]);
        assert_eq!(orders(&children), vec![0, 1, 2]);
        assert!(index.children(Some("a")).is_empty());
        assert_eq!(index.get("b").and_then(|b| b.parent_id.clone()), Some("root".to_string()));
    }

    #[test]
    fn test_reorder_renumbers_source_group() {
        let mut index = TreeIndex::from_nodes([
            story("p", None, 0),
            story("q", None, 1),
            story("a", Some("p"), 0),
            story("b", Some("p"), 1),
            story("c", Some("p"), 2),
        ]);
        index
            .reorder("MR-1", Some("q"), &["a".to_string()])
            .unwrap();
        let p_children = index.children(Some("p"));
        assert_eq!(ids(&p_children), vec!["b", "c"]);
        assert_eq!(orders(&p_children), vec![0, 1]);
    }

    #[test]
    fn test_reorder_rejects_cycle_without_mutation() {
        let mut index = chain();
        let err = index
            .reorder("MR-1", Some("b"), &["a".to_string(), "c".to_string()])
            .unwrap_err();
        assert!(matches!(err, StoreError::Cycle { .. }));
        assert_eq!(ids(&index.ancestors("c")), vec!["root", "a", "b"]);
    }

    #[test]
    fn test_reorder_ignores_other_groups() {
        let mut other = story("z", None, 0);
        other.merge_request_id = "MR-2".to_string();
        let mut index = TreeIndex::from_nodes([story("a", None, 0), other]);
        index
            .reorder("MR-1", None, &["z".to_string(), "a".to_string()])
            .unwrap();
        assert_eq!(index.children_in_group("MR-1", None).len(), 1);
        assert_eq!(index.children_in_group("MR-2", None).len(), 1);
    }

    #[test]
    fn test_remove_leaves_orphans() {
        let mut index = chain();
        let removed = index.remove("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(index.get("b").and_then(|b| b.parent_id.clone()), Some("a".to_string()));
        assert!(index.ancestors("b").is_empty());
        assert_eq!(ids(&index.children(Some("a"))), vec!["b"]);
        assert_eq!(orders(&index.children(Some("root"))), vec![1]);
    }

    #[test]
    fn test_forest_rollup() {
        let index = TreeIndex::from_nodes([
            story("root", None, 0).with_status(Status::Done),
            story("a", Some("root"), 0).with_status(Status::Blocked),
            story("b", Some("root"), 1).with_status(Status::Done),
            story("c", Some("a"), 0).with_status(Status::Done),
            story("other", None, 1),
        ]);
        let forest = index.build_forest("MR-1", None);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].node.id, "root");
        assert_eq!(
            forest[0].rollup,
            Rollup {
                total: 4,
                done: 3,
                blocked: 1
            }
        );
        assert_eq!(forest[0].children[0].rollup.total, 2);
        assert_eq!(
            forest[1].rollup,
            Rollup {
                total: 1,
                done: 0,
                blocked: 0
            }
        );
    }

    #[test]
    fn test_forest_depth_truncation() {
        let index = chain();
        let forest = index.build_forest("MR-1", Some(2));
        let root = &forest[0];
        assert_eq!(root.children.len(), 2);
        assert!(root.children.iter().all(|c| c.children.is_empty()));
        assert_eq!(root.rollup.total, 3);

        let roots_only = index.build_forest("MR-1", Some(1));
        assert!(roots_only[0].children.is_empty());
        assert_eq!(roots_only[0].rollup.total, 1);
    }

    #[test]
    fn test_forest_excludes_orphans_and_other_groups() {
        let mut foreign = story("f", None, 0);
        foreign.merge_request_id = "MR-2".to_string();
        let index = TreeIndex::from_nodes([story("r", None, 0), story("o", Some("gone"), 0), foreign]);
        let forest = index.build_forest("MR-1", None);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node.id, "r");
        assert!(index.build_forest("MR-404", None).is_empty());
    }
}

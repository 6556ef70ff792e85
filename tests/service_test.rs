//! Integration tests for the operation services.
//!
//! Each scenario runs against a fresh in-memory store shared by all
//! three services, the same way the server wires them.

use std::sync::Arc;

use pm_mindmap::config::Config;
use pm_mindmap::error::{AppError, ErrorCode, StoreError};
use pm_mindmap::server::AppState;
use pm_mindmap::service::{MoveStoryRequest, ReorderStoryRequest, RequestContext, StoryUpdate};
use pm_mindmap::storage::{AcceptanceTest, DataStore, MergeRequest, StateSnapshot, Status, Story};
use pm_mindmap::validation::{MessageKind, Policy};
use pretty_assertions::assert_eq;

fn story(id: &str, parent: Option<&str>) -> Story {
    let mut s = Story::new(
        id,
        "MR-1",
        format!("Story {id}"),
        "As a tester",
        "I want X",
        "So that Y",
    );
    s.parent_id = parent.map(str::to_string);
    s
}

fn state_with(stories: Vec<Story>) -> AppState {
    let store = DataStore::with_snapshot(StateSnapshot {
        merge_requests: vec![MergeRequest::new("MR-1", "Planner", "org/app", "main")],
        stories,
        tests: vec![],
    });
    AppState::new(Config::default(), Arc::new(store))
}

fn warn() -> RequestContext {
    RequestContext::new(Policy::Warn)
}

fn block() -> RequestContext {
    RequestContext::new(Policy::Block)
}

mod validation_policy {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_well_formed_story_has_no_invest_errors() {
        let state = state_with(vec![]);
        let response = state.stories.create(&warn(), story("S1", None)).unwrap();
        assert!(response
            .validation
            .errors
            .iter()
            .all(|m| m.kind != MessageKind::Invest));
    }

    #[test]
    fn test_bad_role_blocked_under_block() {
        let state = state_with(vec![]);
        let mut bad = story("S1", None);
        bad.role = "Tester".to_string();

        let err = state.stories.create(&block(), bad).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
        match err {
            AppError::Validation { details, .. } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field.as_deref(), Some("role"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(state.stories.list().is_empty());
    }

    #[test]
    fn test_bad_role_reported_under_warn() {
        let state = state_with(vec![]);
        let mut bad = story("S1", None);
        bad.role = "Tester".to_string();

        let response = state.stories.create(&warn(), bad).unwrap();
        assert_eq!(response.validation.errors.len(), 1);
        assert_eq!(response.validation.errors[0].kind, MessageKind::Invest);
        assert_eq!(state.stories.list().len(), 1);
    }

    #[test]
    fn test_story_response_includes_test_findings() {
        let state = state_with(vec![story("S1", None)]);
        state
            .tests
            .create(
                &warn(),
                AcceptanceTest::new("AT-1", "S1", "", "they act", "it works"),
            )
            .unwrap();

        let response = state.stories.get(&warn(), "S1").unwrap();
        assert_eq!(response.validation.errors.len(), 1);
        assert_eq!(response.validation.errors[0].kind, MessageKind::Gwt);
        assert_eq!(response.validation.errors[0].field.as_deref(), Some("AT-1"));
    }

    #[test]
    fn test_blocked_update_leaves_story_unchanged() {
        let state = state_with(vec![story("S1", None)]);
        let update = StoryUpdate {
            goal: Some("Maybe later".to_string()),
            ..Default::default()
        };
        assert!(state.stories.update(&block(), "S1", update).is_err());
        assert_eq!(state.stories.get(&warn(), "S1").unwrap().data.goal, "I want X");
    }
}

mod hierarchy_rules {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chain() -> Vec<Story> {
        vec![
            story("S1", None),
            story("S2", Some("S1")),
            story("S3", Some("S2")),
            story("S4", Some("S3")),
        ]
    }

    #[test]
    fn test_move_under_own_descendant_rejected() {
        let state = state_with(chain());
        let before = state.store.snapshot();

        let err = state
            .stories
            .move_story(
                &warn(),
                "S2",
                MoveStoryRequest {
                    parent_id: Some("S3".to_string()),
                    index: 0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::Cycle { .. })));
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(state.store.snapshot(), before);
    }

    #[test]
    fn test_create_at_depth_five_rejected() {
        let state = state_with(chain());

        let err = state
            .stories
            .create(&warn(), story("S5", Some("S4")))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DepthLimit);
        assert_eq!(state.stories.list().len(), 4);
    }

    #[test]
    fn test_update_reparent_at_depth_five_rejected() {
        let mut stories = chain();
        stories.push(story("S5", None));
        let state = state_with(stories);
        let before = state.store.snapshot();

        let update = StoryUpdate {
            parent_id: Some(Some("S4".to_string())),
            ..Default::default()
        };
        let err = state.stories.update(&warn(), "S5", update).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DepthLimit);
        assert_eq!(state.store.snapshot(), before);
    }

    #[test]
    fn test_reorder_cannot_pull_subtree_past_depth_limit() {
        let mut stories = chain();
        stories.push(story("R", None));
        stories.push(story("R1", Some("R")));
        stories.push(story("R2", Some("R1")));
        let state = state_with(stories);
        let before = state.store.snapshot();

        let err = state
            .stories
            .reorder(
                "R2",
                ReorderStoryRequest {
                    order: vec!["S1".to_string()],
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::DepthLimit { depth: 6, limit: 4 }));
        assert_eq!(state.store.snapshot(), before);
        assert_eq!(state.stories.path("S4").unwrap().len(), 3);
    }

    #[test]
    fn test_depth_limit_from_config() {
        let mut config = Config::default();
        config.hierarchy.depth_limit = 2;
        let store = Arc::new(DataStore::with_snapshot(StateSnapshot {
            stories: vec![story("S1", None), story("S2", Some("S1"))],
            ..Default::default()
        }));
        let state = AppState::new(config, store);

        let err = state
            .stories
            .create(&warn(), story("S3", Some("S2")))
            .unwrap_err();
        assert!(matches!(err, AppError::DepthLimit { depth: 3, limit: 2 }));
    }

    #[test]
    fn test_move_then_tree_reflects_new_order() {
        let state = state_with(vec![
            story("S1", None),
            story("A", Some("S1")).with_order(0),
            story("B", Some("S1")).with_order(1),
            story("R2", None).with_order(1),
        ]);

        state
            .stories
            .move_story(
                &warn(),
                "R2",
                MoveStoryRequest {
                    parent_id: Some("S1".to_string()),
                    index: 0,
                },
            )
            .unwrap();

        let forest = state.stories.tree("MR-1", None);
        assert_eq!(forest.len(), 1);
        let children: Vec<_> = forest[0]
            .children
            .iter()
            .map(|c| (c.story.id.as_str(), c.story.order))
            .collect();
        assert_eq!(children, vec![("R2", 0), ("A", 1), ("B", 2)]);
        assert_eq!(forest[0].rollup.total, 4);
    }

    #[test]
    fn test_rollup_counts_done_and_blocked() {
        let state = state_with(vec![
            story("S1", None),
            story("S2", Some("S1")).with_status(Status::Done),
            story("S3", Some("S1")).with_status(Status::Blocked),
        ]);

        let forest = state.stories.tree("MR-1", None);
        assert_eq!(forest[0].rollup.total, 3);
        assert_eq!(forest[0].rollup.done, 1);
        assert_eq!(forest[0].rollup.blocked, 1);
    }

    // Deleting a story does not cascade: its children keep a dangling
    // parent id and disappear from the tree while remaining in the store.
    #[test]
    fn test_delete_leaves_orphans() {
        let state = state_with(chain());
        state.stories.delete("S2").unwrap();

        assert_eq!(state.stories.list().len(), 3);
        let orphan = state.stories.get(&warn(), "S3").unwrap().data;
        assert_eq!(orphan.parent_id.as_deref(), Some("S2"));

        let forest = state.stories.tree("MR-1", None);
        assert_eq!(forest[0].rollup.total, 1);
        assert_eq!(state.stories.path("S4").unwrap().len(), 1);
    }
}

mod merge_requests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_branch_toggles_drift() {
        let state = state_with(vec![]);
        let first = state.merge_requests.update_branch("MR-1").unwrap();
        assert!(first.data.drift);
        let second = state.merge_requests.update_branch("MR-1").unwrap();
        assert!(!second.data.drift);
    }

    #[test]
    fn test_deleting_merge_request_keeps_stories() {
        let state = state_with(vec![story("S1", None)]);
        state.merge_requests.delete("MR-1").unwrap();
        assert_eq!(state.stories.list().len(), 1);
        assert_eq!(
            state.merge_requests.get("MR-1").unwrap_err().code(),
            ErrorCode::NotFound
        );
    }
}

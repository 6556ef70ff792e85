use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::SharedState;
use crate::error::{AppResult, ProtocolError};
use crate::service::{
    AcceptanceTestUpdate, MergeRequestCreate, MergeRequestUpdate, MoveStoryRequest,
    ReorderStoryRequest, RequestContext, StatusPatch, StoryUpdate,
};
use crate::storage::{AcceptanceTest, Story};

/// Every method the router understands.
pub const METHODS: &[&str] = &[
    "story.create",
    "story.update",
    "story.delete",
    "story.move",
    "story.reorder",
    "story.tree",
    "story.path",
    "story.children",
    "story.get",
    "story.list",
    "story.status",
    "test.create",
    "test.get",
    "test.update",
    "test.delete",
    "test.list",
    "merge_request.create",
    "merge_request.get",
    "merge_request.update",
    "merge_request.delete",
    "merge_request.list",
    "merge_request.status",
    "merge_request.update_branch",
    "state.get",
    "state.reset",
    "health",
    "ping",
];

/// Methods whose responses depend on the validation policy. Only these
/// read the policy header or parameter.
pub const VALIDATED_METHODS: &[&str] = &[
    "story.create",
    "story.update",
    "story.move",
    "story.get",
    "story.status",
    "test.create",
    "test.get",
    "test.update",
];

#[derive(Debug, Deserialize)]
struct IdParams {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WithId<T> {
    id: String,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeParams {
    #[serde(alias = "merge_request_id")]
    merge_request_id: String,
    #[serde(default)]
    depth: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryListParams {
    #[serde(default, alias = "merge_request_id")]
    merge_request_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestListParams {
    #[serde(default, alias = "story_id")]
    story_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    stories: usize,
}

/// Route a method call to its handler.
pub fn handle_method(
    state: &SharedState,
    ctx: &RequestContext,
    method: &str,
    params: Option<Value>,
) -> AppResult<Value> {
    debug!(request_id = %ctx.request_id, method, "Routing method call");

    match method {
        "story.create" => execute_handler(method, params, |story: Story| {
            state.stories.create(ctx, story)
        }),
        "story.update" => execute_handler(method, params, |p: WithId<StoryUpdate>| {
            state.stories.update(ctx, &p.id, p.body)
        }),
        "story.delete" => execute_handler(method, params, |p: IdParams| {
            state.stories.delete(&p.id)
        }),
        "story.move" => execute_handler(method, params, |p: WithId<MoveStoryRequest>| {
            state.stories.move_story(ctx, &p.id, p.body)
        }),
        "story.reorder" => execute_handler(method, params, |p: WithId<ReorderStoryRequest>| {
            state.stories.reorder(&p.id, p.body)
        }),
        "story.tree" => execute_handler(method, params, |p: TreeParams| {
            Ok(state.stories.tree(&p.merge_request_id, p.depth))
        }),
        "story.path" => execute_handler(method, params, |p: IdParams| state.stories.path(&p.id)),
        "story.children" => execute_handler(method, params, |p: IdParams| {
            state.stories.children(&p.id)
        }),
        "story.get" => execute_handler(method, params, |p: IdParams| {
            state.stories.get(ctx, &p.id)
        }),
        "story.list" => execute_handler(method, params, |p: StoryListParams| {
            Ok(match p.merge_request_id {
                Some(mr) => state.store.read().stories.list_by_merge_request(&mr),
                None => state.stories.list(),
            })
        }),
        "story.status" => execute_handler(method, params, |p: WithId<StatusPatch>| {
            state.stories.set_status(ctx, &p.id, p.body.status)
        }),

        "test.create" => execute_handler(method, params, |test: AcceptanceTest| {
            state.tests.create(ctx, test)
        }),
        "test.get" => execute_handler(method, params, |p: IdParams| state.tests.get(ctx, &p.id)),
        "test.update" => execute_handler(method, params, |p: WithId<AcceptanceTestUpdate>| {
            state.tests.update(ctx, &p.id, p.body)
        }),
        "test.delete" => execute_handler(method, params, |p: IdParams| state.tests.delete(&p.id)),
        "test.list" => execute_handler(method, params, |p: TestListParams| {
            Ok(state.tests.list(p.story_id.as_deref()))
        }),

        "merge_request.create" => execute_handler(method, params, |p: MergeRequestCreate| {
            state.merge_requests.create(p)
        }),
        "merge_request.get" => execute_handler(method, params, |p: IdParams| {
            state.merge_requests.get(&p.id)
        }),
        "merge_request.update" => {
            execute_handler(method, params, |p: WithId<MergeRequestUpdate>| {
                state.merge_requests.update(&p.id, p.body)
            })
        }
        "merge_request.delete" => execute_handler(method, params, |p: IdParams| {
            state.merge_requests.delete(&p.id)
        }),
        "merge_request.list" => {
            execute_handler(method, params, |_: Value| Ok(state.merge_requests.list()))
        }
        "merge_request.status" => execute_handler(method, params, |p: WithId<StatusPatch>| {
            state.merge_requests.set_status(&p.id, p.body.status)
        }),
        "merge_request.update_branch" => execute_handler(method, params, |p: IdParams| {
            state.merge_requests.update_branch(&p.id)
        }),

        "state.get" => execute_handler(method, params, |_: Value| Ok(state.store.snapshot())),
        "state.reset" => execute_handler(method, params, |_: Value| state.reset()),
        "health" => execute_handler(method, params, |_: Value| {
            Ok(HealthStatus {
                status: "ok",
                version: env!("CARGO_PKG_VERSION"),
                stories: state.store.read().stories.len(),
            })
        }),
        "ping" => Ok(Value::Object(Default::default())),

        _ => Err(ProtocolError::UnknownMethod {
            method: method.to_string(),
        }
        .into()),
    }
}

/// Deserialize method parameters; absent params read as an empty object.
fn parse_arguments<T: DeserializeOwned>(method: &str, arguments: Option<Value>) -> AppResult<T> {
    let arguments = match arguments {
        Some(Value::Null) | None => Value::Object(Default::default()),
        Some(args) => args,
    };
    serde_json::from_value(arguments).map_err(|e| {
        ProtocolError::InvalidParameters {
            method: method.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Parse params, run the operation and serialize its result.
fn execute_handler<P, R, F>(method: &str, arguments: Option<Value>, operation: F) -> AppResult<Value>
where
    P: DeserializeOwned,
    R: Serialize,
    F: FnOnce(P) -> AppResult<R>,
{
    let params: P = parse_arguments(method, arguments)?;
    let result = operation(params)?;
    serde_json::to_value(result).map_err(|e| ProtocolError::Json(e).into())
}

//! Command-line interface.
//!
//! `serve` runs the JSON-RPC server; `tree` and `check` work offline
//! against the loaded seed data.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::server::AppState;
use crate::storage::StoryTreeNode;
use crate::validation::{validate_acceptance_tests, validate_story, Policy};

/// Story hierarchy planner.
#[derive(Parser, Debug)]
#[command(name = "pm-mindmap", version, about)]
pub struct Cli {
    /// Seed file to load (overrides SEED_PATH)
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    /// Maximum story depth (overrides HIERARCHY_DEPTH_LIMIT)
    #[arg(long, global = true)]
    pub depth_limit: Option<String>,

    /// Subcommand; `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Serve JSON-RPC requests over stdio (default)
    Serve,

    /// Print the story tree of a merge request
    Tree {
        /// Merge request id
        merge_request: String,

        /// Maximum depth to print
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Validate every story and acceptance test
    Check {
        /// Policy to evaluate under: warn or block
        #[arg(long)]
        policy: Option<String>,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute an offline command. `serve` is handled by the binary.
pub fn execute_command(command: Commands, state: &AppState) -> CliResult {
    match command {
        Commands::Serve => CliResult::error("serve runs the server and has no offline output"),
        Commands::Tree {
            merge_request,
            depth,
        } => execute_tree(state, &merge_request, depth),
        Commands::Check { policy } => execute_check(state, policy.as_deref()),
    }
}

fn execute_tree(state: &AppState, merge_request: &str, depth: Option<usize>) -> CliResult {
    let forest = state.stories.tree(merge_request, depth);
    if forest.is_empty() {
        return CliResult::error(format!("No stories for merge request {}", merge_request));
    }

    let mut output = String::new();
    for node in &forest {
        render_node(node, 0, &mut output);
    }
    CliResult::success(output)
}

fn render_node(node: &StoryTreeNode, indent: usize, output: &mut String) {
    output.push_str(&format!(
        "{}{} [{}] {} ({}/{} done, {} blocked)\n",
        "  ".repeat(indent),
        node.story.id,
        node.story.status,
        node.story.title,
        node.rollup.done,
        node.rollup.total,
        node.rollup.blocked,
    ));
    for child in &node.children {
        render_node(child, indent + 1, output);
    }
}

fn execute_check(state: &AppState, policy: Option<&str>) -> CliResult {
    let policy = match Policy::resolve(policy, None, state.config.validation.default_policy) {
        Ok(p) => p,
        Err(e) => return CliResult::error(e.to_string()),
    };

    let guard = state.store.read();
    let mut output = String::new();
    let (mut warnings, mut errors, mut blocked) = (0, 0, 0);

    for story in guard.stories.list() {
        let mut result = validate_story(&story, policy);
        let tests = guard.tests.list_by_story(&story.id);
        let tests_result = validate_acceptance_tests(&tests, policy);
        result.validation.extend(tests_result.validation);
        let is_blocked = result.blocked || tests_result.blocked;

        warnings += result.validation.warnings.len();
        errors += result.validation.errors.len();
        if is_blocked {
            blocked += 1;
        }

        for message in &result.validation.errors {
            output.push_str(&format!(
                "error   {} {}: {}\n",
                story.id,
                message.field.as_deref().unwrap_or("-"),
                message.message
            ));
        }
        for message in &result.validation.warnings {
            output.push_str(&format!(
                "warning {} {}: {}\n",
                story.id,
                message.field.as_deref().unwrap_or("-"),
                message.message
            ));
        }
    }

    output.push_str(&format!(
        "\n{} stories checked under '{}': {} errors, {} warnings, {} blocked\n",
        guard.stories.len(),
        policy,
        errors,
        warnings,
        blocked
    ));

    if blocked > 0 {
        CliResult::error(output)
    } else {
        CliResult::success(output)
    }
}

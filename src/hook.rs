//! Hook protocol plumbing: stdin document, event dispatch, approval
//! documents.
//!
//! Two outcomes exist at this boundary: print an approval document, or
//! print nothing. Malformed input, the wrong tool, a missing command, and
//! any internal failure all take the silent path; the host then shows its
//! normal permission prompt.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Deserialize;

use crate::config::Config;
use crate::eval;
use crate::fragment::Verdict;
use crate::logging::debug;

const BASH_TOOL: &str = "Bash";
const PRE_TOOL_USE: &str = "PreToolUse";
const PERMISSION_REQUEST: &str = "PermissionRequest";

#[derive(Deserialize)]
struct HookInput {
    #[serde(default)]
    hook_event_name: Option<String>,
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    tool_input: Option<ToolInput>,
}

#[derive(Deserialize)]
struct ToolInput {
    #[serde(default)]
    command: Option<String>,
}

/// Process one hook invocation with freshly discovered settings.
pub fn process(stdin_json: &str) -> Option<String> {
    process_with_config(stdin_json, &Config::load())
}

/// Process one hook invocation against an explicit configuration.
/// Returns the approval document, or `None` to stay silent.
pub fn process_with_config(stdin_json: &str, config: &Config) -> Option<String> {
    let input: HookInput = match serde_json::from_str(stdin_json) {
        Ok(input) => input,
        Err(_) => {
            debug(1, "malformed hook input JSON");
            return None;
        }
    };

    if input.tool_name.as_deref() != Some(BASH_TOOL) {
        debug(2, "not a Bash tool call, skipping");
        return None;
    }

    let command = input.tool_input.and_then(|t| t.command).unwrap_or_default();
    if command.trim().is_empty() {
        debug(2, "empty command, skipping");
        return None;
    }

    // Fail-open barrier: a bug anywhere below must surface as silence,
    // never as a crash the host could misread.
    let verdict = catch_unwind(AssertUnwindSafe(|| eval::evaluate_command(&command, config)))
        .unwrap_or(Verdict::Fallthrough);

    if verdict != Verdict::Approve {
        debug(1, &format!("FALLTHROUGH: {command}"));
        return None;
    }
    debug(1, &format!("APPROVED: {command}"));

    match input.hook_event_name.as_deref() {
        Some(PRE_TOOL_USE) => Some(pretooluse_approval(&command)),
        Some(PERMISSION_REQUEST) => Some(permission_request_approval()),
        // Approved under an event we don't know: stay silent.
        _ => None,
    }
}

/// Approval document for the PreToolUse event.
pub fn pretooluse_approval(command: &str) -> String {
    serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": PRE_TOOL_USE,
            "permissionDecision": "allow",
            "permissionDecisionReason": format!("Read-only command: {command}"),
        }
    })
    .to_string()
}

/// Approval document for the PermissionRequest event.
pub fn permission_request_approval() -> String {
    serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": PERMISSION_REQUEST,
            "decision": {
                "behavior": "allow",
            }
        }
    })
    .to_string()
}

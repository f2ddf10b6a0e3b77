//! readonly-bash-hook: a Claude Code hook that auto-approves read-only
//! Bash commands.
//!
//! Commands are parsed with tree-sitter-bash and decomposed into
//! [`fragment::CommandFragment`]s, one per executable invocation on any
//! reachable path: pipeline stages, `&&`/`||`/`;` branches, loop and
//! conditional bodies, function bodies, `$(…)` substitutions, and `<(…)`
//! / `>(…)` process substitutions. Each fragment runs through a fixed
//! seven-step pipeline; only when every fragment approves does the hook
//! print an approval document. Everything else (mutating commands,
//! interpreters, parse failures, unknown syntax) produces no output, so
//! the host falls back to its normal interactive prompt. The hook never
//! denies.
//!
//! # Architecture
//!
//! - **[`fragment`]** — the `CommandFragment` model and decision types
//!   shared by parser and evaluator.
//! - **[`parse`]** — pre-parse rewrites and the tree-sitter-bash walker.
//! - **[`handlers`]** — dangerous-mode pre-filters for `sed`, `find`,
//!   `xargs`, and (feature-gated) `awk`.
//! - **[`eval`]** — the seven-step pipeline and the orchestrator.
//! - **[`config`]** — built-in command sets plus settings.json overrides.
//! - **[`hook`]** — the stdin/stdout protocol and approval documents.
//! - **[`logging`]** — `READONLY_HOOK_DEBUG`-gated side-channel log.

pub mod config;
pub mod eval;
pub mod fragment;
pub mod handlers;
pub mod hook;
pub mod logging;
pub mod parse;

use fragment::Verdict;

/// Evaluate a command string against the built-in default configuration.
///
/// The main entry point for tests and library use; the hook binary builds
/// its configuration from settings.json instead.
pub fn evaluate(command: &str) -> Verdict {
    let config = config::Config::default_config();
    eval::evaluate_command(command, &config)
}

//! Shell command parsing: pre-parse rewrites and the tree-sitter-bash
//! AST walker that extracts [`CommandFragment`]s.
//!
//! [`CommandFragment`]: crate::fragment::CommandFragment

/// Textual rewrites applied before the AST library.
pub mod preparse;
/// tree-sitter-bash AST walker and fragment extraction.
pub mod shell;

pub use preparse::{preparse, strip_time_keyword};
pub use shell::parse_command;

use thiserror::Error;

/// Why a command string could not be decomposed into fragments.
///
/// Every variant maps to the same outcome at the orchestrator: no
/// approval, no output, defer to the interactive prompt.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The Bash grammar failed to load (library/version mismatch).
    #[error("failed to load bash grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// The input did not parse as shell syntax.
    #[error("shell input failed to parse")]
    Syntax,

    /// The input parsed, but contains a construct the walker does not
    /// recognize (e.g. `case`).
    #[error("unsupported shell construct: {0}")]
    Unsupported(&'static str),
}

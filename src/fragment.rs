//! The command fragment model and decision types.
//!
//! This is the narrow waist between the parser and the evaluator: the parser
//! produces [`CommandFragment`]s, the evaluator consumes them, and neither
//! side knows anything else about the other.

/// A single fully-resolved command invocation extracted from a shell AST.
///
/// One fragment is produced per executable invocation, including invocations
/// nested inside substitutions, subshells, loops, conditionals, and function
/// bodies. Created once by the parser and treated as immutable afterwards;
/// the evaluation pipeline clones it before normalizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFragment {
    /// The command word as written (`ls`, `/usr/bin/ls`, `$CMD`).
    /// Basename resolution and wrapper unwrapping happen in the evaluator.
    pub executable: String,
    /// Remaining tokens, in order.
    pub args: Vec<String>,
    /// True if this invocation owns a file-writing redirection
    /// (`>`, `>>`, `>|`, file-target `>&`) or encloses an output process
    /// substitution `>(…)`. fd duplication like `2>&1` does not count.
    pub has_output_redirect: bool,
}

impl CommandFragment {
    pub fn new(executable: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
            has_output_redirect: false,
        }
    }
}

/// The whole-command decision.
///
/// There is no deny: anything that is not approved yields the decision back
/// to the interactive permission prompt by producing no output at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Emit the approval document.
    Approve,
    /// Emit nothing; the host prompts the user.
    Fallthrough,
}

impl Verdict {
    /// Uppercase label for debug-log lines.
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Approve => "APPROVE",
            Verdict::Fallthrough => "FALLTHROUGH",
        }
    }
}

/// Outcome of one pipeline step for one fragment.
///
/// `Approve` and `Reject` short-circuit the pipeline; `Next` hands the
/// fragment to the following step. Kept distinct from [`Verdict`] because a
/// step that merely has no opinion must not look like an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Approve,
    Reject,
    Next,
}

/// Outcome of a dangerous-mode handler.
///
/// `Pass` means the handler found nothing wrong and later steps still apply
/// (the command must still be whitelisted); it is deliberately not an
/// approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResult {
    Pass,
    Reject,
}

//! Dangerous-mode pre-filters.
//!
//! These commands sit on the whitelist, but some of their invocation modes
//! write. Each handler inspects a fragment's arguments and either rejects
//! the fragment or passes it on to the remaining pipeline steps. `find` and
//! `xargs` carry whole inner commands, so their handlers classify the inner
//! invocation through the [`Evaluator`] capability.

/// Best-effort awk program screening (feature-gated).
pub mod awk;
/// `find` action screening and `-exec` recursion.
pub mod find;
/// `sed` in-place detection.
pub mod sed;
/// `xargs` flag stripping and inner-command recursion.
pub mod xargs;

pub use awk::handle_awk;
pub use find::handle_find;
pub use sed::handle_sed;
pub use xargs::handle_xargs;

use crate::config::Config;
use crate::fragment::{CommandFragment, HandlerResult, StepResult};

/// Capability to classify an inner command through the full pipeline.
///
/// Handlers that recurse (`find -exec`, `xargs`) depend on this trait
/// rather than on the pipeline type, which keeps the handler → evaluator →
/// handler cycle behind one seam. The pipeline implements it.
pub trait Evaluator {
    fn evaluate_fragment(&self, fragment: &CommandFragment) -> StepResult;
}

/// A dangerous-mode handler: inspects a fragment's arguments under the
/// effective configuration and either rejects or passes.
pub type HandlerFn = fn(&[String], &Config, &dyn Evaluator) -> HandlerResult;

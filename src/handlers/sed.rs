use super::Evaluator;
use crate::config::Config;
use crate::fragment::HandlerResult;
use crate::logging::debug;

/// Reject sed when any form of in-place editing is requested.
///
/// `-i` may hide inside a combined short flag (`-iE`, `-ni`, `-Ei`), so any
/// short flag containing `i` rejects.
pub fn handle_sed(args: &[String], _config: &Config, _eval: &dyn Evaluator) -> HandlerResult {
    for arg in args {
        if arg == "-i" || arg == "--in-place" || arg.starts_with("--in-place=") {
            debug(1, &format!("REJECT: sed in-place flag: {arg}"));
            return HandlerResult::Reject;
        }
        if arg.starts_with('-') && !arg.starts_with("--") && arg.len() > 1 && arg[1..].contains('i')
        {
            debug(1, &format!("REJECT: sed combined flag with i: {arg}"));
            return HandlerResult::Reject;
        }
    }
    HandlerResult::Pass
}

use super::Evaluator;
use crate::config::Config;
use crate::fragment::{CommandFragment, HandlerResult, StepResult};
use crate::logging::debug;

/// Actions that write regardless of arguments.
const DESTRUCTIVE_ACTIONS: &[&str] = &["-delete", "-fprint", "-fprint0", "-fprintf"];

/// Actions that carry an inner command terminated by `;` or `+`.
const EXEC_ACTIONS: &[&str] = &["-exec", "-execdir", "-ok", "-okdir"];

/// Reject find when it deletes, writes files, or executes a non-approved
/// inner command. Every `-exec` block is classified independently through
/// the full pipeline and all of them must approve.
pub fn handle_find(args: &[String], _config: &Config, eval: &dyn Evaluator) -> HandlerResult {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();

        if DESTRUCTIVE_ACTIONS.contains(&arg) {
            debug(1, &format!("REJECT: find destructive action: {arg}"));
            return HandlerResult::Reject;
        }

        if EXEC_ACTIONS.contains(&arg) {
            let start = i + 1;
            let Some(terminator) = (start..args.len()).find(|&j| args[j] == ";" || args[j] == "+")
            else {
                debug(1, &format!("REJECT: find {arg} with no terminator"));
                return HandlerResult::Reject;
            };

            let inner: Vec<String> = args[start..terminator]
                .iter()
                .filter(|a| *a != "{}")
                .cloned()
                .collect();
            if inner.is_empty() {
                debug(1, &format!("REJECT: find {arg} with no inner command"));
                return HandlerResult::Reject;
            }

            let fragment = CommandFragment::new(inner[0].clone(), inner[1..].to_vec());
            if eval.evaluate_fragment(&fragment) != StepResult::Approve {
                debug(1, &format!("REJECT: find {arg} inner command: {}", inner[0]));
                return HandlerResult::Reject;
            }

            i = terminator + 1;
            continue;
        }

        i += 1;
    }
    HandlerResult::Pass
}

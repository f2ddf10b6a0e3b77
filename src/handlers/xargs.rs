use super::Evaluator;
use crate::config::Config;
use crate::fragment::{CommandFragment, HandlerResult, StepResult};
use crate::logging::debug;

/// Flags that consume the following token as their value.
const FLAGS_WITH_VALUE: &[&str] = &[
    "-d",
    "-a",
    "-I",
    "-L",
    "-n",
    "-P",
    "-s",
    "-E",
    "--max-args",
    "--max-procs",
    "--max-chars",
    "--delimiter",
    "--arg-file",
    "--replace",
    "--max-lines",
    "--eof",
];

/// Flags that stand alone.
const FLAGS_NO_VALUE: &[&str] = &[
    "-0",
    "-r",
    "-t",
    "-p",
    "-x",
    "--null",
    "--no-run-if-empty",
    "--verbose",
    "--interactive",
    "--exit",
    "--open-tty",
];

/// Strip xargs's own flags, then classify the inner command through the
/// full pipeline. With no inner command xargs defaults to `echo`, which is
/// approved.
pub fn handle_xargs(args: &[String], _config: &Config, eval: &dyn Evaluator) -> HandlerResult {
    let mut i = 0;
    let mut inner: &[String] = &[];
    while i < args.len() {
        let arg = args[i].as_str();

        if FLAGS_WITH_VALUE.contains(&arg) {
            i += 2;
            continue;
        }
        if FLAGS_NO_VALUE.contains(&arg) {
            i += 1;
            continue;
        }
        // --flag=value is a single token; do not consume a second one.
        if let Some((prefix, _)) = arg.split_once('=') {
            if FLAGS_WITH_VALUE.contains(&prefix) {
                i += 1;
                continue;
            }
        }
        // Combined short flags (-0r, -I{}): skip one token.
        if arg.starts_with('-') && !arg.starts_with("--") && arg.len() > 2 {
            i += 1;
            continue;
        }

        inner = &args[i..];
        break;
    }

    if inner.is_empty() {
        debug(2, "xargs with no inner command defaults to echo");
        return HandlerResult::Pass;
    }

    let fragment = CommandFragment::new(inner[0].clone(), inner[1..].to_vec());
    if eval.evaluate_fragment(&fragment) != StepResult::Approve {
        debug(1, &format!("REJECT: xargs inner command: {}", inner[0]));
        return HandlerResult::Reject;
    }
    HandlerResult::Pass
}

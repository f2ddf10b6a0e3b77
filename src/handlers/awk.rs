use super::Evaluator;
use crate::config::Config;
use crate::fragment::HandlerResult;
use crate::logging::debug;

/// Best-effort screening of an awk program. Only registered when
/// `awkSafeMode` is enabled; without it awk never approves at all.
///
/// Programs read from a file cannot be inspected, so `-f` rejects
/// outright. The inline program is scanned textually; anything that could
/// spawn a process or write a file rejects. Doubt resolves to reject.
pub fn handle_awk(args: &[String], _config: &Config, _eval: &dyn Evaluator) -> HandlerResult {
    let mut i = 0;
    let mut program: Option<&str> = None;

    while i < args.len() {
        let arg = args[i].as_str();

        if arg == "-f" {
            debug(1, "REJECT: awk program from file");
            return HandlerResult::Reject;
        }
        if arg == "-F" || arg == "-v" {
            i += 2;
            continue;
        }
        if arg.starts_with('-') && arg != "-" {
            i += 1;
            continue;
        }

        program = Some(arg);
        break;
    }

    let Some(program) = program else {
        return HandlerResult::Pass;
    };

    if program.contains("system(") {
        debug(1, "REJECT: awk program calls system()");
        return HandlerResult::Reject;
    }
    if program.contains('|') {
        debug(1, "REJECT: awk program contains a pipe");
        return HandlerResult::Reject;
    }
    if program.contains('>') {
        debug(1, "REJECT: awk program redirects output");
        return HandlerResult::Reject;
    }
    HandlerResult::Pass
}

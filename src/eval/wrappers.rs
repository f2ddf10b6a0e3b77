//! Wrapper-command unwrapping for the normalize step.
//!
//! `env`, `nice`, `time`, `command`, and `nohup` prefix another command;
//! each eats its own flags from the front of the argument list until the
//! real executable surfaces.

/// What a wrapper left behind after eating its flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unwrapped {
    /// The wrapped command: new executable plus remaining args.
    Next { executable: String, args: Vec<String> },
    /// Nothing left to run (`env FOO=bar`, `env -i`): a no-op.
    Exhausted,
    /// `command -v` / `command -V`: a lookup, not an execution.
    Lookup,
}

fn rest_from(args: &[String], i: usize) -> Unwrapped {
    match args.get(i) {
        Some(executable) => Unwrapped::Next {
            executable: executable.clone(),
            args: args.get(i + 1..).unwrap_or_default().to_vec(),
        },
        None => Unwrapped::Exhausted,
    }
}

/// Skip `VAR=val` tokens and env's flags.
pub fn unwrap_env(args: &[String]) -> Unwrapped {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "--" {
            i += 1;
            break;
        }
        if arg.contains('=') && !arg.starts_with('-') {
            i += 1; // VAR=val
            continue;
        }
        if arg == "-i" || arg == "--ignore-environment" {
            i += 1;
            continue;
        }
        if arg == "-u" || arg == "--unset" || arg == "-S" || arg == "--split-string" {
            i += 2; // flag plus value
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        break;
    }
    rest_from(args, i)
}

/// Skip nice's adjustment flags, including the attached `-n10` form.
pub fn unwrap_nice(args: &[String]) -> Unwrapped {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "--" {
            i += 1;
            break;
        }
        if arg == "-n" || arg == "--adjustment" {
            i += 2;
            continue;
        }
        if (arg.starts_with("-n") && arg.len() > 2) || arg.starts_with("--adjustment=") {
            i += 1;
            continue;
        }
        if arg.starts_with('-') && arg != "-" {
            i += 1;
            continue;
        }
        break;
    }
    rest_from(args, i)
}

/// Skip `/usr/bin/time` flags. The shell keyword form never reaches here;
/// it is stripped before parsing.
pub fn unwrap_time(args: &[String]) -> Unwrapped {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "--" {
            i += 1;
            break;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        break;
    }
    rest_from(args, i)
}

/// `command -v`/`-V` only looks a name up, so it short-circuits to
/// [`Unwrapped::Lookup`]; otherwise `-p` and `--` are stripped and the
/// wrapped command surfaces.
pub fn unwrap_command(args: &[String]) -> Unwrapped {
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-v" | "-V" => return Unwrapped::Lookup,
            "-p" => i += 1,
            "--" => {
                i += 1;
                break;
            }
            _ => break,
        }
    }
    rest_from(args, i)
}

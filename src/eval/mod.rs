//! The evaluation pipeline and the orchestrator.
//!
//! [`Pipeline::evaluate`] runs one fragment through a fixed sequence of
//! seven classification steps; `Approve`/`Reject` short-circuit, everything
//! else moves to the next step, and the final step rejects. The orchestrator
//! AND-reduces fragment results: every fragment must approve or the whole
//! command falls through.

/// Step-2 wrapper unwrapping.
pub mod wrappers;

use std::path::Path;

use crate::config::{Config, WRAPPER_COMMANDS};
use crate::fragment::{CommandFragment, HandlerResult, StepResult, Verdict};
use crate::handlers::Evaluator;
use crate::logging::debug;
use crate::parse;
use wrappers::Unwrapped;

/// Git global flags that consume the following token.
const GIT_FLAGS_WITH_VALUE: &[&str] = &["-C", "-c", "--git-dir", "--work-tree", "--namespace"];

/// Git global flags that stand alone.
const GIT_FLAGS_NO_VALUE: &[&str] = &["--no-pager", "--bare", "--no-replace-objects"];

/// The seven-step classifier for a single fragment.
pub struct Pipeline<'a> {
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Classify one fragment. Only `Approve` lets the orchestrator approve
    /// the whole command.
    pub fn evaluate(&self, fragment: &CommandFragment) -> StepResult {
        let mut fragment = fragment.clone();

        // Step 1: an owned output redirect disqualifies outright.
        if fragment.has_output_redirect {
            debug(1, &format!("REJECT: output redirect on {}", fragment.executable));
            return StepResult::Reject;
        }

        // Step 2: basename resolution and wrapper unwrapping. `command -v`
        // and wrappers with no wrapped command approve here.
        if let StepResult::Approve = self.normalize(&mut fragment) {
            return StepResult::Approve;
        }

        // Step 3: interpreters, escape hatches, privilege tools.
        if self.config.never_approve.contains(&fragment.executable) {
            debug(1, &format!("REJECT: never-approve: {}", fragment.executable));
            return StepResult::Reject;
        }

        // Step 4: dangerous-mode handlers. A pass is not an approval; the
        // fragment still has to clear the whitelist steps.
        if let Some(handler) = self.config.handlers.get(fragment.executable.as_str()) {
            if handler(&fragment.args, self.config, self) == HandlerResult::Reject {
                return StepResult::Reject;
            }
        }

        // Step 5: subcommand-gated executables (git and user-configured).
        match self.subcommands(&fragment) {
            StepResult::Next => {}
            decided => return decided,
        }

        // Step 6: the general whitelist.
        if self.config.whitelist.contains(&fragment.executable) {
            debug(1, &format!("APPROVE: whitelisted: {}", fragment.executable));
            return StepResult::Approve;
        }

        // Step 7: default.
        debug(1, &format!("REJECT: not whitelisted: {}", fragment.executable));
        StepResult::Reject
    }

    /// Resolve the executable to its basename and peel wrapper commands
    /// until the real executable surfaces. Returns `Approve` for the
    /// no-op cases, `Next` otherwise.
    fn normalize(&self, fragment: &mut CommandFragment) -> StepResult {
        fragment.executable = basename(&fragment.executable);

        while WRAPPER_COMMANDS.contains(&fragment.executable.as_str()) {
            let unwrapped = match fragment.executable.as_str() {
                "env" => wrappers::unwrap_env(&fragment.args),
                "nice" => wrappers::unwrap_nice(&fragment.args),
                "time" => wrappers::unwrap_time(&fragment.args),
                "command" => wrappers::unwrap_command(&fragment.args),
                "nohup" => {
                    if fragment.args.is_empty() {
                        // Bare nohup wraps nothing; later steps decide.
                        return StepResult::Next;
                    }
                    Unwrapped::Next {
                        executable: fragment.args[0].clone(),
                        args: fragment.args[1..].to_vec(),
                    }
                }
                _ => break,
            };

            match unwrapped {
                Unwrapped::Lookup => {
                    debug(1, "APPROVE: command -v/-V lookup");
                    return StepResult::Approve;
                }
                Unwrapped::Exhausted => {
                    debug(1, "APPROVE: wrapper with no inner command");
                    return StepResult::Approve;
                }
                Unwrapped::Next { executable, args } => {
                    fragment.executable = basename(&executable);
                    fragment.args = args;
                }
            }
        }
        StepResult::Next
    }

    /// Executables with a subcommand map entry approve only when the first
    /// non-flag argument is on their allowed list; git gets real global-flag
    /// parsing, everything else a flag-skipping heuristic.
    fn subcommands(&self, fragment: &CommandFragment) -> StepResult {
        let Some(allowed) = self.config.subcommand_whitelist.get(&fragment.executable) else {
            return StepResult::Next;
        };

        if fragment.executable == "git" {
            let (subcommand, remaining) = git_subcommand(&fragment.args);
            let Some(subcommand) = subcommand else {
                debug(1, "REJECT: bare git");
                return StepResult::Reject;
            };
            if !allowed.contains(subcommand) {
                debug(1, &format!("REJECT: git subcommand: {subcommand}"));
                return StepResult::Reject;
            }
            // `git config` is local-only: global or system scope escapes the
            // repository even with local writes enabled.
            if self.config.git_local_writes
                && subcommand == "config"
                && remaining.iter().any(|a| a == "--global" || a == "--system")
            {
                debug(1, "REJECT: git config with global/system scope");
                return StepResult::Reject;
            }
            debug(1, &format!("APPROVE: git subcommand: {subcommand}"));
            return StepResult::Approve;
        }

        let Some(subcommand) = fragment.args.iter().find(|a| !a.starts_with('-')) else {
            debug(1, &format!("REJECT: bare {}", fragment.executable));
            return StepResult::Reject;
        };
        if allowed.contains(subcommand.as_str()) {
            debug(
                1,
                &format!("APPROVE: {} subcommand: {subcommand}", fragment.executable),
            );
            StepResult::Approve
        } else {
            debug(
                1,
                &format!("REJECT: {} subcommand: {subcommand}", fragment.executable),
            );
            StepResult::Reject
        }
    }
}

impl Evaluator for Pipeline<'_> {
    fn evaluate_fragment(&self, fragment: &CommandFragment) -> StepResult {
        self.evaluate(fragment)
    }
}

/// Skip git's global flags; the first remaining non-flag token is the
/// subcommand. `--flag=value` forms are single tokens and skip as such.
fn git_subcommand(args: &[String]) -> (Option<&str>, &[String]) {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if GIT_FLAGS_WITH_VALUE.contains(&arg) {
            i += 2;
            continue;
        }
        if GIT_FLAGS_NO_VALUE.contains(&arg) {
            i += 1;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        return (Some(arg), args.get(i + 1..).unwrap_or_default());
    }
    (None, &[])
}

fn basename(executable: &str) -> String {
    Path::new(executable)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| executable.to_string())
}

/// Parse a command string and classify every extracted fragment. Any
/// failure to parse is a fall-through, never an error.
pub fn evaluate_command(cmd: &str, config: &Config) -> Verdict {
    match parse::parse_command(cmd) {
        Ok(fragments) => evaluate_fragments(&fragments, config),
        Err(err) => {
            debug(1, &format!("FALLTHROUGH: {err}"));
            Verdict::Fallthrough
        }
    }
}

/// AND-reduce fragment results. No fragments (empty input, comments, pure
/// assignments) is a no-op and approves.
pub fn evaluate_fragments(fragments: &[CommandFragment], config: &Config) -> Verdict {
    if fragments.is_empty() {
        debug(1, "APPROVE: no command content");
        return Verdict::Approve;
    }

    let pipeline = Pipeline::new(config);
    for fragment in fragments {
        if pipeline.evaluate(fragment) != StepResult::Approve {
            debug(1, &format!("FALLTHROUGH: fragment rejected: {}", fragment.executable));
            return Verdict::Fallthrough;
        }
    }
    debug(1, "APPROVE: all fragments approved");
    Verdict::Approve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overlay;
    use pretty_assertions::assert_eq;

    fn frag(executable: &str, args: &[&str]) -> CommandFragment {
        CommandFragment::new(executable, args.iter().map(|s| s.to_string()).collect())
    }

    fn run(fragment: &CommandFragment) -> StepResult {
        let config = Config::default_config();
        Pipeline::new(&config).evaluate(fragment)
    }

    fn run_with(fragment: &CommandFragment, overlay: Overlay) -> StepResult {
        let config = Config::with_overlay(overlay);
        Pipeline::new(&config).evaluate(fragment)
    }

    // ── Step 1: redirections ──

    #[test]
    fn output_redirect_rejects() {
        let mut fragment = frag("ls", &["-la"]);
        fragment.has_output_redirect = true;
        assert_eq!(run(&fragment), StepResult::Reject);
    }

    // ── Step 2: normalize ──

    #[test]
    fn path_resolves_to_basename() {
        assert_eq!(run(&frag("/usr/bin/ls", &["-la"])), StepResult::Approve);
        assert_eq!(run(&frag("/bin/cat", &["f"])), StepResult::Approve);
    }

    #[test]
    fn env_unwraps_to_inner_command() {
        assert_eq!(run(&frag("env", &["FOO=bar", "ls"])), StepResult::Approve);
        assert_eq!(run(&frag("env", &["FOO=bar", "rm", "-rf"])), StepResult::Reject);
    }

    #[test]
    fn bare_env_approves() {
        assert_eq!(run(&frag("env", &[])), StepResult::Approve);
        assert_eq!(run(&frag("env", &["FOO=bar"])), StepResult::Approve);
        assert_eq!(run(&frag("env", &["-i"])), StepResult::Approve);
    }

    #[test]
    fn command_lookup_approves() {
        assert_eq!(run(&frag("command", &["-v", "git"])), StepResult::Approve);
        assert_eq!(run(&frag("command", &["-V", "rm"])), StepResult::Approve);
    }

    #[test]
    fn command_executes_wrapped() {
        assert_eq!(run(&frag("command", &["ls", "-la"])), StepResult::Approve);
        assert_eq!(run(&frag("command", &["rm", "-rf"])), StepResult::Reject);
    }

    #[test]
    fn nice_and_time_unwrap() {
        assert_eq!(run(&frag("nice", &["-n", "10", "ls"])), StepResult::Approve);
        assert_eq!(run(&frag("nice", &["-n10", "rm"])), StepResult::Reject);
        assert_eq!(run(&frag("/usr/bin/time", &["ls"])), StepResult::Approve);
    }

    #[test]
    fn nohup_unwraps() {
        assert_eq!(run(&frag("nohup", &["cat", "f"])), StepResult::Approve);
        assert_eq!(run(&frag("nohup", &["rm", "f"])), StepResult::Reject);
    }

    #[test]
    fn bare_nohup_falls_through() {
        assert_eq!(run(&frag("nohup", &[])), StepResult::Reject);
    }

    #[test]
    fn wrapper_chain_unwraps_fully() {
        assert_eq!(
            run(&frag("nice", &["-n", "5", "env", "FOO=1", "/bin/cat", "f"])),
            StepResult::Approve
        );
    }

    #[test]
    fn wrapped_interpreter_still_rejected() {
        assert_eq!(run(&frag("env", &["bash", "-c", "ls"])), StepResult::Reject);
        assert_eq!(run(&frag("nohup", &["python3", "x.py"])), StepResult::Reject);
    }

    // ── Step 3: never-approve ──

    #[test]
    fn interpreters_rejected() {
        for exe in ["bash", "sh", "zsh", "python", "python3", "perl", "node"] {
            assert_eq!(run(&frag(exe, &["-c", "ls"])), StepResult::Reject, "{exe}");
        }
    }

    #[test]
    fn escape_hatches_rejected() {
        for exe in ["eval", "exec", "source", ".", "sudo", "su", "parallel"] {
            assert_eq!(run(&frag(exe, &["ls"])), StepResult::Reject, "{exe}");
        }
    }

    #[test]
    fn path_to_interpreter_rejected() {
        assert_eq!(run(&frag("/usr/bin/python3", &["x.py"])), StepResult::Reject);
    }

    #[test]
    fn awk_rejected_by_default() {
        assert_eq!(run(&frag("awk", &["{print $1}"])), StepResult::Reject);
        assert_eq!(run(&frag("gawk", &["{print $1}"])), StepResult::Reject);
    }

    #[test]
    fn awk_safe_mode_screens_program() {
        let overlay = Overlay {
            awk_safe_mode: true,
            ..Overlay::default()
        };
        assert_eq!(
            run_with(&frag("awk", &["{print $1}", "f"]), overlay.clone()),
            StepResult::Approve
        );
        assert_eq!(
            run_with(&frag("awk", &["{system(\"id\")}"]), overlay),
            StepResult::Reject
        );
    }

    // ── Step 4: handlers wired into the pipeline ──

    #[test]
    fn sed_in_place_rejected() {
        assert_eq!(run(&frag("sed", &["-i", "s/a/b/", "f"])), StepResult::Reject);
        assert_eq!(run(&frag("sed", &["s/a/b/", "f"])), StepResult::Approve);
    }

    #[test]
    fn find_exec_recurses() {
        assert_eq!(
            run(&frag("find", &[".", "-exec", "grep", "x", "{}", ";"])),
            StepResult::Approve
        );
        assert_eq!(
            run(&frag("find", &[".", "-exec", "rm", "{}", ";"])),
            StepResult::Reject
        );
    }

    #[test]
    fn xargs_recurses() {
        assert_eq!(run(&frag("xargs", &["wc", "-l"])), StepResult::Approve);
        assert_eq!(run(&frag("xargs", &["rm"])), StepResult::Reject);
    }

    // ── Step 5: subcommands ──

    #[test]
    fn git_read_only_approves() {
        for sub in ["status", "log", "diff", "show", "blame", "rev-parse"] {
            assert_eq!(run(&frag("git", &[sub])), StepResult::Approve, "git {sub}");
        }
    }

    #[test]
    fn git_writes_rejected() {
        for sub in ["push", "commit", "reset", "checkout", "clean"] {
            assert_eq!(run(&frag("git", &[sub])), StepResult::Reject, "git {sub}");
        }
    }

    #[test]
    fn git_global_flags_skipped() {
        assert_eq!(run(&frag("git", &["-C", "/repo", "status"])), StepResult::Approve);
        assert_eq!(run(&frag("git", &["--no-pager", "log"])), StepResult::Approve);
        assert_eq!(run(&frag("git", &["--git-dir=/x/.git", "log"])), StepResult::Approve);
        assert_eq!(run(&frag("git", &["-C", "/repo", "push"])), StepResult::Reject);
    }

    #[test]
    fn bare_git_rejected() {
        assert_eq!(run(&frag("git", &[])), StepResult::Reject);
        assert_eq!(run(&frag("git", &["--no-pager"])), StepResult::Reject);
    }

    #[test]
    fn git_local_writes_extends_set() {
        let overlay = Overlay {
            git_local_writes: true,
            ..Overlay::default()
        };
        assert_eq!(
            run_with(&frag("git", &["add", "."]), overlay.clone()),
            StepResult::Approve
        );
        assert_eq!(
            run_with(&frag("git", &["stash"]), overlay.clone()),
            StepResult::Approve
        );
        assert_eq!(run(&frag("git", &["add", "."])), StepResult::Reject);
        assert_eq!(
            run_with(&frag("git", &["push"]), overlay),
            StepResult::Reject
        );
    }

    #[test]
    fn git_config_scope_guard() {
        let overlay = Overlay {
            git_local_writes: true,
            ..Overlay::default()
        };
        assert_eq!(
            run_with(&frag("git", &["config", "user.name", "foo"]), overlay.clone()),
            StepResult::Approve
        );
        assert_eq!(
            run_with(
                &frag("git", &["config", "--global", "user.name", "foo"]),
                overlay.clone()
            ),
            StepResult::Reject
        );
        assert_eq!(
            run_with(&frag("git", &["config", "--system", "core.editor", "vi"]), overlay),
            StepResult::Reject
        );
        assert_eq!(
            run(&frag("git", &["config", "user.name", "foo"])),
            StepResult::Reject
        );
    }

    #[test]
    fn user_subcommand_whitelist() {
        let overlay = Overlay {
            subcommand_whitelist: [("docker".to_string(), vec!["ps".to_string(), "images".to_string()])]
                .into_iter()
                .collect(),
            ..Overlay::default()
        };
        assert_eq!(
            run_with(&frag("docker", &["ps", "-a"]), overlay.clone()),
            StepResult::Approve
        );
        assert_eq!(
            run_with(&frag("docker", &["rm", "ctr"]), overlay.clone()),
            StepResult::Reject
        );
        assert_eq!(run_with(&frag("docker", &[]), overlay), StepResult::Reject);
    }

    // ── Steps 6 and 7: whitelist and default ──

    #[test]
    fn whitelisted_commands_approve() {
        for exe in ["ls", "cat", "grep", "rg", "jq", "wc", "echo", "["] {
            assert_eq!(run(&frag(exe, &[])), StepResult::Approve, "{exe}");
        }
    }

    #[test]
    fn unknown_commands_reject() {
        for exe in ["rm", "mv", "cp", "curl", "make", "unknown-tool"] {
            assert_eq!(run(&frag(exe, &[])), StepResult::Reject, "{exe}");
        }
    }

    #[test]
    fn extra_and_removed_commands() {
        let overlay = Overlay {
            extra_commands: vec!["my-tool".to_string()],
            remove_commands: vec!["cat".to_string()],
            ..Overlay::default()
        };
        assert_eq!(run_with(&frag("my-tool", &[]), overlay.clone()), StepResult::Approve);
        assert_eq!(run_with(&frag("cat", &["f"]), overlay), StepResult::Reject);
    }

    // ── Orchestrator ──

    #[test]
    fn all_fragments_must_approve() {
        let config = Config::default_config();
        let ok = [frag("ls", &[]), frag("cat", &["f"])];
        assert_eq!(evaluate_fragments(&ok, &config), Verdict::Approve);
        let mixed = [frag("ls", &[]), frag("rm", &["f"])];
        assert_eq!(evaluate_fragments(&mixed, &config), Verdict::Fallthrough);
    }

    #[test]
    fn no_fragments_approve() {
        let config = Config::default_config();
        assert_eq!(evaluate_fragments(&[], &config), Verdict::Approve);
    }

    #[test]
    fn unparseable_command_falls_through() {
        let config = Config::default_config();
        assert_eq!(
            evaluate_command("ls \"unclosed", &config),
            Verdict::Fallthrough
        );
        assert_eq!(
            evaluate_command("case $x in a) ls;; esac", &config),
            Verdict::Fallthrough
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let config = Config::default_config();
        for cmd in ["ls -la", "rm -rf /", "git status", "echo $(rm x)"] {
            let first = evaluate_command(cmd, &config);
            let second = evaluate_command(cmd, &config);
            assert_eq!(first, second, "command: {cmd}");
        }
    }
}

//! Built-in command sets and the effective per-invocation configuration.
//!
//! Defaults live here as constants; user overrides come from the
//! `readonlyBashHook` object in Claude Code's settings files. Settings are
//! read leniently: a missing file, malformed JSON, or a wrong-typed value
//! falls back to the default for that field, never to an error.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde_json::Value;

use crate::handlers::{self, HandlerFn};
use crate::logging::debug;

/// Commands approved by the general whitelist. `sed`, `find`, and `xargs`
/// are here deliberately: their dangerous modes are screened by handlers
/// first, and the safe modes fall through to this list.
pub const DEFAULT_COMMANDS: &[&str] = &[
    // Filesystem listing
    "ls", "tree", "stat", "file", "du", "df",
    // File reading
    "cat", "head", "tail", "less", "more", "tac",
    // Search
    "grep", "rg", "fd", "find", "locate", "strings", "ag",
    // Text processing
    "sed", "cut", "paste", "tr", "sort", "uniq", "comm", "join",
    "fmt", "column", "nl", "rev", "fold", "expand", "unexpand",
    "wc", "xargs",
    // Structured data
    "jq", "yq",
    // Diffing
    "diff", "cmp",
    // Path utilities
    "readlink", "realpath", "basename", "dirname",
    // Command lookup
    "which", "type", "whereis",
    // User and host info
    "id", "whoami", "groups", "uname", "hostname", "uptime", "printenv",
    // Checksums
    "sha256sum", "sha1sum", "md5sum", "cksum", "b2sum",
    // Binary viewers
    "xxd", "hexdump", "od",
    // Builtins
    "echo", "printf", "true", "false", "test", "[", "read",
    // Process inspection
    "ps", "top", "htop", "lsof", "pgrep",
];

/// Commands that can bypass the whole safety model; they never approve no
/// matter where they appear. Wins over every whitelist.
pub const NEVER_APPROVE: &[&str] = &[
    // Shell escape hatches
    "eval", "exec", "source", ".",
    // Privilege escalation
    "sudo", "su",
    // Shell interpreters
    "bash", "sh", "zsh", "fish", "dash", "csh", "ksh",
    // Language interpreters
    "python", "python3", "perl", "ruby", "node", "deno", "bun",
    // Too flexible to analyze
    "parallel",
];

/// awk and friends: never-approved by default, screened by the awk handler
/// when `awkSafeMode` is on.
pub const AWK_VARIANTS: &[&str] = &["awk", "gawk", "mawk", "nawk"];

/// Git subcommands that never write.
pub const GIT_READ_ONLY: &[&str] = &[
    "blame", "diff", "log", "ls-files", "ls-tree",
    "rev-parse", "show", "show-ref", "status",
];

/// Git subcommands with repository-local effects, allowed only when
/// `gitLocalWrites` is on. `config` additionally carries a scope guard in
/// the pipeline.
pub const GIT_LOCAL_WRITE_CMDS: &[&str] = &["branch", "tag", "remote", "stash", "add", "config"];

/// Commands that prefix and execute another command; unwrapped until the
/// real executable is found.
pub const WRAPPER_COMMANDS: &[&str] = &["env", "nice", "time", "command", "nohup"];

/// The immutable effective configuration for one invocation.
pub struct Config {
    pub whitelist: HashSet<String>,
    pub never_approve: HashSet<String>,
    pub subcommand_whitelist: HashMap<String, HashSet<String>>,
    pub git_local_writes: bool,
    pub awk_safe_mode: bool,
    pub handlers: HashMap<&'static str, HandlerFn>,
}

/// User-supplied overrides, resolved from settings.json (or built directly
/// in tests).
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub extra_commands: Vec<String>,
    pub remove_commands: Vec<String>,
    pub git_local_writes: bool,
    pub awk_safe_mode: bool,
    pub subcommand_whitelist: HashMap<String, Vec<String>>,
}

impl Config {
    /// The built-in defaults with no user overrides.
    pub fn default_config() -> Self {
        Self::with_overlay(Overlay::default())
    }

    /// Discover settings.json and build the effective configuration.
    pub fn load() -> Self {
        Self::with_overlay(Overlay::from_settings())
    }

    pub fn with_overlay(overlay: Overlay) -> Self {
        let mut whitelist: HashSet<String> =
            DEFAULT_COMMANDS.iter().map(|s| s.to_string()).collect();
        whitelist.extend(overlay.extra_commands.iter().cloned());
        for cmd in &overlay.remove_commands {
            whitelist.remove(cmd);
        }
        // With the awk handler registered, a passing awk invocation still
        // needs a whitelist entry to approve.
        if overlay.awk_safe_mode {
            whitelist.extend(AWK_VARIANTS.iter().map(|s| s.to_string()));
        }

        let mut never_approve: HashSet<String> =
            NEVER_APPROVE.iter().map(|s| s.to_string()).collect();
        if !overlay.awk_safe_mode {
            never_approve.extend(AWK_VARIANTS.iter().map(|s| s.to_string()));
        }

        let mut handler_map: HashMap<&'static str, HandlerFn> = HashMap::new();
        handler_map.insert("sed", handlers::handle_sed);
        handler_map.insert("find", handlers::handle_find);
        handler_map.insert("xargs", handlers::handle_xargs);
        if overlay.awk_safe_mode {
            for &name in AWK_VARIANTS {
                handler_map.insert(name, handlers::handle_awk);
            }
        }

        let mut git: HashSet<String> = GIT_READ_ONLY.iter().map(|s| s.to_string()).collect();
        if overlay.git_local_writes {
            git.extend(GIT_LOCAL_WRITE_CMDS.iter().map(|s| s.to_string()));
        }
        let mut subcommand_whitelist: HashMap<String, HashSet<String>> = HashMap::new();
        subcommand_whitelist.insert("git".to_string(), git);
        // User entries for other executables are taken as-is; git entries
        // union with the defaults above.
        for (executable, subs) in overlay.subcommand_whitelist {
            subcommand_whitelist
                .entry(executable)
                .or_default()
                .extend(subs);
        }

        Self {
            whitelist,
            never_approve,
            subcommand_whitelist,
            git_local_writes: overlay.git_local_writes,
            awk_safe_mode: overlay.awk_safe_mode,
            handlers: handler_map,
        }
    }
}

impl Overlay {
    /// Resolve the overlay from the first settings file that exists and
    /// parses; no usable file means no overrides.
    pub fn from_settings() -> Self {
        match read_settings() {
            Some(settings) => Self::from_value(&settings),
            None => Self::default(),
        }
    }

    /// Extract the `readonlyBashHook` object from a settings document.
    /// Every field is read leniently; unknown keys (including future
    /// feature flags) are ignored.
    pub fn from_value(settings: &Value) -> Self {
        let Some(hook) = settings.get("readonlyBashHook") else {
            return Self::default();
        };
        let features = hook.get("features");
        Self {
            extra_commands: string_list(hook.get("extraCommands")),
            remove_commands: string_list(hook.get("removeCommands")),
            git_local_writes: bool_flag(features.and_then(|f| f.get("gitLocalWrites"))),
            awk_safe_mode: bool_flag(features.and_then(|f| f.get("awkSafeMode"))),
            subcommand_whitelist: string_list_map(hook.get("subcommandWhitelist")),
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn bool_flag(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

fn string_list_map(value: Option<&Value>) -> HashMap<String, Vec<String>> {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .map(|(key, subs)| (key.clone(), string_list(Some(subs))))
                .collect()
        })
        .unwrap_or_default()
}

fn settings_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(".claude").join("settings.json")];
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(".claude").join("settings.json"));
    }
    candidates
}

fn read_settings() -> Option<Value> {
    for path in settings_candidates() {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        match serde_json::from_str(&content) {
            Ok(value) => {
                debug(3, &format!("loaded settings from {}", path.display()));
                return Some(value);
            }
            Err(_) => continue,
        }
    }
    debug(3, "no settings.json found, using defaults");
    None
}

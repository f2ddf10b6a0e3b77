//! Side-channel debug logging.
//!
//! Gated by the `READONLY_HOOK_DEBUG` environment variable (1/2/3 for
//! increasing verbosity). Lines append to `~/.claude/hooks/readonly_bash.log`.
//! Standard output belongs exclusively to the decision document, and the
//! log is best-effort: every failure is swallowed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Utc;

fn debug_level() -> u8 {
    static LEVEL: OnceLock<u8> = OnceLock::new();
    *LEVEL.get_or_init(|| {
        std::env::var("READONLY_HOOK_DEBUG")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    })
}

fn log_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".claude").join("hooks").join("readonly_bash.log"))
}

/// Append a diagnostic line when the debug level is at least `level`.
pub fn debug(level: u8, msg: &str) {
    if debug_level() < level {
        return;
    }
    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = writeln!(file, "{} {msg}", Utc::now().to_rfc3339());
}

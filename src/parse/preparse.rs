//! Textual rewrites applied before the AST library sees the input.
//!
//! The grammar has a few constructs that either confuse downstream handling
//! or carry no command content. Each rewrite replaces a span with a literal
//! that is statically known to be a no-op, so nothing dangerous can hide in
//! the replaced text.

use std::sync::OnceLock;

use regex::Regex;

fn arith_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\(\(.*?\)\)").expect("arithmetic expansion pattern"))
}

fn extended_test_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[.*?\]\]").expect("extended test pattern"))
}

/// Strip a leading `time` keyword (and its `-p` flag) from the front of the
/// command. Only the keyword form is handled here; `/usr/bin/time` is
/// unwrapped later as a wrapper command.
pub fn strip_time_keyword(cmd: &str) -> &str {
    let stripped = cmd.trim_start();
    let Some(rest) = stripped.strip_prefix("time") else {
        return cmd;
    };

    // Keyword boundary: don't touch e.g. "timeout 5 ls".
    match rest.chars().next() {
        None => return rest,
        Some(' ' | '\t' | '\n' | ';' | '|' | '&') => {}
        Some(_) => return cmd,
    }

    let mut rest = rest.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("-p") {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                rest = after.trim_start();
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix("--") {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                rest = after.trim_start();
            }
        }
        break;
    }
    rest
}

/// Apply every pre-parse rewrite in order.
///
/// - leading `time` keyword is dropped
/// - `$((…))` arithmetic expansion becomes the single safe word `0`
/// - `[[ … ]]` extended tests become the literal `true`
pub fn preparse(cmd: &str) -> String {
    let stripped = strip_time_keyword(cmd);
    let no_arith = arith_re().replace_all(stripped, "0");
    extended_test_re().replace_all(&no_arith, "true").into_owned()
}

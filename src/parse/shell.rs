//! tree-sitter-bash AST walker.
//!
//! Decomposes a command string into the flat list of [`CommandFragment`]s
//! that may execute on any branch: pipeline stages, list branches, loop and
//! conditional bodies, function bodies, command substitutions, and process
//! substitutions. Node kinds outside the recognized set abort the walk so
//! the whole command falls through to the interactive prompt.

use tree_sitter::{Node, Parser};

use super::preparse::preparse;
use super::ParseError;
use crate::fragment::CommandFragment;
use crate::logging::debug;

/// Parse a shell command string into fragments.
///
/// Returns an empty list for input with no command content (empty,
/// whitespace, comments, pure assignments). Any syntax error or
/// unrecognized construct is an error, which the orchestrator converts to
/// fall-through.
pub fn parse_command(cmd: &str) -> Result<Vec<CommandFragment>, ParseError> {
    let source = preparse(cmd);
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parser = Parser::new();
    let language = tree_sitter::Language::from(tree_sitter_bash::LANGUAGE);
    parser.set_language(&language)?;
    let tree = parser.parse(&source, None).ok_or(ParseError::Syntax)?;
    let root = tree.root_node();
    if root.has_error() {
        debug(2, &format!("syntax error in: {cmd}"));
        return Err(ParseError::Syntax);
    }

    let mut walker = Walker {
        source: &source,
        fragments: Vec::new(),
    };
    walker.walk(root)?;
    Ok(walker.fragments)
}

struct Walker<'a> {
    source: &'a str,
    fragments: Vec<CommandFragment>,
}

impl Walker<'_> {
    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    /// One token of command text, unquoted when it is a single shell word
    /// (`"*.py"` → `*.py`, `\;` → `;`). Text that does not resolve to
    /// exactly one word (e.g. an embedded `$(…)` span) is kept raw.
    fn word_text(&self, node: Node) -> String {
        let text = self.text(node);
        match shlex::split(text) {
            Some(mut parts) if parts.len() == 1 => parts.remove(0),
            _ => text.to_string(),
        }
    }

    fn walk(&mut self, node: Node) -> Result<(), ParseError> {
        match node.kind() {
            // Composition and control flow: every contained statement may
            // run, so all of them contribute fragments.
            "program" | "list" | "pipeline" | "subshell" | "compound_statement"
            | "for_statement" | "c_style_for_statement" | "while_statement"
            | "until_statement" | "if_statement" | "elif_clause" | "else_clause"
            | "do_group" | "negated_command" | "function_definition" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.walk(child)?;
                }
                Ok(())
            }

            "command" => self.simple_command(node),

            "redirected_statement" => self.redirected(node),

            "command_substitution" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.walk(child)?;
                }
                Ok(())
            }

            "process_substitution" => {
                self.scan(node)?;
                Ok(())
            }

            // A lone FOO=bar statement produces no fragment, but its value
            // may hide a substitution.
            "variable_assignment" => {
                self.scan(node)?;
                Ok(())
            }

            "comment" => Ok(()),

            // Word-like leaves (loop variables, `for f in *.txt` values):
            // no fragment, but still scanned for nested substitutions.
            "word" | "number" | "string" | "raw_string" | "ansi_c_string"
            | "translated_string" | "concatenation" | "simple_expansion"
            | "expansion" | "arithmetic_expansion" | "variable_name" => {
                self.scan(node)?;
                Ok(())
            }

            // Default-deny: anything else aborts the walk.
            kind => {
                debug(2, &format!("unsupported construct: {kind}"));
                Err(ParseError::Unsupported(kind))
            }
        }
    }

    /// One simple command node becomes one fragment. Assignment prefixes
    /// and every argument are scanned for nested substitutions; an output
    /// process substitution among the arguments flags the fragment itself.
    fn simple_command(&mut self, node: Node) -> Result<(), ParseError> {
        let mut words: Vec<String> = Vec::new();
        let mut has_output_redirect = false;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "command_name" => {
                    words.push(self.word_text(child));
                    has_output_redirect |= self.scan(child)?;
                }
                "variable_assignment" => {
                    has_output_redirect |= self.scan(child)?;
                }
                "word" | "number" | "string" | "raw_string" | "ansi_c_string"
                | "translated_string" | "concatenation" | "simple_expansion"
                | "expansion" | "arithmetic_expansion" => {
                    words.push(self.word_text(child));
                    has_output_redirect |= self.scan(child)?;
                }
                "command_substitution" | "process_substitution" => {
                    words.push(self.text(child).to_string());
                    has_output_redirect |= self.scan(child)?;
                }
                "comment" => {}
                kind => return Err(ParseError::Unsupported(kind)),
            }
        }

        if words.is_empty() {
            // Assignments only: no executable, nothing to classify.
            return Ok(());
        }

        let executable = words.remove(0);
        self.fragments.push(CommandFragment {
            executable,
            args: words,
            has_output_redirect,
        });
        Ok(())
    }

    /// `body > target` and friends. The redirect belongs to the statement,
    /// so every fragment extracted from the body is marked when the
    /// redirect writes a file; this also covers redirects on wrapping
    /// constructs like `( … ) > file` and `for …; done > file`.
    fn redirected(&mut self, node: Node) -> Result<(), ParseError> {
        let body = node.child_by_field_name("body").ok_or(ParseError::Syntax)?;
        let mut has_output_redirect = false;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.id() == body.id() {
                continue;
            }
            match child.kind() {
                "file_redirect" => {
                    if self.file_redirect_writes(child) {
                        has_output_redirect = true;
                    }
                    has_output_redirect |= self.scan(child)?;
                }
                // Heredoc and herestring input: not a file write, but an
                // unquoted heredoc body can carry substitutions.
                "heredoc_redirect" | "heredoc_body" | "herestring_redirect" => {
                    self.scan(child)?;
                }
                "comment" => {}
                kind => return Err(ParseError::Unsupported(kind)),
            }
        }

        let start = self.fragments.len();
        self.walk(body)?;
        if has_output_redirect {
            for fragment in &mut self.fragments[start..] {
                fragment.has_output_redirect = true;
            }
        }
        Ok(())
    }

    /// File-writing forms: `>`, `>>`, `>|`, `&>`, `&>>`, and `>&` with a
    /// file target. fd duplication (`2>&1`, `>&2`, `>&-`) and every input
    /// form are not writes. Classified from the redirect text, with any
    /// leading fd number stripped.
    fn file_redirect_writes(&self, node: Node) -> bool {
        let text = self.text(node).trim();
        let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());

        if rest.starts_with("&>") {
            return true;
        }
        if let Some(target) = rest.strip_prefix(">&") {
            let target = target.trim();
            let is_fd = target == "-"
                || (!target.is_empty() && target.chars().all(|c| c.is_ascii_digit()));
            return !is_fd;
        }
        rest.starts_with('>')
    }

    /// Scan a token subtree for nested substitutions. Inner commands are
    /// handed back to the walker; returns true when the subtree contains an
    /// output-side process substitution `>(…)`, which flags the enclosing
    /// fragment as an output channel.
    fn scan(&mut self, node: Node) -> Result<bool, ParseError> {
        match node.kind() {
            "command_substitution" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.walk(child)?;
                }
                Ok(false)
            }
            "process_substitution" => {
                let output_side = self.text(node).starts_with('>');
                if output_side {
                    debug(2, "output process substitution marks enclosing command");
                }
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.walk(child)?;
                }
                Ok(output_side)
            }
            _ => {
                let mut out = false;
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    out |= self.scan(child)?;
                }
                Ok(out)
            }
        }
    }
}

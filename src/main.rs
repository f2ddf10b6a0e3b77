//! Hook entry point: one JSON document in on stdin, an approval document
//! (or nothing) out on stdout, exit code 0 on every path.

use std::io::Read;

use readonly_bash_hook::hook;

fn main() {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        // Fail open: no output, successful exit.
        return;
    }

    if let Some(output) = hook::process(&input) {
        println!("{output}");
    }
}

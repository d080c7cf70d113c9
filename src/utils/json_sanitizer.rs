// src/utils/json_sanitizer.rs

use std::sync::LazyLock;

use regex::Regex;

/// LaTeX commands whose leading backslash the model tends to leave unescaped
/// inside JSON strings. Add entries here to repair more commands.
const LATEX_COMMANDS: &[&str] = &["frac", "sqrt", "int", "{", "}", "left", "right"];

static LATEX_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = LATEX_COMMANDS
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\\(?:{})", alternatives)).expect("LaTeX command pattern is valid")
});

/// Repairs unescaped LaTeX commands in a JSON document produced by the chatbox.
///
/// A backslash introducing one of [`LATEX_COMMANDS`] is doubled when the
/// character before it is not itself a backslash (this includes the opening
/// quote of a string value). Already escaped sequences such as `\\frac` are
/// left alone, so the repair is idempotent. Nothing else is touched.
pub fn sanitize(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for m in LATEX_COMMAND_RE.find_iter(text) {
        let start = m.start();
        let needs_escape = start > 0 && bytes[start - 1] != b'\\';
        if needs_escape {
            out.push_str(&text[last..start]);
            out.push('\\');
            last = start;
        }
    }
    out.push_str(&text[last..]);
    out
}

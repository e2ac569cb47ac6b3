//! Model output normalization.
//!
//! Turns raw model text into display-ready output for one action:
//! fences are always stripped, code-only actions additionally drop
//! leading/trailing narrative lines, prose actions get escaped inline
//! markup. Normalization is a pure text transform and never fails —
//! empty input yields empty output in the action's normal mode.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// How the cleaned text should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Raw source code, monospace, no markup.
    Code,
    /// Escaped prose with inline-code markup.
    Prose,
    /// Failure message (produced by callers, never by `normalize`).
    Error,
}

/// Normalized model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOutput {
    pub display_mode: DisplayMode,
    pub cleaned_text: String,
}

/// Markdown fence delimiter, with optional language tag.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*[ \t]*\r?\n?").unwrap());

/// Inline single-backtick code span.
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());

/// Substrings that mark a line as the likely start of code.
const CODE_MARKERS: &[&str] = &[
    "{", "(", "import ", "class ", "function ", "const ", "let ", "var ", "def ", "//", "/*",
];

/// Prefixes of narrative lines a model tends to put before code.
const NARRATIVE_OPENERS: &[&str] = &["Here", "The "];

/// Prefixes of narrative lines a model tends to put after code.
const NARRATIVE_CLOSERS: &[&str] = &["Note:", "Explanation:", "The above", "This "];

/// Normalize raw model output for the given action.
pub fn normalize(action: Action, raw_text: &str) -> NormalizedOutput {
    let unfenced = strip_fences(raw_text);

    if action.is_code_only() {
        NormalizedOutput {
            display_mode: DisplayMode::Code,
            cleaned_text: extract_code(&unfenced),
        }
    } else {
        NormalizedOutput {
            display_mode: DisplayMode::Prose,
            cleaned_text: format_prose(&unfenced),
        }
    }
}

/// Delete every fence delimiter. A single pair wrapping the whole reply
/// collapses to the enclosed content; stray delimiters just disappear.
fn strip_fences(text: &str) -> String {
    FENCE.replace_all(text, "").into_owned()
}

/// Trim leading and trailing narrative lines around a code body.
///
/// Two independent passes over the line sequence: forward for the first
/// code-like line, backward for the last substantive one. When no line
/// qualifies as a start, the text is returned whole — a reply the
/// heuristic cannot parse is better shown untouched than emptied.
fn extract_code(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let start = lines.iter().position(|line| {
        let line = line.trim();
        !line.is_empty()
            && !starts_with_any(line, NARRATIVE_OPENERS)
            && CODE_MARKERS.iter().any(|m| line.contains(m))
    });

    let Some(start) = start else {
        return text.trim().to_string();
    };

    let end = lines
        .iter()
        .rposition(|line| {
            let line = line.trim();
            !line.is_empty() && !starts_with_any(line, NARRATIVE_CLOSERS)
        })
        .map(|i| i + 1)
        .unwrap_or(lines.len());

    if end <= start {
        return String::new();
    }

    lines[start..end].join("\n").trim().to_string()
}

fn starts_with_any(line: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| line.starts_with(p))
}

/// Escape prose and mark up inline code spans and line breaks.
fn format_prose(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let with_code = INLINE_CODE.replace_all(&escaped, "<code>$1</code>");
    with_code.trim().replace('\n', "<br>")
}

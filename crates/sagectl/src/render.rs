//! Terminal rendering of normalized output.
//!
//! Code results are printed raw so they can be piped straight into a file.
//! Prose results carry the normalizer's inline markup (`<code>`, `<br>`,
//! escaped entities) and are converted to ANSI here.

use once_cell::sync::Lazy;
use owo_colors::OwoColorize;
use regex::Regex;

use sage_common::{Action, DisplayMode, NormalizedOutput, SageError};

static CODE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<code>(.*?)</code>").unwrap());

/// Convert prose markup to terminal text.
pub fn markup_to_ansi(markup: &str, color: bool) -> String {
    let text = markup.replace("<br>", "\n");
    let text = CODE_SPAN.replace_all(&text, |caps: &regex::Captures| {
        if color {
            (&caps[1]).cyan().to_string()
        } else {
            caps[1].to_string()
        }
    });
    unescape_entities(&text)
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Print one result under its action heading.
///
/// The heading goes to stderr so code results can be piped straight into
/// a file; the result itself is the only thing on stdout.
pub fn print_output(action: Action, output: &NormalizedOutput, color: bool) {
    print_heading(action.title(), color);

    match output.display_mode {
        DisplayMode::Code => println!("{}", output.cleaned_text),
        DisplayMode::Prose => println!("{}", markup_to_ansi(&output.cleaned_text, color)),
        DisplayMode::Error => eprintln!("{}", output.cleaned_text),
    }
}

fn print_heading(title: &str, color: bool) {
    if color {
        eprintln!("{}", title.bold());
        eprintln!("{}", "─".repeat(title.chars().count()).dimmed());
    } else {
        eprintln!("{}", title);
        eprintln!("{}", "─".repeat(title.chars().count()));
    }
}

/// The single user-facing failure surface: error kind plus remediation hint.
pub fn print_error(err: &SageError, color: bool) {
    if color {
        eprintln!("{} {}", "✗".red(), err);
    } else {
        eprintln!("✗ {}", err);
    }
    if let Some(hint) = err.hint() {
        if color {
            eprintln!("  {}", hint.dimmed());
        } else {
            eprintln!("  {}", hint);
        }
    }
}

/// Non-blocking informational line.
pub fn notice(message: &str, color: bool) {
    if color {
        eprintln!("{}", message.dimmed());
    } else {
        eprintln!("{}", message);
    }
}

/// Human-readable byte size for model listings.
pub fn format_size(bytes: u64) -> String {
    const GB: f64 = 1_000_000_000.0;
    const MB: f64 = 1_000_000.0;
    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.0} MB", bytes / MB)
    } else {
        format!("{} B", bytes as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_roundtrip_without_color() {
        let markup = "a &lt;b&gt; &amp; <code>map()</code><br>done";
        assert_eq!(markup_to_ansi(markup, false), "a <b> & map()\ndone");
    }

    #[test]
    fn test_code_span_styled_with_color() {
        let out = markup_to_ansi("call <code>len()</code> here", true);
        assert!(out.contains("len()"));
        assert!(out.contains('\u{1b}'));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(markup_to_ansi("just words", false), "just words");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(12_000_000), "12 MB");
        assert_eq!(format_size(4_700_000_000), "4.7 GB");
    }
}

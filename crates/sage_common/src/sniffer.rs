//! Code detection heuristic.
//!
//! Decides whether a blob of selected text "looks like code" so the caller
//! can offer a contextual hint. Recall-favoring: an extra hint on prose is
//! harmless, a missed hint on real code is mildly annoying. Fails closed on
//! very short text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Selections shorter than this are never treated as code.
pub const MIN_CODE_LEN: usize = 10;

/// Ordered pattern table covering common C-like and Python syntax.
static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"function\s+\w+\s*\(",   // JS function declaration
        r"class\s+\w+",           // class declaration
        r"const\s+\w+\s*=",       // JS const binding
        r"let\s+\w+\s*=",         // JS let binding
        r"var\s+\w+\s*=",         // JS var binding
        r"def\s+\w+\(",           // Python function
        r"public\s+\w+",          // access modifier
        r"private\s+\w+",         // access modifier
        r"import\s+",             // import statement
        r#"from\s+['"].*['"]"#,   // JS module import
        r"\w+\.\w+\(",            // method call
        r"=>\s*\{",               // arrow function body
        r"if\s*\(",               // control flow
        r"for\s*\(",              // control flow
        r"while\s*\(",            // control flow
        r"(?s)\{.*\}",            // brace block
        r"//.*",                  // line comment
        r"(?s)/\*.*\*/",          // block comment
    ]
    .iter()
    .map(|p| Regex::new(p).expect("code pattern must compile"))
    .collect()
});

/// Heuristic predicate: does this text look like source code?
pub fn looks_like_code(text: &str) -> bool {
    if text.chars().count() < MIN_CODE_LEN {
        return false;
    }
    CODE_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_fails_closed() {
        assert!(!looks_like_code(""));
        assert!(!looks_like_code("x = 1"));
        assert!(!looks_like_code("if (x) {"));
    }

    #[test]
    fn test_plain_prose_is_not_code() {
        assert!(!looks_like_code("hello world"));
        assert!(!looks_like_code("The quick brown fox jumps over the lazy dog."));
    }

    #[test]
    fn test_common_declarations_detected() {
        assert!(looks_like_code("function foo() { return 1; }"));
        assert!(looks_like_code("const total = items.length;"));
        assert!(looks_like_code("def handler(request):\n    return None"));
        assert!(looks_like_code("class ConnectionPool:"));
        assert!(looks_like_code("import os, sys, json"));
    }

    #[test]
    fn test_calls_comments_and_blocks_detected() {
        assert!(looks_like_code("console.log(value)"));
        assert!(looks_like_code("items.map(x => { return x * 2 })"));
        assert!(looks_like_code("// TODO: handle the empty case"));
        assert!(looks_like_code("/* legacy path, kept for 1.x */ run();"));
        assert!(looks_like_code("for (i = 0; i < n; i++) total += i;"));
    }

    #[test]
    fn test_prose_mentioning_keywords_can_match() {
        // Recall-favoring by design: "import " in prose still trips the
        // heuristic, and that is acceptable.
        assert!(looks_like_code("You should import fewer modules."));
    }
}

//! End-to-end pipeline tests: prompt construction through output
//! normalization, with canned model replies standing in for the local model.

use sage_common::{build_prompt, normalize, Action, DisplayMode, SageError, LANG_AUTO};

#[test]
fn refactor_pipeline_produces_bare_code() {
    let source = "function add(a,b){return a+b}";
    let prompt = build_prompt(Action::Refactor, source, "javascript").unwrap();
    assert!(prompt.contains(source));
    assert!(prompt.contains("(javascript)"));

    // A typical reply: fenced code with chatter on both sides.
    let reply = "Here is the improved version:\n\
                 ```javascript\n\
                 function add(first, second) {\n  return first + second;\n}\n\
                 ```\n\
                 This version uses descriptive parameter names.";

    let out = normalize(Action::Refactor, reply);
    assert_eq!(out.display_mode, DisplayMode::Code);
    assert_eq!(
        out.cleaned_text,
        "function add(first, second) {\n  return first + second;\n}"
    );
}

#[test]
fn comments_pipeline_preserves_code_shape() {
    let reply = "Sure thing.\ndef nth(n):\n    # double the input\n    return n * 2\nNote: logic unchanged.";
    let out = normalize(Action::Comments, reply);
    assert_eq!(out.display_mode, DisplayMode::Code);
    assert_eq!(
        out.cleaned_text,
        "def nth(n):\n    # double the input\n    return n * 2"
    );
}

#[test]
fn explain_pipeline_yields_marked_up_prose() {
    let prompt = build_prompt(Action::Explain, "let x = 1;", LANG_AUTO).unwrap();
    assert!(prompt.contains("Line-by-line"));

    let reply = "The binding `x` is immutable.\nUse `let mut` if you need to change it.";
    let out = normalize(Action::Explain, reply);
    assert_eq!(out.display_mode, DisplayMode::Prose);
    assert!(out.cleaned_text.contains("<code>x</code>"));
    assert!(out.cleaned_text.contains("<code>let mut</code>"));
    assert!(out.cleaned_text.contains("<br>"));
    assert!(!out.cleaned_text.contains('`'));
}

#[test]
fn chat_pipeline_accepts_questions_only() {
    assert!(matches!(
        build_prompt(Action::Chat, "  ", LANG_AUTO),
        Err(SageError::InvalidRequest)
    ));

    let prompt = build_prompt(Action::Chat, "When should I use a HashMap?", LANG_AUTO).unwrap();
    assert!(prompt.contains("When should I use a HashMap?"));

    let out = normalize(Action::Chat, "Use one for key-value lookups.");
    assert_eq!(out.display_mode, DisplayMode::Prose);
    assert_eq!(out.cleaned_text, "Use one for key-value lookups.");
}

#[test]
fn review_pipeline_keeps_headings() {
    let reply = "**Bugs/Issues:**\n- none\n\n**Suggestions:**\n- add tests";
    let out = normalize(Action::Review, reply);
    assert_eq!(out.display_mode, DisplayMode::Prose);
    assert!(out.cleaned_text.contains("**Bugs/Issues:**"));
    assert!(out.cleaned_text.contains("<br>"));
}

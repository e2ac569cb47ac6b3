//! Prompt construction.
//!
//! One fixed template per action. Only the source text and the language hint
//! are interpolated; the template text itself is a design constant. The
//! source is quoted as the literal code under analysis — nothing stops a
//! model from treating it as instructions, which is a documented limitation
//! of the local-model setup, not something enforced here.

use crate::action::Action;
use crate::error::SageError;

/// Hint value meaning "no language hint".
pub const LANG_AUTO: &str = "auto";

/// Build the model-ready prompt for one request.
///
/// For `chat` the source text is the user's question; every other action
/// treats it as the code under analysis. Fails iff the trimmed source is
/// empty.
pub fn build_prompt(
    action: Action,
    source_text: &str,
    language_hint: &str,
) -> Result<String, SageError> {
    let source = source_text.trim();
    if source.is_empty() {
        return Err(SageError::InvalidRequest);
    }

    let hint = language_qualifier(language_hint);
    let prompt = match action {
        Action::Explain => explain_prompt(source, &hint),
        Action::Refactor => refactor_prompt(source, &hint),
        Action::Review => review_prompt(source, &hint),
        Action::Comments => comments_prompt(source, &hint),
        Action::Chat => chat_prompt(source),
    };

    Ok(prompt)
}

/// Parenthetical language qualifier, empty when the hint is "auto" or blank.
fn language_qualifier(language_hint: &str) -> String {
    let hint = language_hint.trim();
    if hint.is_empty() || hint.eq_ignore_ascii_case(LANG_AUTO) {
        String::new()
    } else {
        format!(" ({})", hint)
    }
}

fn explain_prompt(code: &str, hint: &str) -> String {
    format!(
        "You are a code mentor helping a developer understand code{hint}.\n\
         \n\
         Analyze this code and provide:\n\
         1. **Overview**: What does this code do?\n\
         2. **Line-by-line explanation**: Explain each important line or block\n\
         3. **Key concepts**: Any important concepts or patterns used\n\
         4. **Potential issues**: Any bugs or improvements you notice\n\
         \n\
         Code:\n\
         ```\n\
         {code}\n\
         ```\n\
         \n\
         Provide a clear, educational explanation."
    )
}

fn refactor_prompt(code: &str, hint: &str) -> String {
    format!(
        "Refactor this code to improve quality{hint}.\n\
         \n\
         Improvements to make:\n\
         1. Better variable/function names (more descriptive)\n\
         2. Improve code structure and readability\n\
         3. Optimize performance where possible\n\
         4. Follow language best practices\n\
         5. Add helpful comments for clarity\n\
         \n\
         CRITICAL RULES:\n\
         - DO NOT add markdown formatting (``` or language tags)\n\
         - DO NOT add explanatory text before or after code\n\
         - Return ONLY the refactored code\n\
         - Maintain the same functionality\n\
         \n\
         Code:\n\
         {code}\n\
         \n\
         Refactored code:"
    )
}

fn review_prompt(code: &str, hint: &str) -> String {
    format!(
        "You are a senior code reviewer{hint}.\n\
         \n\
         Review this code and provide:\n\
         \n\
         **Bugs/Issues:**\n\
         - List any bugs, errors, or logical problems\n\
         \n\
         **Potential Problems:**\n\
         - Edge cases not handled\n\
         - Performance issues\n\
         - Security concerns\n\
         \n\
         **Good Practices:**\n\
         - What's done well\n\
         \n\
         **Suggestions:**\n\
         - How to improve the code\n\
         \n\
         Code:\n\
         ```\n\
         {code}\n\
         ```\n\
         \n\
         Be constructive and specific."
    )
}

fn comments_prompt(code: &str, hint: &str) -> String {
    format!(
        "Add helpful comments to this code{hint}.\n\
         \n\
         RULES - VERY IMPORTANT:\n\
         1. DO NOT modify any code logic, structure, or syntax\n\
         2. DO NOT add markdown formatting like ```\n\
         3. DO NOT add explanatory text before or after the code\n\
         4. ONLY add comments using proper syntax (// or /* */ or # depending on language)\n\
         5. Add comments for: functions, complex logic, parameters, return values\n\
         6. Keep comments concise and helpful\n\
         \n\
         Code to comment:\n\
         {code}\n\
         \n\
         Output the exact same code with only comments added. Nothing else."
    )
}

fn chat_prompt(question: &str) -> String {
    format!(
        "You are a helpful programming mentor. Answer the following programming \
         question clearly and concisely.\n\
         \n\
         Question: {question}\n\
         \n\
         Provide a focused answer with:\n\
         1. Direct response to the question\n\
         2. Short code examples if relevant\n\
         3. Best practices or common pitfalls if applicable"
    )
}

//! Request actions.
//!
//! An action is the transformation the user asked for. It selects the prompt
//! template, the output-cleaning mode, and the labels the CLI shows while a
//! request is in flight.

use serde::{Deserialize, Serialize};

/// The requested transformation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Explain what the code does, line by line.
    Explain,
    /// Rewrite the code with better names, structure, and performance.
    Refactor,
    /// Review the code for bugs, edge cases, and improvements.
    Review,
    /// Add comments to the code without changing it.
    Comments,
    /// Answer a free-form programming question.
    Chat,
}

impl Action {
    /// All actions, in display order.
    pub const ALL: [Action; 5] = [
        Action::Explain,
        Action::Refactor,
        Action::Review,
        Action::Comments,
        Action::Chat,
    ];

    /// Whether the expected output is source code with no surrounding prose.
    pub fn is_code_only(&self) -> bool {
        matches!(self, Action::Refactor | Action::Comments)
    }

    /// Heading shown above the rendered result.
    pub fn title(&self) -> &'static str {
        match self {
            Action::Explain => "Code Explanation",
            Action::Refactor => "Refactored Code",
            Action::Review => "Code Review",
            Action::Comments => "Commented Code",
            Action::Chat => "Answer",
        }
    }

    /// Label shown while the model call is in flight.
    pub fn loading_label(&self) -> &'static str {
        match self {
            Action::Explain => "Analyzing code...",
            Action::Refactor => "Refactoring code...",
            Action::Review => "Reviewing code...",
            Action::Comments => "Generating comments...",
            Action::Chat => "Thinking...",
        }
    }

    /// Stable lowercase name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Explain => "explain",
            Action::Refactor => "refactor",
            Action::Review => "review",
            Action::Comments => "comments",
            Action::Chat => "chat",
        }
    }

    /// Parse a lowercase action name.
    pub fn from_name(name: &str) -> Option<Action> {
        match name.trim().to_lowercase().as_str() {
            "explain" => Some(Action::Explain),
            "refactor" => Some(Action::Refactor),
            "review" => Some(Action::Review),
            "comments" => Some(Action::Comments),
            "chat" => Some(Action::Chat),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_only_actions() {
        assert!(Action::Refactor.is_code_only());
        assert!(Action::Comments.is_code_only());
        assert!(!Action::Explain.is_code_only());
        assert!(!Action::Review.is_code_only());
        assert!(!Action::Chat.is_code_only());
    }

    #[test]
    fn test_name_roundtrip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("REVIEW"), Some(Action::Review));
        assert_eq!(Action::from_name("summarize"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Action::Refactor).unwrap();
        assert_eq!(json, "\"refactor\"");
        let back: Action = serde_json::from_str("\"chat\"").unwrap();
        assert_eq!(back, Action::Chat);
    }
}

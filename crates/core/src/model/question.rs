use serde::Serialize;

use crate::model::ids::TermId;
use crate::model::term::Difficulty;

const HINT_CHARS: usize = 100;

/// A multiple-choice presentation of one term.
///
/// Prompt fields are copied from the term at generation time; `term_id` is a lookup key only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub(crate) term_id: TermId,
    pub(crate) definition: String,
    pub(crate) code_example: Option<String>,
    pub(crate) real_world_example: String,
    pub(crate) category: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) options: Vec<String>,
    pub(crate) correct_answer: String,
}

impl Question {
    #[must_use]
    pub fn term_id(&self) -> TermId {
        self.term_id
    }

    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    #[must_use]
    pub fn code_example(&self) -> Option<&str> {
        self.code_example.as_deref()
    }

    #[must_use]
    pub fn real_world_example(&self) -> &str {
        &self.real_world_example
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Choices in presentation order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Leading slice of the real-world example, shown on request before answering.
    #[must_use]
    pub fn hint(&self) -> String {
        let mut chars = self.real_world_example.chars();
        let head: String = chars.by_ref().take(HINT_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(example: &str) -> Question {
        Question {
            term_id: TermId::new(1),
            definition: "d".into(),
            code_example: None,
            real_world_example: example.into(),
            category: "Web Development".into(),
            difficulty: Difficulty::Beginner,
            options: vec!["API".into(), "REST".into(), "SQL".into(), "Git".into()],
            correct_answer: "API".into(),
        }
    }

    #[test]
    fn short_hint_is_returned_whole() {
        let q = question("Like a waiter.");
        assert_eq!(q.hint(), "Like a waiter.");
    }

    #[test]
    fn long_hint_is_truncated_on_char_boundary() {
        let text = "é".repeat(150);
        let q = question(&text);
        let hint = q.hint();
        assert!(hint.ends_with("..."));
        assert_eq!(hint.chars().count(), 103);
    }

    #[test]
    fn has_option_is_exact() {
        let q = question("x");
        assert!(q.has_option("REST"));
        assert!(!q.has_option("rest"));
    }
}

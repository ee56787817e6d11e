use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::TermId;

const MAX_NAME_CHARS: usize = 100;
const MAX_CATEGORY_CHARS: usize = 50;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TermError {
    #[error("term name cannot be empty")]
    EmptyName,

    #[error("term name is too long: {len} chars (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("term definition cannot be empty")]
    EmptyDefinition,

    #[error("term category cannot be empty")]
    EmptyCategory,

    #[error("term category is too long: {len} chars (max {max})")]
    CategoryTooLong { len: usize, max: usize },

    #[error("real-world example cannot be empty")]
    EmptyRealWorldExample,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// How advanced a term is considered to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(TermError::UnknownDifficulty(s.to_owned())),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated term payload, as read from a catalog file or an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermDraft {
    pub name: String,
    pub definition: String,
    pub category: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub code_example: Option<String>,
    pub real_world_example: String,
}

impl TermDraft {
    /// Validate the draft into a `Term`.
    ///
    /// # Errors
    ///
    /// Returns `TermError` when a required field is blank or a length limit is exceeded.
    pub fn validate(self, id: TermId, created_at: DateTime<Utc>) -> Result<Term, TermError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(TermError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_NAME_CHARS {
            return Err(TermError::NameTooLong {
                len,
                max: MAX_NAME_CHARS,
            });
        }

        let category = self.category.trim().to_owned();
        if category.is_empty() {
            return Err(TermError::EmptyCategory);
        }
        let len = category.chars().count();
        if len > MAX_CATEGORY_CHARS {
            return Err(TermError::CategoryTooLong {
                len,
                max: MAX_CATEGORY_CHARS,
            });
        }

        if self.definition.trim().is_empty() {
            return Err(TermError::EmptyDefinition);
        }
        if self.real_world_example.trim().is_empty() {
            return Err(TermError::EmptyRealWorldExample);
        }

        let code_example = self.code_example.filter(|code| !code.trim().is_empty());

        Ok(Term {
            id,
            name,
            definition: self.definition.trim().to_owned(),
            category,
            difficulty: self.difficulty,
            code_example,
            real_world_example: self.real_world_example.trim().to_owned(),
            created_at,
        })
    }
}

//
// ─── TERM ──────────────────────────────────────────────────────────────────────
//

/// One vocabulary entry of the glossary.
///
/// The `name` doubles as the correct answer of any question built from this term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    id: TermId,
    name: String,
    definition: String,
    category: String,
    difficulty: Difficulty,
    code_example: Option<String>,
    real_world_example: String,
    created_at: DateTime<Utc>,
}

impl Term {
    #[must_use]
    pub fn id(&self) -> TermId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
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
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Back to an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> TermDraft {
        TermDraft {
            name: self.name.clone(),
            definition: self.definition.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
            code_example: self.code_example.clone(),
            real_world_example: self.real_world_example.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> TermDraft {
        TermDraft {
            name: "  API ".into(),
            definition: "Application Programming Interface".into(),
            category: " Web Development ".into(),
            difficulty: Difficulty::Beginner,
            code_example: Some("   ".into()),
            real_world_example: "A weather app fetching forecasts.".into(),
        }
    }

    #[test]
    fn validate_trims_and_drops_blank_code() {
        let term = draft().validate(TermId::new(1), fixed_now()).unwrap();
        assert_eq!(term.name(), "API");
        assert_eq!(term.category(), "Web Development");
        assert_eq!(term.code_example(), None);
        assert_eq!(term.difficulty(), Difficulty::Beginner);
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let mut d = draft();
        d.name = "   ".into();
        assert_eq!(
            d.validate(TermId::new(1), fixed_now()).unwrap_err(),
            TermError::EmptyName
        );

        let mut d = draft();
        d.definition = String::new();
        assert_eq!(
            d.validate(TermId::new(1), fixed_now()).unwrap_err(),
            TermError::EmptyDefinition
        );

        let mut d = draft();
        d.real_world_example = " ".into();
        assert_eq!(
            d.validate(TermId::new(1), fixed_now()).unwrap_err(),
            TermError::EmptyRealWorldExample
        );
    }

    #[test]
    fn validate_enforces_length_limits() {
        let mut d = draft();
        d.name = "x".repeat(101);
        assert_eq!(
            d.validate(TermId::new(1), fixed_now()).unwrap_err(),
            TermError::NameTooLong { len: 101, max: 100 }
        );

        let mut d = draft();
        d.category = "c".repeat(51);
        assert!(matches!(
            d.validate(TermId::new(1), fixed_now()).unwrap_err(),
            TermError::CategoryTooLong { len: 51, .. }
        ));
    }

    #[test]
    fn difficulty_parses_only_lowercase_names() {
        assert_eq!("advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert_eq!(Difficulty::Intermediate.to_string(), "intermediate");
        for raw in ["expert", "Advanced", " beginner", "BEGINNER", ""] {
            assert!(
                matches!(raw.parse::<Difficulty>(), Err(TermError::UnknownDifficulty(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn to_draft_revalidates_to_same_term() {
        let term = draft().validate(TermId::new(3), fixed_now()).unwrap();
        let again = term.to_draft().validate(TermId::new(3), fixed_now()).unwrap();
        assert_eq!(term, again);
    }
}

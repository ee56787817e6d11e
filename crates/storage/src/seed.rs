//! Built-in glossary used to populate an empty store.

use chrono::{DateTime, Utc};
use lingo_core::model::{Term, TermDraft, TermError, TermId};
use serde::Deserialize;
use thiserror::Error;

const BUILTIN_TERMS_JSON: &str = include_str!("../data/terms.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error("malformed term list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("term {id} is invalid: {source}")]
    InvalidTerm {
        id: u64,
        #[source]
        source: TermError,
    },
}

#[derive(Debug, Deserialize)]
struct SeedTerm {
    id: u64,
    #[serde(flatten)]
    draft: TermDraft,
    created_at: DateTime<Utc>,
}

/// Parse and validate a JSON array of terms.
///
/// Each entry carries the draft fields plus `id` and `created_at`.
///
/// # Errors
///
/// Returns `SeedError::Json` for malformed input and `SeedError::InvalidTerm`
/// for entries failing validation.
pub fn load_terms(json: &str) -> Result<Vec<Term>, SeedError> {
    let raw: Vec<SeedTerm> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|entry| {
            entry
                .draft
                .validate(TermId::new(entry.id), entry.created_at)
                .map_err(|source| SeedError::InvalidTerm {
                    id: entry.id,
                    source,
                })
        })
        .collect()
}

/// The twelve terms shipped with the application.
///
/// # Errors
///
/// Returns `SeedError` only if the embedded list is corrupt.
pub fn builtin_terms() -> Result<Vec<Term>, SeedError> {
    load_terms(BUILTIN_TERMS_JSON)
}

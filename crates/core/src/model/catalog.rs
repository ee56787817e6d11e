use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::TermId;
use crate::model::term::{Difficulty, Term};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate term name in catalog: {0}")]
    DuplicateName(String),

    #[error("duplicate term id in catalog: {0}")]
    DuplicateId(TermId),
}

/// Optional narrowing of a catalog by category and/or difficulty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFilter {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl TermFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.category.is_none() && self.difficulty.is_none()
    }

    #[must_use]
    pub fn matches(&self, term: &Term) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| term.category() == category);
        let difficulty_ok = self
            .difficulty
            .is_none_or(|difficulty| term.difficulty() == difficulty);
        category_ok && difficulty_ok
    }
}

/// Number of terms filed under one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Ordered set of terms with unique names and ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    terms: Vec<Term>,
}

impl Catalog {
    /// Build a catalog, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if two terms share a name or an id.
    pub fn new(terms: Vec<Term>) -> Result<Self, CatalogError> {
        let mut names = HashSet::with_capacity(terms.len());
        let mut ids = HashSet::with_capacity(terms.len());
        for term in &terms {
            if !ids.insert(term.id()) {
                return Err(CatalogError::DuplicateId(term.id()));
            }
            if !names.insert(term.name()) {
                return Err(CatalogError::DuplicateName(term.name().to_owned()));
            }
        }
        Ok(Self { terms })
    }

    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.iter().find(|t| t.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: TermId) -> bool {
        self.get(id).is_some()
    }

    /// Categories with their term counts, in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut out: Vec<CategoryCount> = Vec::new();
        for term in &self.terms {
            match out.iter_mut().find(|c| c.name == term.category()) {
                Some(existing) => existing.count += 1,
                None => out.push(CategoryCount {
                    name: term.category().to_owned(),
                    count: 1,
                }),
            }
        }
        out
    }

    /// Sub-catalog restricted by `filter`. Uniqueness carries over.
    #[must_use]
    pub fn filter(&self, filter: &TermFilter) -> Catalog {
        Catalog {
            terms: self
                .terms
                .iter()
                .filter(|t| filter.matches(t))
                .cloned()
                .collect(),
        }
    }

    /// Case-insensitive substring search over name and definition.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Term> {
        let needle = query.trim().to_lowercase();
        self.terms
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.name().to_lowercase().contains(&needle)
                    || t.definition().to_lowercase().contains(&needle)
            })
            .collect()
    }
}

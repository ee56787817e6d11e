use std::sync::Arc;

use lingo_core::model::{Catalog, CategoryCount, Term, TermFilter, TermId};
use storage::repository::TermRepository;
use storage::seed;

use crate::error::CatalogServiceError;

/// Glossary browsing over the term repository.
#[derive(Clone)]
pub struct CatalogService {
    terms: Arc<dyn TermRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(terms: Arc<dyn TermRepository>) -> Self {
        Self { terms }
    }

    /// Terms matching `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list(&self, filter: &TermFilter) -> Result<Vec<Term>, CatalogServiceError> {
        Ok(self.terms.list_terms(filter).await?)
    }

    /// Categories with their term counts, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` if the stored terms cannot be loaded.
    pub async fn categories(&self) -> Result<Vec<CategoryCount>, CatalogServiceError> {
        Ok(self.load_catalog(&TermFilter::all()).await?.categories())
    }

    /// Case-insensitive search over names and definitions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` if the stored terms cannot be loaded.
    pub async fn search(
        &self,
        query: &str,
        filter: &TermFilter,
    ) -> Result<Vec<Term>, CatalogServiceError> {
        let catalog = self.load_catalog(filter).await?;
        Ok(catalog.search(query).into_iter().cloned().collect())
    }

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` with `StorageError::NotFound` for unknown ids.
    pub async fn get(&self, id: TermId) -> Result<Term, CatalogServiceError> {
        Ok(self.terms.get_term(id).await?)
    }

    /// Load the terms matching `filter` as a validated catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Catalog` if stored terms violate catalog uniqueness.
    pub async fn load_catalog(&self, filter: &TermFilter) -> Result<Catalog, CatalogServiceError> {
        let terms = self.terms.list_terms(filter).await?;
        Ok(Catalog::new(terms)?)
    }

    /// Insert the built-in glossary if no terms are stored yet.
    ///
    /// Returns the number of terms inserted.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` if the glossary cannot be parsed or stored.
    pub async fn ensure_seeded(&self) -> Result<usize, CatalogServiceError> {
        if self.terms.count_terms().await? > 0 {
            return Ok(0);
        }

        tracing::info!("seeding empty glossary with built-in terms");
        let terms = seed::builtin_terms()?;
        for term in &terms {
            self.terms.upsert_term(term).await?;
        }
        tracing::info!(count = terms.len(), "glossary seeded");
        Ok(terms.len())
    }
}

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Catalog, OPTIONS_PER_QUESTION, Question, Term};
use crate::quiz::error::QuizError;

/// Fail unless `catalog` can fill every question with distinct options.
pub(crate) fn ensure_catalog_size(catalog: &Catalog) -> Result<(), QuizError> {
    if catalog.len() < OPTIONS_PER_QUESTION {
        return Err(QuizError::CatalogTooSmall {
            available: catalog.len(),
            required: OPTIONS_PER_QUESTION,
        });
    }
    Ok(())
}

/// Build a multiple-choice question for `term`, drawing distractors from the rest of `catalog`.
///
/// Distractors are sampled without replacement and the final option order is shuffled,
/// so two calls for the same term generally differ.
///
/// # Errors
///
/// Returns `QuizError::CatalogTooSmall` if the catalog has fewer than
/// `OPTIONS_PER_QUESTION` terms, and `QuizError::TermNotInCatalog` if `term` is not in it.
pub fn generate_question<R: Rng + ?Sized>(
    term: &Term,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Question, QuizError> {
    ensure_catalog_size(catalog)?;
    let term = catalog
        .get(term.id())
        .filter(|t| t.name() == term.name())
        .ok_or(QuizError::TermNotInCatalog(term.id()))?;

    let mut others: Vec<&Term> = catalog
        .terms()
        .iter()
        .filter(|t| t.id() != term.id())
        .collect();
    let (distractors, _) = others.partial_shuffle(rng, OPTIONS_PER_QUESTION - 1);

    let mut options: Vec<String> = distractors.iter().map(|t| t.name().to_owned()).collect();
    options.push(term.name().to_owned());
    options.shuffle(rng);

    Ok(Question {
        term_id: term.id(),
        definition: term.definition().to_owned(),
        code_example: term.code_example().map(str::to_owned),
        real_world_example: term.real_world_example().to_owned(),
        category: term.category().to_owned(),
        difficulty: term.difficulty(),
        options,
        correct_answer: term.name().to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{catalog, term};
    use crate::model::{Difficulty, TermId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn options_are_distinct_and_contain_answer() {
        let catalog = catalog(12);
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for target in catalog.terms() {
                let q = generate_question(target, &catalog, &mut rng).unwrap();
                let unique: HashSet<_> = q.options().iter().collect();
                assert_eq!(q.options().len(), OPTIONS_PER_QUESTION);
                assert_eq!(unique.len(), OPTIONS_PER_QUESTION);
                assert!(q.has_option(q.correct_answer()));
                assert_eq!(q.correct_answer(), target.name());
                assert_eq!(q.term_id(), target.id());
            }
        }
    }

    #[test]
    fn copies_prompt_fields_from_term() {
        let catalog = catalog(6);
        let target = &catalog.terms()[2];
        let mut rng = StdRng::seed_from_u64(1);
        let q = generate_question(target, &catalog, &mut rng).unwrap();
        assert_eq!(q.definition(), target.definition());
        assert_eq!(q.real_world_example(), target.real_world_example());
        assert_eq!(q.category(), target.category());
        assert_eq!(q.difficulty(), target.difficulty());
    }

    #[test]
    fn answer_position_varies_across_calls() {
        let catalog = catalog(12);
        let target = &catalog.terms()[0];
        let mut rng = StdRng::seed_from_u64(42);
        let positions: HashSet<usize> = (0..200)
            .map(|_| {
                let q = generate_question(target, &catalog, &mut rng).unwrap();
                q.options()
                    .iter()
                    .position(|o| o == q.correct_answer())
                    .unwrap()
            })
            .collect();
        assert_eq!(positions.len(), OPTIONS_PER_QUESTION);
    }

    #[test]
    fn exactly_four_terms_uses_all_of_them() {
        let catalog = catalog(4);
        let mut rng = StdRng::seed_from_u64(3);
        let q = generate_question(&catalog.terms()[1], &catalog, &mut rng).unwrap();
        let mut got: Vec<_> = q.options().to_vec();
        got.sort();
        let mut all: Vec<_> = catalog.terms().iter().map(|t| t.name().to_owned()).collect();
        all.sort();
        assert_eq!(got, all);
    }

    #[test]
    fn small_catalog_is_rejected() {
        let catalog = catalog(3);
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate_question(&catalog.terms()[0], &catalog, &mut rng).unwrap_err();
        assert_eq!(
            err,
            QuizError::CatalogTooSmall {
                available: 3,
                required: 4
            }
        );
    }

    #[test]
    fn foreign_term_is_rejected() {
        let catalog = catalog(5);
        let stranger = term(99, "Kubernetes", "DevOps", Difficulty::Advanced);
        let mut rng = StdRng::seed_from_u64(0);
        let err = generate_question(&stranger, &catalog, &mut rng).unwrap_err();
        assert_eq!(err, QuizError::TermNotInCatalog(TermId::new(99)));
    }
}

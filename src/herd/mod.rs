//! Answer clustering and scoring engine
//!
//! Everything in here is synchronous and free of I/O. The room service reads
//! answers and scores from the store, calls [`HerdEngine::evaluate`], and
//! writes the outcome back.

mod answers;
mod grouping;
mod outcome;
mod scoring;
mod similarity;

pub use answers::{Answer, AnswerSheet};
pub use grouping::{group_answers, AnswerGroup};
pub use outcome::{select_herd, HerdOutcome};
pub use scoring::{ScoreEntry, ScoreTable};
pub use similarity::{clean_answer, similarity};

/// Minimum similarity for two answers to count as the same
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// A herd needs at least this many answers to be computed
pub const MIN_ANSWERS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HerdError {
    #[error("Need at least {MIN_ANSWERS} answers to determine the herd, got {0}")]
    InsufficientAnswers(usize),

    #[error("Similarity threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),
}

/// Everything one reveal produces
#[derive(Debug, Clone, PartialEq)]
pub struct RoundEvaluation {
    /// All groups in creation order
    pub groups: Vec<AnswerGroup>,
    pub outcome: HerdOutcome,
    /// Prior scores with this round's points added
    pub scores: ScoreTable,
    /// Players that gained a point, with their new totals
    pub awarded: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HerdEngine {
    threshold: f64,
}

impl Default for HerdEngine {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl HerdEngine {
    pub fn new(threshold: f64) -> Result<Self, HerdError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(HerdError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn group(&self, answers: &AnswerSheet) -> Vec<AnswerGroup> {
        group_answers(answers, self.threshold)
    }

    /// Group the answers, pick the herd, and score it against `prior`.
    ///
    /// `prior` is left untouched. Calling this twice with the same inputs
    /// awards the points twice; the caller decides when a round is scored.
    pub fn evaluate(
        &self,
        answers: &AnswerSheet,
        prior: &ScoreTable,
    ) -> Result<RoundEvaluation, HerdError> {
        if answers.len() < MIN_ANSWERS {
            return Err(HerdError::InsufficientAnswers(answers.len()));
        }

        let groups = self.group(answers);
        let outcome = select_herd(groups.clone());

        let mut scores = prior.clone();
        let awarded = match &outcome {
            HerdOutcome::Herd(herd) => scores.award(herd),
            HerdOutcome::Tie(_) | HerdOutcome::NoGroups => Vec::new(),
        };

        Ok(RoundEvaluation {
            groups,
            outcome,
            scores,
            awarded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(pairs: &[(&str, &str)]) -> AnswerSheet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_pizza_round() {
        let engine = HerdEngine::default();
        let answers = sheet(&[("A", "pizza"), ("B", "Pizza!"), ("C", "tacos")]);
        let prior: ScoreTable = [("C", 4)].into_iter().collect();

        let eval = engine.evaluate(&answers, &prior).unwrap();

        let herd = eval.outcome.herd().expect("pizza should win");
        assert_eq!(herd.representative, "pizza");
        assert_eq!(herd.players, vec!["A", "B"]);
        assert_eq!(eval.scores.get("A"), 1);
        assert_eq!(eval.scores.get("B"), 1);
        assert_eq!(eval.scores.get("C"), 4);
        assert_eq!(eval.awarded.len(), 2);
        assert_eq!(prior.get("A"), 0);
    }

    #[test]
    fn test_tie_changes_nothing() {
        let engine = HerdEngine::default();
        let answers = sheet(&[("A", "red"), ("B", "red"), ("C", "blue"), ("D", "blue")]);
        let prior: ScoreTable = [("A", 1), ("D", 2)].into_iter().collect();

        let eval = engine.evaluate(&answers, &prior).unwrap();

        assert!(eval.outcome.is_tie());
        assert_eq!(eval.scores, prior);
        assert!(eval.awarded.is_empty());
    }

    #[test]
    fn test_all_dissimilar_is_tie_with_one_group_each() {
        let engine = HerdEngine::default();
        let answers = sheet(&[("A", "red"), ("B", "blue"), ("C", "green"), ("D", "yellow")]);

        let eval = engine.evaluate(&answers, &ScoreTable::new()).unwrap();

        match eval.outcome {
            HerdOutcome::Tie(groups) => assert_eq!(groups.len(), 4),
            other => panic!("expected tie, got {other:?}"),
        }
        assert!(eval.scores.is_empty());
    }

    #[test]
    fn test_majority_scores_exactly_once() {
        let engine = HerdEngine::default();
        let answers = sheet(&[
            ("A", "dog"),
            ("B", "cat"),
            ("C", "dog"),
            ("D", "DOG"),
            ("E", "parrot"),
        ]);

        let eval = engine.evaluate(&answers, &ScoreTable::new()).unwrap();

        assert_eq!(eval.outcome.herd().unwrap().players, vec!["A", "C", "D"]);
        for (player, expected) in [("A", 1), ("B", 0), ("C", 1), ("D", 1), ("E", 0)] {
            assert_eq!(eval.scores.get(player), expected, "{player}");
        }
    }

    #[test]
    fn test_repeated_evaluation_is_deterministic_and_accumulates() {
        let engine = HerdEngine::default();
        let answers = sheet(&[("A", "pizza"), ("B", "Pizza!"), ("C", "tacos")]);

        let first = engine.evaluate(&answers, &ScoreTable::new()).unwrap();
        let again = engine.evaluate(&answers, &ScoreTable::new()).unwrap();
        assert_eq!(first, again);

        let second = engine.evaluate(&answers, &first.scores).unwrap();
        assert_eq!(second.scores.get("A"), 2);
    }

    #[test]
    fn test_insufficient_answers() {
        let engine = HerdEngine::default();
        let result = engine.evaluate(&sheet(&[("A", "pizza")]), &ScoreTable::new());
        assert_eq!(result, Err(HerdError::InsufficientAnswers(1)));

        let result = engine.evaluate(&AnswerSheet::new(), &ScoreTable::new());
        assert_eq!(result, Err(HerdError::InsufficientAnswers(0)));
    }

    #[test]
    fn test_threshold_validation() {
        assert!(HerdEngine::new(0.0).is_ok());
        assert!(HerdEngine::new(1.0).is_ok());
        assert!(HerdEngine::new(1.5).is_err());
        assert!(HerdEngine::new(-0.1).is_err());
        assert!(HerdEngine::new(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_threshold_groups_everyone() {
        let engine = HerdEngine::new(0.0).unwrap();
        let eval = engine
            .evaluate(&sheet(&[("A", "x"), ("B", "y"), ("C", "z")]), &ScoreTable::new())
            .unwrap();
        assert_eq!(eval.groups.len(), 1);
        assert_eq!(eval.scores.len(), 3);
    }
}

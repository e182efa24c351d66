use crate::dao::models::PuzzleEntity;

/// Immutable emoji rebus selected for a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Category label shown with the puzzle.
    pub category: String,
    /// Emoji sequence players have to decode.
    pub prompt: String,
    /// Canonical answer, as written in the bank.
    pub answer: String,
    /// Hints revealed one at a time, in order.
    pub hints: Vec<String>,
    /// Wrong answers offered in multiple-choice mode on top of the category pool.
    pub decoys: Vec<String>,
}

impl Puzzle {
    /// Whether `candidate` matches the canonical answer, ignoring case and
    /// surrounding whitespace.
    pub fn is_answer(&self, candidate: &str) -> bool {
        normalize(candidate) == normalize(&self.answer)
    }

    /// Whether the puzzle belongs to `category`, ignoring case.
    pub fn in_category(&self, category: &str) -> bool {
        normalize(&self.category) == normalize(category)
    }

    /// Number of hints that can be revealed for this puzzle.
    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }
}

/// Case-fold and trim a player submission or an answer for comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl From<PuzzleEntity> for Puzzle {
    fn from(value: PuzzleEntity) -> Self {
        Self {
            category: value.category.trim().to_string(),
            prompt: value.emoji,
            answer: value.answer.trim().to_string(),
            hints: value.hints,
            decoys: value.decoys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titanic() -> Puzzle {
        Puzzle {
            category: "Movies".into(),
            prompt: "🚢🧊💔".into(),
            answer: "Titanic".into(),
            hints: vec!["ship".into(), "iceberg".into(), "1912".into()],
            decoys: vec![],
        }
    }

    #[test]
    fn answer_match_ignores_case_and_whitespace() {
        let puzzle = titanic();
        assert!(puzzle.is_answer("titanic"));
        assert!(puzzle.is_answer("  TITANIC \n"));
        assert!(!puzzle.is_answer("titanics"));
        assert!(!puzzle.is_answer("tita nic"));
    }

    #[test]
    fn category_match_ignores_case() {
        assert!(titanic().in_category("movies"));
        assert!(!titanic().in_category("songs"));
    }
}

use thiserror::Error;

use crate::{
    dao::storage::StorageError,
    state::round::{RoundError, RoundId},
};

/// Errors returned by the round controller operations. None of them is fatal
/// to the process; each is scoped to the operation that raised it.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A round is already open in this room.
    #[error("a round is already active (round {round_id})")]
    RoundAlreadyActive {
        /// Round currently open.
        round_id: RoundId,
    },
    /// A choice selection does not match any offered answer.
    #[error("invalid choice index {index} ({available} choices offered)")]
    InvalidChoiceIndex {
        /// Index received.
        index: usize,
        /// Number of choices offered.
        available: usize,
    },
    /// The bank does not hold enough wrong answers for a multiple-choice round.
    #[error("not enough decoys in category `{category}` (need {needed}, found {found})")]
    InsufficientDecoys {
        /// Category of the drawn puzzle.
        category: String,
        /// Decoys required.
        needed: usize,
        /// Decoys available.
        found: usize,
    },
    /// The bank holds no playable puzzle (in the requested category, if any).
    #[error("no puzzle available{}", category_suffix(.category))]
    NoPuzzles {
        /// Requested category.
        category: Option<String>,
    },
    /// The question bank could not be read.
    #[error("question bank unavailable")]
    BankUnavailable(#[source] StorageError),
}

fn category_suffix(category: &Option<String>) -> String {
    category
        .as_deref()
        .map(|c| format!(" in category `{c}`"))
        .unwrap_or_default()
}

impl From<RoundError> for ServiceError {
    fn from(err: RoundError) -> Self {
        match err {
            RoundError::AlreadyActive { round_id } => ServiceError::RoundAlreadyActive { round_id },
            RoundError::InvalidChoiceIndex { index, available } => {
                ServiceError::InvalidChoiceIndex { index, available }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_puzzles_mentions_the_category_when_given() {
        let scoped = ServiceError::NoPuzzles {
            category: Some("Movies".into()),
        };
        assert_eq!(scoped.to_string(), "no puzzle available in category `Movies`");
        let unscoped = ServiceError::NoPuzzles { category: None };
        assert_eq!(unscoped.to_string(), "no puzzle available");
    }

    #[test]
    fn round_errors_map_to_service_errors() {
        let err: ServiceError = RoundError::InvalidChoiceIndex {
            index: 9,
            available: 8,
        }
        .into();
        assert!(matches!(
            err,
            ServiceError::InvalidChoiceIndex {
                index: 9,
                available: 8
            }
        ));
    }
}

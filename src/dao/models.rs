use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Puzzle record as stored in the question bank file.
///
/// Both the English keys and the legacy Portuguese keys (`categoria`,
/// `resposta`, `dicas`) are accepted so older banks keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct PuzzleEntity {
    /// Category label shown with the puzzle (e.g. "Movies").
    #[serde(alias = "categoria")]
    #[validate(custom(function = "validate_not_blank"))]
    pub category: String,
    /// Emoji sequence players have to decode.
    #[serde(alias = "prompt")]
    #[validate(custom(function = "validate_not_blank"))]
    pub emoji: String,
    /// Canonical answer.
    #[serde(alias = "resposta")]
    #[validate(custom(function = "validate_not_blank"))]
    pub answer: String,
    /// Hints revealed one at a time, in order.
    #[serde(default, alias = "dicas")]
    #[validate(custom(function = "validate_hints"))]
    pub hints: Vec<String>,
    /// Extra wrong answers offered in multiple-choice mode.
    #[serde(default)]
    pub decoys: Vec<String>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn validate_hints(hints: &[String]) -> Result<(), ValidationError> {
    if let Some(position) = hints.iter().position(|hint| hint.trim().is_empty()) {
        let mut err = ValidationError::new("blank_hint");
        err.message = Some(format!("hint #{} must not be blank", position + 1).into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_legacy_portuguese_keys() {
        let raw = r#"{"categoria":"Filmes","emoji":"🚢🧊","resposta":"Titanic","dicas":["navio","iceberg"]}"#;
        let entity: PuzzleEntity = serde_json::from_str(raw).unwrap();
        assert_eq!(entity.category, "Filmes");
        assert_eq!(entity.answer, "Titanic");
        assert_eq!(entity.hints, vec!["navio", "iceberg"]);
        assert!(entity.decoys.is_empty());
        assert!(entity.validate().is_ok());
    }

    #[test]
    fn rejects_blank_answer() {
        let entity = PuzzleEntity {
            category: "Movies".into(),
            emoji: "🦁👑".into(),
            answer: "   ".into(),
            hints: vec![],
            decoys: vec![],
        };
        assert!(entity.validate().is_err());
    }

    #[test]
    fn rejects_blank_hint() {
        let entity = PuzzleEntity {
            category: "Movies".into(),
            emoji: "🦁👑".into(),
            answer: "The Lion King".into(),
            hints: vec!["Disney".into(), "".into()],
            decoys: vec![],
        };
        assert!(entity.validate().is_err());
    }
}

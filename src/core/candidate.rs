use serde::{Deserialize, Serialize};

use crate::core::TypeTag;

/// Scores strictly above this value are reported as confident matches
pub const MATCH_THRESHOLD: u8 = 95;

/// A `(name, identifier)` pair extracted from one upstream entry, before scoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    /// Display label, surrounding whitespace retained
    pub name: String,

    /// Opaque identifier from the provider (e.g. `300021476`)
    pub result_id: String,
}

impl RawMatch {
    pub fn new(name: impl Into<String>, result_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result_id: result_id.into(),
        }
    }
}

/// One reconciliation candidate, serialized in the shape OpenRefine expects:
///
/// ```json
/// {"id": "http://vocab.getty.edu/aat/300021476", "name": "Neo-Romantic ",
///  "score": 80, "match": false, "type": [{"id": "AATGetTermMatch", "name": "AAT term"}]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Fully-qualified resource URI
    pub id: String,

    /// Label as returned by the provider
    pub name: String,

    /// Similarity to the query (0 - 100)
    pub score: u8,

    /// `score > MATCH_THRESHOLD`
    #[serde(rename = "match")]
    pub is_match: bool,

    /// Type descriptors of the query index this candidate came from
    #[serde(rename = "type")]
    pub types: Vec<TypeTag>,
}

impl Candidate {
    /// Build a candidate; the score is clamped to 100 and `is_match` derived from it
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        score: u8,
        types: Vec<TypeTag>,
    ) -> Self {
        let score = score.min(100);
        Self {
            id: id.into(),
            name: name.into(),
            score,
            is_match: is_confident(score),
            types,
        }
    }
}

/// Whether a score counts as a confident match
pub fn is_confident(score: u8) -> bool {
    score > MATCH_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aat_type() -> Vec<TypeTag> {
        vec![TypeTag::new("AATGetTermMatch", "AAT term")]
    }

    #[test]
    fn test_match_threshold_is_exclusive() {
        assert!(!Candidate::new("x", "n", 95, aat_type()).is_match);
        assert!(Candidate::new("x", "n", 96, aat_type()).is_match);
        assert!(Candidate::new("x", "n", 100, aat_type()).is_match);
        assert!(!Candidate::new("x", "n", 0, aat_type()).is_match);
    }

    #[test]
    fn test_score_is_clamped() {
        let candidate = Candidate::new("x", "n", 250, aat_type());
        assert_eq!(candidate.score, 100);
        assert!(candidate.is_match);
    }

    #[test]
    fn test_json_shape() {
        let candidate = Candidate::new(
            "http://vocab.getty.edu/aat/300021476",
            "Neo-Romantic ",
            80,
            aat_type(),
        );
        let json = serde_json::to_value(&candidate).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "http://vocab.getty.edu/aat/300021476",
                "name": "Neo-Romantic ",
                "score": 80,
                "match": false,
                "type": [{"id": "AATGetTermMatch", "name": "AAT term"}]
            })
        );
    }
}

pub mod token_sort;

use crate::core::RawMatch;

pub use token_sort::{token_sort_ratio, TokenSortRanker};

/// Reconciliation clients only display this many candidates
pub const MAX_RESULTS: usize = 10;

/// Trait for similarity scoring implementations
pub trait Ranker: Send + Sync {
    /// Similarity of `name` to `query`, 0 - 100
    fn score(&self, query: &str, name: &str) -> u8;

    /// Get ranker name for logging
    fn name(&self) -> &str;

    /// Score every match and sort by score descending.
    ///
    /// The sort is stable: equal scores keep extraction order.
    fn rank(&self, query: &str, matches: Vec<RawMatch>) -> Vec<RankedCandidate> {
        let mut ranked: Vec<RankedCandidate> = matches
            .into_iter()
            .map(|raw| {
                let score = self.score(query, &raw.name).min(100);
                RankedCandidate { raw, score }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

/// Match with similarity score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCandidate {
    pub raw: RawMatch,
    pub score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores by name length so ties are easy to construct
    struct LengthRanker;

    impl Ranker for LengthRanker {
        fn score(&self, _query: &str, name: &str) -> u8 {
            name.len() as u8
        }

        fn name(&self) -> &str {
            "length"
        }
    }

    #[test]
    fn test_rank_is_stable_descending() {
        let matches = vec![
            RawMatch::new("aa", "1"),
            RawMatch::new("bbbb", "2"),
            RawMatch::new("cc", "3"),
            RawMatch::new("dddd", "4"),
            RawMatch::new("e", "5"),
        ];

        let ranked = LengthRanker.rank("ignored", matches);
        let ids: Vec<&str> = ranked.iter().map(|r| r.raw.result_id.as_str()).collect();

        assert_eq!(ids, vec!["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(LengthRanker.rank("q", Vec::new()).is_empty());
    }
}

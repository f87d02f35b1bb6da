use rapidfuzz::distance::indel;

use crate::ranking::Ranker;

/// Word-order insensitive ranker.
///
/// Both strings are reduced to lowercase word tokens, the tokens are
/// sorted and rejoined, and the normalized Indel similarity of the two
/// results is reported on a 0 - 100 scale.
pub struct TokenSortRanker;

impl TokenSortRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokenSortRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker for TokenSortRanker {
    fn score(&self, query: &str, name: &str) -> u8 {
        token_sort_ratio(query, name)
    }

    fn name(&self) -> &str {
        "token_sort"
    }
}

/// Token-sort similarity of two strings, 0 - 100
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);

    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let similarity = indel::normalized_similarity(a.chars(), b.chars());
    (similarity * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
}

/// Latin-1 supplement dropped, non-word characters blanked, lowercased
fn preprocess(text: &str) -> String {
    text.chars()
        .filter(|c| !('\u{80}'..='\u{FF}').contains(c))
        .flat_map(|c| {
            let c = if c.is_alphanumeric() || c == '_' { c } else { ' ' };
            c.to_lowercase()
        })
        .collect()
}

fn sorted_tokens(text: &str) -> String {
    let processed = preprocess(text);
    let mut tokens: Vec<&str> = processed.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

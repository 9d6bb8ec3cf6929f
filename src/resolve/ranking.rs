use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{DirectoryEntry, Suggestion};
use crate::utils::normalize_symbol;

/// Orders directory entries by how close they are to a missed symbol.
pub trait SuggestionRanker: Send + Sync {
    fn rank(&self, query: &str, entries: &[DirectoryEntry], limit: usize) -> Vec<Suggestion>;
}

/// Default ranking: normalized edit distance between the query and the NSE
/// code, plus bonuses when the code starts with or contains the query or the
/// company title mentions it. Ties keep directory order. No cut-off score.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker;

const PREFIX_BONUS: f64 = 0.5;
const CONTAINS_BONUS: f64 = 0.25;
const TITLE_BONUS: f64 = 0.1;

impl SimilarityRanker {
    pub fn score(query: &str, code: &str, title: Option<&str>) -> f64 {
        let query = normalize_symbol(query);
        let code = normalize_symbol(code);
        if query.is_empty() || code.is_empty() {
            return 0.0;
        }

        let longest = query.chars().count().max(code.chars().count()) as f64;
        let mut score = 1.0 - levenshtein(&query, &code) as f64 / longest;

        if code.starts_with(&query) {
            score += PREFIX_BONUS;
        } else if code.contains(&query) {
            score += CONTAINS_BONUS;
        }

        let mentioned = title
            .map(|title| normalize_symbol(title).contains(&query))
            .unwrap_or(false);
        if mentioned {
            score += TITLE_BONUS;
        }

        score
    }
}

impl SuggestionRanker for SimilarityRanker {
    fn rank(&self, query: &str, entries: &[DirectoryEntry], limit: usize) -> Vec<Suggestion> {
        let mut seen = HashSet::new();
        let mut suggestions: Vec<Suggestion> = entries
            .iter()
            .filter_map(|entry| {
                let code = entry.nse_code.as_deref()?;
                seen.insert(code.to_uppercase()).then(|| Suggestion {
                    symbol: code.to_uppercase(),
                    title: entry.title.clone(),
                    score: Self::score(query, code, entry.title.as_deref()),
                })
            })
            .collect();

        suggestions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        suggestions.truncate(limit);
        suggestions
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

//! Relevance math: scaled term frequency, document frequency, TF-IDF with
//! property-length normalization, and weighted Levenshtein distance.

use crate::Posting;
use std::collections::HashSet;

/// Scaled term frequency of a token within one document.
///
/// `postings` are the token's postings for a single document, one per matched
/// property. Returns `occurrences / tokens` summed over those properties, or
/// `0.0` when nothing matched.
pub fn term_frequency<'a, I>(postings: I) -> f64
where
    I: IntoIterator<Item = &'a Posting>,
{
    let (occurrences, length) = postings
        .into_iter()
        .fold((0usize, 0usize), |(occ, len), p| (occ + p.frequency(), len + p.property_length));
    if length == 0 {
        return 0.0;
    }
    occurrences as f64 / length as f64
}

/// Number of distinct documents among a token's postings.
pub fn document_frequency(postings: &[Posting]) -> usize {
    postings.iter().map(|p| p.doc_id).collect::<HashSet<_>>().len()
}

/// `tf * ln(n / (1 + df))`. The `1 + df` keeps the result finite for `df = 0`.
pub fn tf_idf(tf: f64, df: usize, n: usize) -> f64 {
    tf * (n as f64 / (1 + df) as f64).ln()
}

/// Divides a TF-IDF value by how long the matched properties are relative to
/// their corpus averages, favouring matches in short fields.
pub fn normalized_score(tf_idf: f64, total_property_length: usize, total_average_length: f64) -> f64 {
    if total_property_length == 0 {
        return tf_idf;
    }
    tf_idf / (total_property_length as f64 / (1.0 + total_average_length))
}

/// Per-operation weights for [`levenshtein_with_costs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditCosts {
    pub deletion: usize,
    pub insertion: usize,
    pub substitution: usize,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self { deletion: 1, insertion: 1, substitution: 1 }
    }
}

/// Edit distance with unit costs, counted in Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    levenshtein_with_costs(a, b, EditCosts::default())
}

/// Dynamic-programming edit distance over an `(|a|+1) x (|b|+1)` table.
///
/// Moving along `b` (`dp[i][j-1]`) is charged `deletion`, moving along `a`
/// (`dp[i-1][j]`) is charged `insertion`.
pub fn levenshtein_with_costs(a: &str, b: &str, costs: EditCosts) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in dp[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1]
            } else {
                (dp[i - 1][j - 1] + costs.substitution)
                    .min(dp[i][j - 1] + costs.deletion)
                    .min(dp[i - 1][j] + costs.insertion)
            };
        }
    }
    dp[a.len()][b.len()]
}

use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where and how often a token occurs within one property of one document.
///
/// `offsets` are the token's positions in the property's token stream, so
/// `offsets.len()` is the raw occurrence count. `property_length` is the total
/// number of tokens in that property and is shared by every posting for the
/// same `(doc_id, property)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub property: String,
    pub property_length: usize,
    pub offsets: Vec<usize>,
}

impl Posting {
    /// Raw number of occurrences of the token in the property.
    pub fn frequency(&self) -> usize {
        self.offsets.len()
    }
}

/// Builds one posting per distinct token of a property's token stream.
///
/// Tokens keep their first-seen order. Empty tokens are dropped before
/// positions are assigned.
pub fn postings_for_property(doc_id: DocId, property: &str, tokens: &[String]) -> Vec<(String, Posting)> {
    let tokens: Vec<&String> = tokens.iter().filter(|t| !t.is_empty()).collect();
    let property_length = tokens.len();
    let mut order: Vec<&str> = Vec::new();
    let mut positions: HashMap<&str, Vec<usize>> = HashMap::new();
    for (pos, &token) in tokens.iter().enumerate() {
        positions
            .entry(token.as_str())
            .or_insert_with(|| {
                order.push(token.as_str());
                Vec::new()
            })
            .push(pos);
    }

    order
        .into_iter()
        .map(|token| {
            let offsets = positions.remove(token).unwrap_or_default();
            let posting = Posting { doc_id, property: property.to_string(), property_length, offsets };
            (token.to_string(), posting)
        })
        .collect()
}

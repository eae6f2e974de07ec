use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Search text plus the properties to match against.
///
/// `selected_properties == None` searches every property. An explicitly empty
/// set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub selected_properties: Option<HashSet<String>>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), selected_properties: None }
    }

    /// Restricts matching to `properties`. Repeated calls accumulate; calling
    /// with no names selects the empty set.
    pub fn select<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_properties
            .get_or_insert_with(HashSet::new)
            .extend(properties.into_iter().map(Into::into));
        self
    }

    pub fn is_selected(&self, property: &str) -> bool {
        self.selected_properties.as_ref().map_or(true, |props| props.contains(property))
    }
}

impl From<&str> for SearchQuery {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SearchQuery {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&String> for SearchQuery {
    fn from(text: &String) -> Self {
        Self::new(text.as_str())
    }
}

/// A document matched by one query token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: DocId,
    /// Higher is more relevant.
    pub score: f64,
    /// The query token that matched.
    pub match_term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteSuggestion {
    /// Edit distance to the query divided by the suggestion length. Lower is closer.
    pub score: f64,
    pub suggestion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_query_with_text() {
        let q = SearchQuery::from("foo");
        assert_eq!(q.text, "foo");
        assert!(q.selected_properties.is_none());
        assert!(q.is_selected("anything"));
    }

    #[test]
    fn select_accumulates() {
        let q = SearchQuery::new("foo").select(["title"]).select(vec!["author".to_string()]);
        let props = q.selected_properties.clone().unwrap();
        assert_eq!(props.len(), 2);
        assert!(q.is_selected("author"));
        assert!(!q.is_selected("body"));
    }

    #[test]
    fn empty_select_matches_nothing() {
        let q = SearchQuery::new("foo").select(Vec::<String>::new());
        assert_eq!(q.selected_properties, Some(HashSet::new()));
        assert!(!q.is_selected("title"));
    }

    #[test]
    fn deserializes_without_selection() {
        let q: SearchQuery = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert_eq!(q, SearchQuery::new("x"));
    }
}

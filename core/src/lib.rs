//! Embeddable in-memory full-text search.
//!
//! Documents are mapped to an id and named text properties by a
//! [`DocumentAdapter`], turned into tokens by a [`Pipeline`] and stored in a
//! trie-backed [`InvertedIndex`] of offset-bearing [`Posting`]s. Queries are
//! ranked with length-normalized TF-IDF; autocomplete ranks indexed tokens by
//! edit distance to the typed prefix.
//!
//! ```
//! use ftsearch::{Pipeline, Schema, SearchEngine, SearchQuery};
//!
//! struct Sentence { id: u32, text: String }
//!
//! let schema = Schema::<Sentence>::builder()
//!     .id(|s| s.id)
//!     .text("text", |s| s.text.as_str())
//!     .build()?;
//! let mut fts = SearchEngine::new(schema, Pipeline::literal());
//! fts.add(&Sentence { id: 1, text: "the cat sat".into() })?;
//! fts.add(&Sentence { id: 2, text: "the dog sat".into() })?;
//!
//! let hits = fts.search("cat")?;
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].document_id, 1);
//! assert!(fts.search(SearchQuery::new("cat").select(["title"]))?.is_empty());
//! # Ok::<(), ftsearch::Error>(())
//! ```

pub mod engine;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod posting;
pub mod query;
pub mod rank;
pub mod schema;
pub mod tokenizer;

pub use engine::SearchEngine;
pub use error::{Error, PipelineStepError, Result, SchemaError, StepError};
pub use index::InvertedIndex;
pub use pipeline::{Pipeline, PipelineStep};
pub use posting::Posting;
pub use query::{AutocompleteSuggestion, SearchQuery, SearchResult};
pub use rank::EditCosts;
pub use schema::{DocumentAdapter, JsonAdapter, Property, Schema};

pub type DocId = u32;

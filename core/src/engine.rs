use crate::error::Result;
use crate::index::InvertedIndex;
use crate::pipeline::Pipeline;
use crate::posting::{postings_for_property, Posting};
use crate::query::{AutocompleteSuggestion, SearchQuery, SearchResult};
use crate::rank::{self, EditCosts};
use crate::schema::{DocumentAdapter, Property};
use crate::DocId;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

#[derive(Debug, Default, Clone)]
struct PropertyStats {
    total_length: usize,
    documents: usize,
}

impl PropertyStats {
    fn average(&self) -> f64 {
        if self.documents == 0 {
            return 0.0;
        }
        self.total_length as f64 / self.documents as f64
    }
}

/// What was indexed for a document, kept so removal never re-tokenizes.
#[derive(Debug, Clone)]
struct DocEntry {
    tokens: Vec<String>,
    lengths: Vec<(String, usize)>,
}

/// Everything `add` will write, computed before any state changes.
struct Staged {
    postings: Vec<(String, Posting)>,
    lengths: Vec<(String, usize)>,
}

/// In-memory full-text index over documents resolved through an adapter.
///
/// Not synchronized: wrap it in a lock (or a single-writer queue) before
/// sharing it between threads.
#[derive(Debug)]
pub struct SearchEngine<A> {
    adapter: A,
    pipeline: Pipeline,
    index: InvertedIndex,
    docs: HashMap<DocId, DocEntry>,
    stats: HashMap<String, PropertyStats>,
}

impl<A> SearchEngine<A> {
    pub fn new(adapter: A, pipeline: Pipeline) -> Self {
        Self { adapter, pipeline, index: InvertedIndex::new(), docs: HashMap::new(), stats: HashMap::new() }
    }

    /// Engine using [`Pipeline::standard`].
    pub fn with_adapter(adapter: A) -> Self {
        Self::new(adapter, Pipeline::standard())
    }

    pub fn adapter(&self) -> &A { &self.adapter }

    pub fn pipeline(&self) -> &Pipeline { &self.pipeline }

    pub fn inverted_index(&self) -> &InvertedIndex { &self.index }

    /// Number of indexed documents.
    pub fn size(&self) -> usize { self.docs.len() }

    /// Number of distinct tokens in the index.
    pub fn token_count(&self) -> usize { self.index.len() }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.docs.contains_key(&doc_id)
    }

    /// Snapshot of the indexed document ids, ascending.
    pub fn doc_ids(&self) -> Vec<DocId> {
        let mut ids: Vec<DocId> = self.docs.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Mean token length of `property` over the documents currently indexed.
    pub fn average_length(&self, property: &str) -> Option<f64> {
        self.stats.get(property).map(PropertyStats::average)
    }

    /// Indexes `doc` and returns how many tokens it introduced to the index.
    ///
    /// A document whose id is already present is left alone and `0` is
    /// returned. On error nothing is modified.
    pub fn add<D: ?Sized>(&mut self, doc: &D) -> Result<usize>
    where
        A: DocumentAdapter<D>,
    {
        let doc_id = self.adapter.doc_id(doc)?;
        if self.docs.contains_key(&doc_id) {
            debug!(doc_id, "document already indexed");
            return Ok(0);
        }
        let staged = self.stage(doc_id, doc)?;
        Ok(self.commit(doc_id, staged))
    }

    /// Adds every document in order, stopping at the first error. Documents
    /// added before the failure stay indexed.
    pub fn add_all<'d, D, I>(&mut self, docs: I) -> Result<usize>
    where
        D: ?Sized + 'd,
        I: IntoIterator<Item = &'d D>,
        A: DocumentAdapter<D>,
    {
        let mut new_tokens = 0;
        for doc in docs {
            new_tokens += self.add(doc)?;
        }
        Ok(new_tokens)
    }

    fn stage<D: ?Sized>(&self, doc_id: DocId, doc: &D) -> Result<Staged>
    where
        A: DocumentAdapter<D>,
    {
        // Same-named properties are indexed as one token stream.
        let mut streams: Vec<(String, Vec<String>)> = Vec::new();
        for Property { name, text } in self.adapter.properties(doc)? {
            let tokens = self.pipeline.process(&text)?;
            match streams.iter_mut().find(|(n, _)| *n == name) {
                Some((_, existing)) => existing.extend(tokens),
                None => streams.push((name.into_owned(), tokens)),
            }
        }

        let mut staged = Staged { postings: Vec::new(), lengths: Vec::with_capacity(streams.len()) };
        for (property, tokens) in streams {
            let postings = postings_for_property(doc_id, &property, &tokens);
            let length = postings.first().map_or(0, |(_, p)| p.property_length);
            trace!(doc_id, property = %property, length, distinct = postings.len(), "tokenized property");
            staged.postings.extend(postings);
            staged.lengths.push((property, length));
        }
        Ok(staged)
    }

    fn commit(&mut self, doc_id: DocId, staged: Staged) -> usize {
        let mut new_tokens = 0;
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for (token, posting) in staged.postings {
            if !self.index.contains(&token) {
                new_tokens += 1;
            }
            self.index.put(&token, posting);
            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        }
        for (property, length) in &staged.lengths {
            let stats = self.stats.entry(property.clone()).or_default();
            stats.total_length += length;
            stats.documents += 1;
        }
        self.docs.insert(doc_id, DocEntry { tokens, lengths: staged.lengths });
        debug!(doc_id, new_tokens, token_count = self.index.len(), "indexed document");
        new_tokens
    }

    /// Removes `doc` from the index. Unknown documents are ignored.
    pub fn remove<D: ?Sized>(&mut self, doc: &D) -> Result<()>
    where
        A: DocumentAdapter<D>,
    {
        let doc_id = self.adapter.doc_id(doc)?;
        self.remove_id(doc_id);
        Ok(())
    }

    /// Removes the document with `doc_id`, returning whether it was indexed.
    pub fn remove_id(&mut self, doc_id: DocId) -> bool {
        let Some(entry) = self.docs.remove(&doc_id) else {
            return false;
        };
        let pruned = self.index.remove_document(doc_id, entry.tokens.iter().map(String::as_str));
        for (property, length) in entry.lengths {
            if let Some(stats) = self.stats.get_mut(&property) {
                stats.total_length -= length;
                stats.documents -= 1;
                if stats.documents == 0 {
                    self.stats.remove(&property);
                }
            }
        }
        debug!(doc_id, pruned, token_count = self.index.len(), "removed document");
        true
    }

    /// Exact-token search for the query text and every token the pipeline
    /// derives from it, most relevant first.
    ///
    /// One result is produced per (query token, document) pair, so a document
    /// can appear once for each variant of the query that matched it.
    pub fn search(&self, query: impl Into<SearchQuery>) -> Result<Vec<SearchResult>> {
        let query = query.into();
        if query.text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut terms = vec![query.text.clone()];
        for token in self.pipeline.process(&query.text)? {
            if !token.is_empty() && !terms.contains(&token) {
                terms.push(token);
            }
        }

        let n = self.docs.len();
        let mut results = Vec::new();
        for term in &terms {
            let Some(postings) = self.index.get(term) else {
                continue;
            };
            let df = rank::document_frequency(postings);
            let mut by_doc: BTreeMap<DocId, Vec<&Posting>> = BTreeMap::new();
            for posting in postings.iter().filter(|p| query.is_selected(&p.property)) {
                by_doc.entry(posting.doc_id).or_default().push(posting);
            }
            for (doc_id, matched) in by_doc {
                results.push(SearchResult { document_id: doc_id, score: self.score(&matched, df, n), match_term: term.clone() });
            }
        }

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.document_id.cmp(&b.document_id))
                .then_with(|| a.match_term.cmp(&b.match_term))
        });
        debug!(query = %query.text, terms = terms.len(), hits = results.len(), "search");
        Ok(results)
    }

    fn score(&self, matched: &[&Posting], df: usize, n: usize) -> f64 {
        let tf = rank::term_frequency(matched.iter().copied());
        let total_length: usize = matched.iter().map(|p| p.property_length).sum();
        let total_average: f64 = matched.iter().filter_map(|p| self.average_length(&p.property)).sum();
        rank::normalized_score(rank::tf_idf(tf, df, n), total_length, total_average)
    }

    /// Indexed tokens starting with `query`, closest first.
    ///
    /// The query is matched as typed, without running the pipeline. A blank
    /// query returns nothing rather than every indexed token.
    pub fn autocomplete(&self, query: &str) -> Vec<AutocompleteSuggestion> {
        self.autocomplete_with_costs(query, EditCosts::default())
    }

    /// [`SearchEngine::autocomplete`] with weighted edit costs.
    pub fn autocomplete_with_costs(&self, query: &str, costs: EditCosts) -> Vec<AutocompleteSuggestion> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let mut suggestions: Vec<AutocompleteSuggestion> = self
            .index
            .prefix_entries(query)
            .into_iter()
            .map(|(token, _)| {
                let distance = rank::levenshtein_with_costs(query, &token, costs);
                let score = distance as f64 / token.chars().count() as f64;
                AutocompleteSuggestion { score, suggestion: token }
            })
            .collect();
        suggestions.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.suggestion.cmp(&b.suggestion)));
        debug!(query, suggestions = suggestions.len(), "autocomplete");
        suggestions
    }

    /// Drops every document, token and property statistic.
    pub fn clear(&mut self) {
        self.docs.clear();
        self.stats.clear();
        self.index.clear();
        debug!("cleared index");
    }
}

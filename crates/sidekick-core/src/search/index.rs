use super::tokenizer::tokenize;
use crate::constants::search::{BM25_B, BM25_D, BM25_K, FUZZY_DISTANCE, FUZZY_WEIGHT, PREFIX_WEIGHT};
use crate::submenu::SubmenuItem;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;

/// Indexed fields, in storage order.
const FIELD_COUNT: usize = 2;
const TITLE: usize = 0;
const DESCRIPTION: usize = 1;

/// How query terms are expanded against the index vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Also match indexed terms that start with a query term.
    pub prefix: bool,
    /// Maximum edit distance for fuzzy matches. Zero disables fuzzy matching.
    pub fuzzy: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            prefix: true,
            fuzzy: FUZZY_DISTANCE,
        }
    }
}

/// A matching item and its relevance. Higher is better.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub item: SubmenuItem,
    pub score: f64,
}

/// Per-field postings of one term: document number to term frequency.
#[derive(Debug, Default)]
struct TermPostings {
    fields: [HashMap<usize, u32>; FIELD_COUNT],
}

/// In-memory full-text index over submenu items.
///
/// `title` and `description` are tokenized and searchable; the whole item is
/// stored and returned with each hit. Items are append-only.
#[derive(Debug, Default)]
pub struct ItemIndex {
    documents: Vec<SubmenuItem>,
    field_lengths: Vec<[usize; FIELD_COUNT]>,
    total_field_lengths: [usize; FIELD_COUNT],
    terms: BTreeMap<String, TermPostings>,
}

impl ItemIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh index over `items`.
    pub fn build(items: impl IntoIterator<Item = SubmenuItem>) -> Self {
        let mut index = Self::new();
        for item in items {
            index.add(item);
        }
        index
    }

    /// Insert one item. Ids must be unique within the index.
    pub fn add(&mut self, item: SubmenuItem) {
        let doc = self.documents.len();
        let mut lengths = [0; FIELD_COUNT];

        for (field, text) in [(TITLE, &item.title), (DESCRIPTION, &item.description)] {
            let tokens = tokenize(text);
            lengths[field] = tokens.len();
            self.total_field_lengths[field] += tokens.len();
            for token in tokens {
                *self
                    .terms
                    .entry(token)
                    .or_default()
                    .fields[field]
                    .entry(doc)
                    .or_insert(0) += 1;
            }
        }

        self.field_lengths.push(lengths);
        self.documents.push(item);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.documents.iter().any(|item| item.id == id)
    }

    /// All items matching any query term, in descending score order.
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        if self.documents.is_empty() {
            return Vec::new();
        }

        let mut query_terms = tokenize(query);
        query_terms.sort();
        query_terms.dedup();
        if query_terms.is_empty() {
            return Vec::new();
        }

        // doc -> (accumulated score, number of query terms matched)
        let mut scores: HashMap<usize, (f64, usize)> = HashMap::new();
        for term in &query_terms {
            for (doc, score) in self.score_term(term, options) {
                let entry = scores.entry(doc).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }

        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .map(|(doc, (score, matched))| (doc, score * matched as f64))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        ranked
            .into_iter()
            .map(|(doc, score)| SearchHit {
                item: self.documents[doc].clone(),
                score,
            })
            .collect()
    }

    fn score_term(&self, term: &str, options: &SearchOptions) -> HashMap<usize, f64> {
        let mut scores = HashMap::new();
        for (indexed, weight) in self.expand_term(term, options) {
            let Some(postings) = self.terms.get(indexed) else {
                continue;
            };
            for field in 0..FIELD_COUNT {
                let docs = &postings.fields[field];
                for (&doc, &frequency) in docs {
                    let score = weight * self.bm25(field, doc, frequency, docs.len());
                    *scores.entry(doc).or_insert(0.0) += score;
                }
            }
        }
        scores
    }

    /// Indexed terms reached by a query term, with their match weight.
    fn expand_term<'a>(&'a self, term: &str, options: &SearchOptions) -> Vec<(&'a str, f64)> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut expansions = Vec::new();
        let term_len = term.chars().count() as f64;

        if let Some((exact, _)) = self.terms.get_key_value(term) {
            seen.insert(exact.as_str());
            expansions.push((exact.as_str(), 1.0));
        }

        if options.prefix {
            for indexed in self
                .terms
                .range::<str, _>((Bound::Included(term), Bound::Unbounded))
                .map(|(key, _)| key.as_str())
                .take_while(|key| key.starts_with(term))
            {
                if seen.insert(indexed) {
                    let distance = indexed.chars().count() as f64 - term_len;
                    let weight = PREFIX_WEIGHT * term_len / (term_len + 0.3 * distance);
                    expansions.push((indexed, weight));
                }
            }
        }

        if options.fuzzy > 0 {
            for indexed in self.terms.keys().map(String::as_str) {
                if seen.contains(indexed) {
                    continue;
                }
                let length_gap = indexed.chars().count().abs_diff(term_len as usize);
                if length_gap > options.fuzzy {
                    continue;
                }
                let distance = strsim::levenshtein(term, indexed);
                if distance <= options.fuzzy {
                    seen.insert(indexed);
                    let weight = FUZZY_WEIGHT * term_len / (term_len + distance as f64);
                    expansions.push((indexed, weight));
                }
            }
        }

        expansions
    }

    /// BM25+ relevance of one term occurrence in one field of one document.
    fn bm25(&self, field: usize, doc: usize, frequency: u32, matching_docs: usize) -> f64 {
        let total_docs = self.documents.len() as f64;
        let matching = matching_docs as f64;
        let idf = (1.0 + (total_docs - matching + 0.5) / (matching + 0.5)).ln();

        let average_length = match self.total_field_lengths[field] {
            0 => 1.0,
            total => total as f64 / total_docs,
        };
        let length = self.field_lengths[doc][field] as f64;
        let tf = frequency as f64;

        idf * (BM25_D
            + tf * (BM25_K + 1.0)
                / (tf + BM25_K * (1.0 - BM25_B + BM25_B * length / average_length)))
    }
}

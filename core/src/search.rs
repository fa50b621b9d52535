use crate::error::Result;
use crate::index::IndexEntry;
use crate::persist::{load_index_lines, load_meta, IndexPaths, MetaFile};
use crate::DocName;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// `dot(a, b) / (|a| * |b|)`, or 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "vectors built from different vocabularies");
    let (mut dot, mut a_sq, mut b_sq) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        a_sq += x * x;
        b_sq += y * y;
    }
    let magnitude = a_sq.sqrt() * b_sq.sqrt();
    if magnitude == 0.0 {
        return 0.0;
    }
    dot / magnitude
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: DocName,
    pub score: f64,
}

/// Top-k documents with a positive score, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub requested: usize,
    pub hits: Vec<ScoredDocument>,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Fewer positive matches than were asked for.
    pub fn is_partial(&self) -> bool {
        !self.hits.is_empty() && self.hits.len() < self.requested
    }
}

/// TF-IDF vectors for every document in a loaded index.
///
/// Slot `i` of every document vector and of every query vector built by the
/// same `Searcher` holds the weight of the `i`-th term in lexicographic order.
#[derive(Debug, Clone)]
pub struct Searcher {
    entries: Vec<IndexEntry>,
    documents: Vec<DocName>,
    vectors: Vec<Vec<f64>>,
    slots: HashMap<String, Vec<usize>>,
}

impl Searcher {
    /// Sort the raw index lines, parse them and build the document vectors.
    pub fn load<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<S> = lines.into_iter().collect();
        let mut order: Vec<usize> = (0..lines.len()).collect();
        order.sort_by(|&a, &b| lines[a].as_ref().cmp(lines[b].as_ref()));
        let entries = order
            .into_iter()
            .map(|i| IndexEntry::parse(lines[i].as_ref(), i + 1))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_entries(entries))
    }

    /// Load `<dir>/index.txt`, plus `meta.json` when the indexer wrote one.
    pub fn open(dir: &Path) -> Result<(Self, Option<MetaFile>)> {
        let paths = IndexPaths::new(dir);
        let searcher = Self::load(load_index_lines(&paths)?)?;
        let meta = load_meta(&paths)?;
        match &meta {
            Some(meta) if meta.num_terms != searcher.dimension() => {
                tracing::warn!(expected = meta.num_terms, found = searcher.dimension(), "index metadata disagrees with index.txt");
            }
            Some(_) => {}
            None => tracing::debug!(dir = %dir.display(), "index has no metadata"),
        }
        Ok((searcher, meta))
    }

    /// Entries are put in line order. A term listed on several lines owns a slot per line.
    pub fn from_entries(mut entries: Vec<IndexEntry>) -> Self {
        entries.sort_by(IndexEntry::line_order);
        let documents: Vec<DocName> = entries
            .iter()
            .flat_map(|e| e.postings.iter().map(|p| p.doc.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut slots: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            slots.entry(entry.term.clone()).or_default().push(i);
        }
        if slots.len() < entries.len() {
            tracing::warn!(lines = entries.len(), terms = slots.len(), "index lists some terms more than once");
        }
        let mut searcher = Self { entries, documents, vectors: Vec::new(), slots };
        searcher.build_document_vectors();
        tracing::debug!(terms = searcher.dimension(), documents = searcher.documents.len(), "built document vectors");
        searcher
    }

    fn build_document_vectors(&mut self) {
        let position: HashMap<&str, usize> =
            self.documents.iter().enumerate().map(|(i, d)| (d.as_str(), i)).collect();
        let mut vectors = vec![vec![0.0; self.entries.len()]; self.documents.len()];
        for (slot, entry) in self.entries.iter().enumerate() {
            for posting in &entry.postings {
                let doc = position[posting.doc.as_str()];
                vectors[doc][slot] += posting.tf as f64 * entry.idf;
            }
        }
        self.vectors = vectors;
    }

    /// Vocabulary size, i.e. the length of every vector.
    pub fn dimension(&self) -> usize {
        self.entries.len()
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.term.as_str())
    }

    /// Document names in the order used for tie-breaking.
    pub fn documents(&self) -> &[DocName] {
        &self.documents
    }

    pub fn document_vector(&self, doc: &str) -> Option<&[f64]> {
        let i = self.documents.binary_search_by(|d| d.as_str().cmp(doc)).ok()?;
        Some(&self.vectors[i])
    }

    /// Weight each index term by its frequency among `terms` times its IDF.
    /// Terms missing from the index contribute nothing.
    pub fn create_query_vector<S: AsRef<str>>(&self, terms: &[S]) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension()];
        for term in terms {
            for &slot in self.slots.get(term.as_ref()).into_iter().flatten() {
                vector[slot] += self.entries[slot].idf;
            }
        }
        vector
    }

    /// Score every document, keep positive scores, best first, at most `k`.
    /// Equal scores keep document-name order.
    pub fn rank(&self, query: &[f64], k: usize) -> Ranking {
        let mut hits: Vec<ScoredDocument> = self
            .documents
            .iter()
            .zip(&self.vectors)
            .map(|(doc, vector)| ScoredDocument { document: doc.clone(), score: cosine_similarity(query, vector) })
            .filter(|hit| hit.score > 0.0)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ranking { requested: k, hits }
    }
}

//! Vector-space retrieval over a flat, line-oriented inverted index.
//!
//! Indexing runs every document through the same analysis chain
//! (tokenize, localise, lowercase, strip commas, drop stopwords, stem) and
//! aggregates raw term frequencies into postings. Searching reloads the
//! persisted lines, builds TF-IDF vectors in lexicographic term order and
//! ranks documents by cosine similarity, optionally refining the query
//! with relevance feedback.

pub mod analysis;
pub mod config;
pub mod error;
pub mod feedback;
pub mod index;
pub mod indexer;
pub mod persist;
pub mod search;
pub mod stemmer;
pub mod tokenizer;

pub use analysis::Analyzer;
pub use config::{AnalyzerConfig, FeedbackWeights, IndexerConfig};
pub use error::{Error, Result};
pub use feedback::{run_feedback_loop, RelevanceJudge, SessionOutcome};
pub use index::{IdfRounding, IndexEntry, InvertedIndex, Posting};
pub use indexer::{index_collection, IndexSummary, Indexer};
pub use search::{cosine_similarity, Ranking, ScoredDocument, Searcher};
pub use stemmer::StemmerKind;

/// Name of a document as it appears in the persisted postings.
pub type DocName = String;

use crate::index::IdfRounding;
use crate::stemmer::StemmerKind;
use std::path::PathBuf;

/// Knobs for the analysis chain shared by documents and queries.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub stemmer: StemmerKind,
    /// Apply NFKC normalization to raw text before tokenizing.
    pub unicode_nfkc: bool,
}

/// Everything one indexing run needs.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub collection: PathBuf,
    pub output: PathBuf,
    pub stopwords: PathBuf,
    /// British-to-American spelling table. `None` disables localisation.
    pub localisation: Option<PathBuf>,
    pub analyzer: AnalyzerConfig,
    /// Number of tokenizing workers; 1 indexes on the calling thread.
    pub jobs: usize,
    pub idf_rounding: IdfRounding,
}

impl IndexerConfig {
    pub fn new(collection: impl Into<PathBuf>, output: impl Into<PathBuf>, stopwords: impl Into<PathBuf>) -> Self {
        Self {
            collection: collection.into(),
            output: output.into(),
            stopwords: stopwords.into(),
            localisation: None,
            analyzer: AnalyzerConfig::default(),
            jobs: 1,
            idf_rounding: IdfRounding::default(),
        }
    }
}

/// Rocchio-style weights applied to the judged centroids.
///
/// Both centroids are added to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackWeights {
    pub relevant: f64,
    pub non_relevant: f64,
}

impl Default for FeedbackWeights {
    fn default() -> Self {
        Self { relevant: 0.5, non_relevant: 0.25 }
    }
}

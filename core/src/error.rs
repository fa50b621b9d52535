use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by indexing and search.
///
/// Everything here is fatal for the run that produced it. Per-document read
/// failures during indexing are logged and skipped instead of being returned.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no stopwords list found at {}", path.display())]
    MissingStopwords {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no index found at {}", path.display())]
    MissingIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("collection {} is missing or contains no readable documents", path.display())]
    EmptyCollection { path: PathBuf },
    #[error("malformed index line {line}: {reason}")]
    MalformedIndexLine { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

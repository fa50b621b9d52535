use crate::analysis::{build_localisation, build_stopwords, Analyzer};
use crate::config::{AnalyzerConfig, IndexerConfig};
use crate::error::{Error, Result};
use crate::index::{IdfRounding, IndexEntry, InvertedIndex};
use crate::persist::{now_rfc3339, save_index, save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use crate::DocName;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Builds one in-memory inverted index from analyzed documents.
#[derive(Debug, Default)]
pub struct Indexer {
    analyzer: Analyzer,
    index: InvertedIndex,
    num_docs: usize,
    config: AnalyzerConfig,
}

impl Indexer {
    /// Load the stopword list (fatal if absent) and, if given, the
    /// localisation table (skipped with a warning if unreadable).
    pub fn new(stopwords: &Path, localisation: Option<&Path>, config: &AnalyzerConfig) -> Result<Self> {
        let stopwords = build_stopwords(stopwords)?;
        let localisation = match localisation {
            Some(path) => build_localisation(path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "localisation table unavailable; spellings left as-is");
                HashMap::new()
            }),
            None => HashMap::new(),
        };
        Ok(Self::with_analyzer(Analyzer::new(stopwords, localisation, config), config.clone()))
    }

    pub fn with_analyzer(analyzer: Analyzer, config: AnalyzerConfig) -> Self {
        Self { analyzer, index: InvertedIndex::new(), num_docs: 0, config }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn tokenise_document(&self, path: &Path) -> Result<Vec<String>> {
        tokenise_file(&self.analyzer, path)
    }

    pub fn tokenise_query(&self, query: &str) -> Vec<String> {
        self.analyzer.tokenise_query(query)
    }

    pub fn index_document(&mut self, doc: &str, terms: &[String]) {
        self.index.index_document(doc, terms);
        self.num_docs += 1;
    }

    /// Fold in a partial index covering `docs` further documents.
    pub fn absorb(&mut self, partial: InvertedIndex, docs: usize) {
        self.index.merge(partial);
        self.num_docs += docs;
    }

    /// Entries in the order their lines sort, which is the order they are written.
    pub fn entries(&self) -> Vec<IndexEntry> {
        let mut entries: Vec<IndexEntry> = self.index.entries(self.num_docs).collect();
        entries.sort_by(IndexEntry::line_order);
        entries
    }

    /// Persist `index.txt` and `meta.json` under `paths`.
    pub fn write(&self, paths: &IndexPaths, rounding: IdfRounding) -> Result<MetaFile> {
        let entries = self.entries();
        let num_terms = save_index(paths, &entries, rounding)?;
        let meta = MetaFile {
            num_docs: self.num_docs,
            num_terms,
            created_at: now_rfc3339(),
            version: FORMAT_VERSION,
            stemmer: self.config.stemmer,
            unicode_nfkc: self.config.unicode_nfkc,
            idf_rounding: rounding,
            stopwords: self.analyzer.stopwords().iter().cloned().collect(),
            localisation: self.analyzer.localisation().iter().map(|(gb, us)| (gb.clone(), us.clone())).collect(),
        };
        save_meta(paths, &meta)?;
        Ok(meta)
    }
}

fn tokenise_file(analyzer: &Analyzer, path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(analyzer.tokenise_document_text(&raw))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    pub documents: usize,
    pub skipped: usize,
    pub terms: usize,
    pub output: PathBuf,
}

/// Regular files under `root`, in file-name order, paired with their document names.
///
/// A document is named by its file stem with commas removed. When two files
/// share a stem the later one is named by its path relative to `root`.
pub fn discover_documents(root: &Path) -> Result<Vec<(DocName, PathBuf)>> {
    if !root.is_dir() {
        return Err(Error::EmptyCollection { path: root.to_path_buf() });
    }
    let mut taken = HashSet::new();
    let mut docs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable collection entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let stem = path.file_stem().map(|s| s.to_string_lossy().replace(',', "")).unwrap_or_default();
        let name = if !stem.is_empty() && !taken.contains(&stem) {
            stem
        } else {
            let relative = path.strip_prefix(root).unwrap_or(path.as_path()).to_string_lossy().replace(',', "");
            tracing::warn!(path = %path.display(), name = %relative, "document name collision; using relative path");
            relative
        };
        taken.insert(name.clone());
        docs.push((name, path));
    }
    if docs.is_empty() {
        return Err(Error::EmptyCollection { path: root.to_path_buf() });
    }
    Ok(docs)
}

/// Index every regular file under the configured collection and write the
/// result to `<output>/index.txt`.
pub fn index_collection(config: &IndexerConfig) -> Result<IndexSummary> {
    let mut indexer = Indexer::new(&config.stopwords, config.localisation.as_deref(), &config.analyzer)?;
    let docs = discover_documents(&config.collection)?;
    tracing::info!(files = docs.len(), jobs = config.jobs, "tokenizing collection");

    let skipped = if config.jobs > 1 {
        index_parallel(&mut indexer, &docs, config.jobs)
    } else {
        index_sequential(&mut indexer, &docs)
    };

    if indexer.num_docs() == 0 {
        return Err(Error::EmptyCollection { path: config.collection.clone() });
    }

    let paths = IndexPaths::new(&config.output);
    let meta = indexer.write(&paths, config.idf_rounding)?;
    tracing::info!(num_docs = meta.num_docs, num_terms = meta.num_terms, skipped, output = %paths.index().display(), "index build complete");

    Ok(IndexSummary { documents: meta.num_docs, skipped, terms: meta.num_terms, output: paths.index() })
}

fn index_sequential(indexer: &mut Indexer, docs: &[(DocName, PathBuf)]) -> usize {
    let mut skipped = 0;
    for (name, path) in docs {
        match indexer.tokenise_document(path) {
            Ok(terms) => {
                tracing::debug!(doc = %name, terms = terms.len(), "indexed document");
                indexer.index_document(name, &terms);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "error reading document; skipped");
                skipped += 1;
            }
        }
    }
    skipped
}

/// Tokenize on scoped workers, each building a partial index merged under a lock.
fn index_parallel(indexer: &mut Indexer, docs: &[(DocName, PathBuf)], jobs: usize) -> usize {
    let merged = Mutex::new((InvertedIndex::new(), 0usize, 0usize));
    let chunk = docs.len().div_ceil(jobs).max(1);
    let analyzer = indexer.analyzer();

    std::thread::scope(|s| {
        for part in docs.chunks(chunk) {
            let merged = &merged;
            s.spawn(move || {
                let mut local = InvertedIndex::new();
                let (mut indexed, mut skipped) = (0, 0);
                for (name, path) in part {
                    match tokenise_file(analyzer, path) {
                        Ok(terms) => {
                            local.index_document(name, &terms);
                            indexed += 1;
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "error reading document; skipped");
                            skipped += 1;
                        }
                    }
                }
                let mut guard = merged.lock();
                guard.0.merge(local);
                guard.1 += indexed;
                guard.2 += skipped;
            });
        }
    });

    let (partial, indexed, skipped) = merged.into_inner();
    indexer.absorb(partial, indexed);
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_names_drop_extension_and_commas() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a,b.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("a,b.md"), "y").unwrap();
        let docs = discover_documents(dir.path()).unwrap();
        let names: Vec<&str> = docs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names[0], "ab");
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
    }

    #[test]
    fn empty_or_missing_collection_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(discover_documents(dir.path()), Err(Error::EmptyCollection { .. })));
        assert!(matches!(discover_documents(&dir.path().join("nope")), Err(Error::EmptyCollection { .. })));
    }

    #[test]
    fn indexing_counts_documents() {
        let mut indexer = Indexer::default();
        let terms = indexer.tokenise_query("cat dog cat");
        indexer.index_document("doc1", &terms);
        assert_eq!(indexer.num_docs(), 1);
        assert_eq!(indexer.index().postings("cat").unwrap()["doc1"], 2);
    }
}

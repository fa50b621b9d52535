use crate::analysis::Analyzer;
use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::index::{IdfRounding, IndexEntry};
use crate::stemmer::StemmerKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "index.txt";
pub const META_FILE: &str = "meta.json";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_terms: usize,
    pub created_at: String,
    pub version: u32,
    pub stemmer: StemmerKind,
    #[serde(default)]
    pub unicode_nfkc: bool,
    pub idf_rounding: IdfRounding,
    /// Stopwords the documents were filtered with.
    #[serde(default)]
    pub stopwords: BTreeSet<String>,
    /// British to American spellings the documents were localised with.
    #[serde(default)]
    pub localisation: BTreeMap<String, String>,
}

impl MetaFile {
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig { stemmer: self.stemmer, unicode_nfkc: self.unicode_nfkc }
    }

    /// The analyzer the index was built with, so queries see the same chain.
    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(
            self.stopwords.iter().cloned().collect(),
            self.localisation.iter().map(|(gb, us)| (gb.clone(), us.clone())).collect(),
            &self.analyzer_config(),
        )
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join(INDEX_FILE) }
    pub fn meta(&self) -> PathBuf { self.root.join(META_FILE) }
}

/// Write one line per entry, in the order given.
pub fn save_index<'a, I>(paths: &IndexPaths, entries: I, rounding: IdfRounding) -> Result<usize>
where
    I: IntoIterator<Item = &'a IndexEntry>,
{
    create_dir_all(&paths.root)?;
    let mut out = BufWriter::new(File::create(paths.index())?);
    let mut written = 0;
    for entry in entries {
        writeln!(out, "{}", entry.to_line(rounding))?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Raw, unsorted index lines. Blank lines are skipped.
pub fn load_index_lines(paths: &IndexPaths) -> Result<Vec<String>> {
    let path = paths.index();
    let f = File::open(&path).map_err(|source| Error::MissingIndex { path: path.clone(), source })?;
    let mut lines = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        lines.push(line);
    }
    Ok(lines)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(paths.meta(), json)?;
    Ok(())
}

/// `Ok(None)` when the index was written without metadata.
pub fn load_meta(paths: &IndexPaths) -> Result<Option<MetaFile>> {
    let text = match fs::read_to_string(paths.meta()) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

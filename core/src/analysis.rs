use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::stemmer::StemmerKind;
use crate::tokenizer::{join_lines, Tokens};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Read a newline-delimited stopword list. A missing file is fatal for indexing.
pub fn build_stopwords<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::MissingStopwords { path: path.to_path_buf(), source })?;
    let words: HashSet<String> = text
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    tracing::debug!(count = words.len(), path = %path.display(), "loaded stopwords");
    Ok(words)
}

/// Read a localisation table: the first half of the lines are British
/// spellings, the second half the American spellings in the same order.
pub fn build_localisation<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(parse_localisation(&text))
}

pub fn parse_localisation(text: &str) -> HashMap<String, String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() % 2 != 0 {
        tracing::warn!(lines = lines.len(), "localisation table has an odd number of lines; trailing entry ignored");
    }
    let (british, american) = lines.split_at(lines.len() / 2);
    british
        .iter()
        .zip(american)
        .map(|(gb, us)| (gb.to_string(), us.to_string()))
        .collect()
}

/// The fixed analysis chain applied to documents and queries alike:
/// tokenize, localise, lowercase, strip commas, drop stopwords, drop empties, stem.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    stopwords: HashSet<String>,
    localisation: HashMap<String, String>,
    stemmer: StemmerKind,
    unicode_nfkc: bool,
}

impl Analyzer {
    pub fn new(stopwords: HashSet<String>, localisation: HashMap<String, String>, config: &AnalyzerConfig) -> Self {
        Self {
            stopwords,
            localisation,
            stemmer: config.stemmer,
            unicode_nfkc: config.unicode_nfkc,
        }
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    pub fn localisation(&self) -> &HashMap<String, String> {
        &self.localisation
    }

    /// Exact, case-sensitive lookup in the localisation table.
    pub fn localise<'a>(&'a self, token: &'a str) -> &'a str {
        self.localisation.get(token).map_or(token, String::as_str)
    }

    /// Localise, then lowercase, then remove commas.
    pub fn normalise(&self, token: &str) -> String {
        self.localise(token).to_lowercase().replace(',', "")
    }

    pub fn is_stopword(&self, term: &str) -> bool {
        self.stopwords.contains(term)
    }

    /// Run the full chain over text whose line breaks are already joined.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let nfkc;
        let text = if self.unicode_nfkc {
            nfkc = text.nfkc().collect::<String>();
            nfkc.as_str()
        } else {
            text
        };
        Tokens::new(text)
            .map(|token| self.normalise(token))
            .filter(|term| !self.is_stopword(term))
            .filter(|term| !term.is_empty())
            .map(|term| self.stemmer.stem(&term))
            .collect()
    }

    /// Analyze raw document contents, joining hyphenated line breaks first.
    pub fn tokenise_document_text(&self, raw: &str) -> Vec<String> {
        self.analyze(&join_lines(raw))
    }

    pub fn tokenise_query(&self, query: &str) -> Vec<String> {
        self.analyze(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer(stopwords: &[&str], table: &str) -> Analyzer {
        Analyzer::new(
            stopwords.iter().map(|s| s.to_string()).collect(),
            parse_localisation(table),
            &AnalyzerConfig::default(),
        )
    }

    #[test]
    fn localisation_pairs_halves() {
        let table = parse_localisation("colour\nColour\norganise\ncolor\nColor\norganize\n");
        assert_eq!(table.len(), 3);
        assert_eq!(table["colour"], "color");
        assert_eq!(table["Colour"], "Color");
        assert_eq!(table["organise"], "organize");
    }

    #[test]
    fn localisation_runs_before_lowercasing() {
        let a = analyzer(&[], "colour\ncolor");
        assert_eq!(a.normalise("colour"), "color");
        // "COLOUR" is not a key, so it only gets lowercased.
        assert_eq!(a.normalise("COLOUR"), "colour");
    }

    #[test]
    fn commas_are_removed_inside_tokens() {
        let a = analyzer(&[], "");
        assert_eq!(a.normalise("1,000,000"), "1000000");
    }

    #[test]
    fn stopwords_and_empties_are_dropped() {
        let a = analyzer(&["the", "and"], "");
        assert_eq!(a.tokenise_query("The cat and ' dog"), vec!["cat", "dog"]);
    }

    #[test]
    fn stemming_runs_last() {
        let a = analyzer(&["running"], "");
        // "running" is a stopword before stemming, "runs" is not.
        assert_eq!(a.tokenise_query("running runs"), vec!["run"]);
    }

    #[test]
    fn document_text_joins_hyphenated_lines() {
        let a = analyzer(&[], "");
        assert_eq!(a.tokenise_document_text("connect-\ned\nnodes"), vec!["connect", "node"]);
    }

    #[test]
    fn nfkc_is_opt_in() {
        let config = AnalyzerConfig { stemmer: StemmerKind::Porter, unicode_nfkc: true };
        let a = Analyzer::new(HashSet::new(), HashMap::new(), &config);
        assert_eq!(a.tokenise_query("ﬁsh"), vec!["fish"]);
    }

    #[test]
    fn missing_stopwords_file_is_an_error() {
        let err = build_stopwords("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, Error::MissingStopwords { .. }));
    }
}

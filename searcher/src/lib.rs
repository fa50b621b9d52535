use anyhow::Result;
use search_core::analysis::{build_localisation, build_stopwords};
use search_core::persist::MetaFile;
use search_core::{
    run_feedback_loop, Analyzer, FeedbackWeights, Ranking, RelevanceJudge, ScoredDocument, Searcher,
    SessionOutcome,
};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub index_dir: PathBuf,
    pub k: usize,
    pub query: String,
    /// Replaces the stopword list stored with the index.
    pub stopwords: Option<PathBuf>,
    /// Replaces the spelling table stored with the index.
    pub localisation: Option<PathBuf>,
    pub format: OutputFormat,
    /// Offer relevance feedback after each ranking (text output only).
    pub feedback: bool,
    pub weights: FeedbackWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
pub struct SearchResponse<'a> {
    pub query: &'a str,
    pub took_s: f64,
    pub requested: usize,
    pub total_hits: usize,
    pub results: &'a [ScoredDocument],
}

/// Console front-end for a search session: prints rankings and reads y/n answers.
pub struct Console<R, W> {
    input: R,
    output: W,
    query: String,
    format: OutputFormat,
    interactive: bool,
    started: Instant,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, options: &SearchOptions) -> Self {
        Self {
            input,
            output,
            query: options.query.clone(),
            format: options.format,
            interactive: options.feedback && options.format == OutputFormat::Text,
            started: Instant::now(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask a yes/no question. End of input counts as no.
    fn ask(&mut self, question: &str) -> search_core::Result<bool> {
        write!(self.output, "{question} (y/n): ")?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            writeln!(self.output)?;
            return Ok(false);
        }
        Ok(matches!(answer.trim_start().chars().next(), Some('y' | 'Y')))
    }

    fn show_text(&mut self, ranking: &Ranking) -> search_core::Result<()> {
        if ranking.is_empty() {
            writeln!(self.output, "No results found for \"{}\".", self.query)?;
            return Ok(());
        }
        if ranking.is_partial() {
            writeln!(self.output, "Only {} of {} requested results found.", ranking.hits.len(), ranking.requested)?;
        }
        for (rank, hit) in ranking.hits.iter().enumerate() {
            writeln!(self.output, "{:>3}. {:<32} {:.4}", rank + 1, hit.document, hit.score)?;
        }
        Ok(())
    }

    fn show_json(&mut self, ranking: &Ranking) -> search_core::Result<()> {
        let response = SearchResponse {
            query: &self.query,
            took_s: self.started.elapsed().as_secs_f64(),
            requested: ranking.requested,
            total_hits: ranking.hits.len(),
            results: &ranking.hits,
        };
        serde_json::to_writer(&mut self.output, &response)?;
        writeln!(self.output)?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> RelevanceJudge for Console<R, W> {
    fn show(&mut self, ranking: &Ranking) -> search_core::Result<()> {
        match self.format {
            OutputFormat::Text => self.show_text(ranking),
            OutputFormat::Json => self.show_json(ranking),
        }
    }

    fn wants_feedback(&mut self, _ranking: &Ranking) -> search_core::Result<bool> {
        if !self.interactive {
            return Ok(false);
        }
        self.ask("Perform relevance feedback?")
    }

    fn is_relevant(&mut self, hit: &ScoredDocument) -> search_core::Result<bool> {
        self.ask(&format!("Is the document '{}' relevant?", hit.document))
    }
}

/// Build the query-side analyzer from the index metadata, so queries run
/// through the chain the documents did. `--stopwords` and `--localisation`
/// replace the stored tables when given.
fn query_analyzer(options: &SearchOptions, meta: Option<&MetaFile>) -> Result<Analyzer> {
    let stored = meta.map(MetaFile::analyzer).unwrap_or_default();
    let config = meta.map(MetaFile::analyzer_config).unwrap_or_default();
    let stopwords = match &options.stopwords {
        Some(path) => build_stopwords(path)?,
        None => stored.stopwords().clone(),
    };
    let localisation = match &options.localisation {
        Some(path) => build_localisation(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "localisation table unavailable; using the index's table");
            stored.localisation().clone()
        }),
        None => stored.localisation().clone(),
    };
    Ok(Analyzer::new(stopwords, localisation, &config))
}

/// Load the index, rank the query, and loop through relevance feedback.
pub fn run_search<J: RelevanceJudge>(options: &SearchOptions, judge: &mut J) -> Result<SessionOutcome> {
    let (searcher, meta) = Searcher::open(&options.index_dir)?;
    let analyzer = query_analyzer(options, meta.as_ref())?;

    let terms = analyzer.tokenise_query(&options.query);
    tracing::info!(query = %options.query, ?terms, k = options.k, "searching");
    let query = searcher.create_query_vector(&terms);
    let outcome = run_feedback_loop(&searcher, query, options.k, options.weights, judge)?;
    tracing::info!(rounds = outcome.rounds, hits = outcome.last.hits.len(), "search complete");
    Ok(outcome)
}

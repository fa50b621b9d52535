use anyhow::Result;
use clap::Parser;
use search_core::FeedbackWeights;
use searcher::{run_search, Console, OutputFormat, SearchOptions};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Rank documents in a TF-IDF index by cosine similarity to a query")]
struct Args {
    /// Index directory containing index.txt
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Number of results to show (at least 1)
    #[arg(long, short, default_value = "10")]
    k: NonZeroUsize,
    /// Stopword list used when the index was built
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Spelling table used when the index was built
    #[arg(long)]
    localisation: Option<PathBuf>,
    /// Print each ranking as a JSON object; disables relevance feedback
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Skip the relevance feedback prompts
    #[arg(long, default_value_t = false)]
    no_feedback: bool,
    /// Query terms
    #[arg(required = true)]
    query: Vec<String>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();
    let options = SearchOptions {
        index_dir: args.index,
        k: args.k.get(),
        query: args.query.join(" "),
        stopwords: args.stopwords,
        localisation: args.localisation,
        format: if args.json { OutputFormat::Json } else { OutputFormat::Text },
        feedback: !args.no_feedback,
        weights: FeedbackWeights::default(),
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), &options);
    run_search(&options, &mut console)?;
    Ok(())
}

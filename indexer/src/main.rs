use anyhow::Result;
use clap::{Parser, Subcommand};
use search_core::{index_collection, AnalyzerConfig, IdfRounding, IndexerConfig, StemmerKind};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a TF-IDF inverted index from a directory of text files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every regular file under a collection directory
    Build {
        /// Collection directory (walked recursively)
        #[arg(long)]
        collection: PathBuf,
        /// Output index directory; index.txt and meta.json are written here
        #[arg(long)]
        output: PathBuf,
        /// Newline-delimited stopword list
        #[arg(long)]
        stopwords: PathBuf,
        /// British/American spelling table (first half British, second half American)
        #[arg(long)]
        localisation: Option<PathBuf>,
        /// Stemming algorithm: porter or snowball
        #[arg(long, default_value_t = StemmerKind::Porter)]
        stemmer: StemmerKind,
        /// NFKC-normalize text before tokenizing
        #[arg(long, default_value_t = false)]
        nfkc: bool,
        /// Number of tokenizing workers
        #[arg(long, default_value_t = 1)]
        jobs: usize,
        /// IDF rounding in index.txt: ceiling or nearest
        #[arg(long, default_value_t = IdfRounding::Ceiling)]
        idf_rounding: IdfRounding,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { collection, output, stopwords, localisation, stemmer, nfkc, jobs, idf_rounding } => {
            tracing::info!(collection = %collection.display(), output = %output.display(), %stemmer, jobs, "building index");
            let config = IndexerConfig {
                localisation,
                analyzer: AnalyzerConfig { stemmer, unicode_nfkc: nfkc },
                jobs: jobs.max(1),
                idf_rounding,
                ..IndexerConfig::new(collection, output, stopwords)
            };
            let summary = index_collection(&config)?;
            println!(
                "indexed {} documents ({} skipped), {} terms -> {}",
                summary.documents,
                summary.skipped,
                summary.terms,
                summary.output.display()
            );
            Ok(())
        }
    }
}

//! # Transcript Search CLI (`tsearch`)
//!
//! ## Usage
//!
//! ```bash
//! tsearch --config ./config/tsearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tsearch search [QUERY]` | Load the corpus and print matching snippets |
//! | `tsearch shell` | Interactive search with debounced re-runs |
//! | `tsearch generate` | Probe for `_chat N.txt` files and write `manifest.json` |
//! | `tsearch categories` | List the category keyword tables |
//! | `tsearch classify <PATH>...` | Tag local files with language and categories |
//!
//! ## Examples
//!
//! ```bash
//! # Everything, listed
//! tsearch search
//!
//! # Spanish transcripts about support mentioning "error"
//! tsearch search error --lang es --category suporte/ajuda
//!
//! # Discover transcripts and write the manifest to stdout
//! tsearch generate --output -
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use transcript_search::classify;
use transcript_search::config;
use transcript_search::generate;
use transcript_search::models::Language;
use transcript_search::progress::ProgressMode;
use transcript_search::search::{self, Highlight, SearchRequest};
use transcript_search::shell;

const DEFAULT_CONFIG: &str = "./config/tsearch.toml";

/// Transcript Search — tag and search exported chat transcripts.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, `./config/tsearch.toml` is used if present, otherwise
/// built-in defaults.
#[derive(Parser)]
#[command(
    name = "tsearch",
    about = "Tag exported chat transcripts by language and topic, and search them",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress output on stderr.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    progress: ProgressMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the corpus and search it.
    ///
    /// An empty query lists every document passing the filters.
    Search {
        /// Literal text to look for (case-insensitive).
        #[arg(default_value = "")]
        query: String,

        /// Only documents guessed as this language (`pt`, `es`, `en`).
        #[arg(long)]
        lang: Option<Language>,

        /// Only documents tagged with this category label.
        #[arg(long)]
        category: Option<String>,

        /// How to mark matches inside snippets.
        #[arg(long, value_enum, default_value = "html")]
        highlight: Highlight,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive search session reading from stdin.
    Shell,

    /// Probe the source for numbered transcripts and write a manifest.
    Generate {
        /// Output path, or `-` for stdout.
        #[arg(long, short, default_value = generate::MANIFEST_FILE_NAME)]
        output: PathBuf,
    },

    /// List categories and their trigger keywords.
    Categories,

    /// Guess language and categories for local text files.
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("transcript_search=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (config_path, is_default) = match cli.config {
        Some(ref p) => (p.clone(), false),
        None => (PathBuf::from(DEFAULT_CONFIG), true),
    };
    let cfg = config::load_config_or_default(&config_path, is_default)?;
    let progress = cli.progress.reporter();

    match cli.command {
        Commands::Search {
            query,
            lang,
            category,
            highlight,
            json,
        } => {
            let req = SearchRequest {
                query: &query,
                lang,
                category: category.as_deref(),
            };
            search::run_search(&cfg, &req, highlight, json, progress.as_ref()).await?;
        }
        Commands::Shell => {
            shell::run_shell(&cfg, progress.as_ref()).await?;
        }
        Commands::Generate { output } => {
            generate::run_generate(&cfg, &output, progress.as_ref()).await?;
        }
        Commands::Categories => {
            classify::list_categories(&cfg.keyword_tables()?);
        }
        Commands::Classify { paths } => {
            classify::run_classify(&cfg.keyword_tables()?, &paths)?;
        }
    }

    Ok(())
}

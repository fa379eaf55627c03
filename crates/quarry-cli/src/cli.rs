//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quarry CLI - extract structured fields from a text corpus.
#[derive(Debug, Parser)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the deterministic hash embedder instead of the Ollama backend
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chunk, embed and index a corpus directory
    Ingest(IngestArgs),

    /// Extract fields for entities against the index
    Analyze(AnalyzeArgs),

    /// Run a raw semantic search against the index
    Search(SearchArgs),

    /// Show index location, size and dimension
    Stats(StatsArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Directory of .txt files to ingest (non-recursive)
    #[arg(short = 'd', long)]
    pub corpus: PathBuf,

    /// Index directory (defaults to the configured one)
    #[arg(short, long)]
    pub index: Option<PathBuf>,

    /// Delete and recreate the index directory before ingesting
    #[arg(long)]
    pub fresh: bool,
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Entities to analyze (comma separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub entities: Vec<String>,

    /// Fields to extract, in order (comma separated)
    #[arg(short = 'F', long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Index directory (defaults to the configured one)
    #[arg(short, long)]
    pub index: Option<PathBuf>,

    /// One retrieval and one prompt per (entity, field) pair
    #[arg(long)]
    pub per_field: bool,

    /// Override the number of chunks retrieved per query
    #[arg(short, long)]
    pub k: Option<usize>,

    /// Also write the result table to this CSV file
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Search query text
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "5")]
    pub limit: usize,

    /// Restrict to chunks tagged with this entity
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Index directory (defaults to the configured one)
    #[arg(short, long)]
    pub index: Option<PathBuf>,
}

/// Arguments for the stats command.
#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Index directory (defaults to the configured one)
    #[arg(short, long)]
    pub index: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Csv => crate::config::OutputFormat::Csv,
        }
    }
}

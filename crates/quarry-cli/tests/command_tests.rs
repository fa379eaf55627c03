//! Integration tests for the CLI commands, run offline against the hash
//! embedder so no Ollama instance is needed.

use quarry_cli::cli::{AnalyzeArgs, IngestArgs, SearchArgs, StatsArgs};
use quarry_cli::commands;
use quarry_cli::config::{Config, OutputFormat};
use quarry_cli::Formatter;
use tempfile::TempDir;

fn formatter() -> Formatter {
    Formatter::new(OutputFormat::Table, false)
}

fn write_corpus(dir: &TempDir) {
    std::fs::write(
        dir.path().join("revenueco.txt"),
        "RevenueCo reported revenue of $50 Million. The CEO is Jane Doe.",
    )
    .unwrap();
}

fn ingest(corpus: &TempDir, index: &TempDir) {
    let args = IngestArgs {
        corpus: corpus.path().to_path_buf(),
        index: Some(index.path().to_path_buf()),
        fresh: false,
    };
    commands::execute_ingest(args, &Config::default(), true, &formatter()).unwrap();
}

#[test]
fn test_ingest_then_search() {
    let corpus = TempDir::new().unwrap();
    let index = TempDir::new().unwrap();
    write_corpus(&corpus);
    ingest(&corpus, &index);

    let args = SearchArgs {
        query: "revenue".to_string(),
        limit: 3,
        entity: None,
        index: Some(index.path().to_path_buf()),
    };
    commands::execute_search(args, &Config::default(), true, &formatter()).unwrap();
}

#[test]
fn test_ingest_fresh_replaces_index() {
    let corpus = TempDir::new().unwrap();
    let index = TempDir::new().unwrap();
    write_corpus(&corpus);
    ingest(&corpus, &index);

    // Re-ingest with --fresh; the old directory is wiped first
    let args = IngestArgs {
        corpus: corpus.path().to_path_buf(),
        index: Some(index.path().to_path_buf()),
        fresh: true,
    };
    commands::execute_ingest(args, &Config::default(), true, &formatter()).unwrap();

    let stats = StatsArgs {
        index: Some(index.path().to_path_buf()),
    };
    commands::execute_stats(stats, &Config::default(), true, &formatter()).unwrap();
}

#[test]
fn test_stats_on_missing_index_creates_empty() {
    let index = TempDir::new().unwrap();
    let args = StatsArgs {
        index: Some(index.path().join("fresh")),
    };
    commands::execute_stats(args, &Config::default(), true, &formatter()).unwrap();
}

#[tokio::test]
async fn test_analyze_on_empty_index_reports_and_exits_cleanly() {
    let index = TempDir::new().unwrap();
    let args = AnalyzeArgs {
        entities: vec!["RevenueCo".to_string()],
        fields: vec!["Revenue".to_string()],
        index: Some(index.path().to_path_buf()),
        per_field: false,
        k: None,
        out: None,
    };

    // An empty index never reaches the generation backend
    commands::execute_analyze(args, &Config::default(), true, &formatter())
        .await
        .unwrap();
}

//! The stats command: index location, size and dimension.

use crate::cli::StatsArgs;
use crate::config::Config;
use crate::embedder::AnyEmbedder;
use crate::error::Result;
use crate::output::Formatter;
use quarry_store::SemanticIndex;

/// Print basic facts about the index.
pub fn execute_stats(
    args: StatsArgs,
    config: &Config,
    offline: bool,
    formatter: &Formatter,
) -> Result<()> {
    let index_dir = args.index.unwrap_or_else(|| config.index_dir.clone());
    let embedder = AnyEmbedder::from_config(config, offline);
    let index = SemanticIndex::open(&index_dir, embedder)?;

    println!(
        "{}",
        formatter.success(&format!("Connected to index at {}", index.path().display()))
    );
    println!("  chunks:    {}", index.len());
    println!("  dimension: {}", index.dimension());

    Ok(())
}

//! The search command: raw semantic retrieval for debugging.

use crate::cli::SearchArgs;
use crate::config::Config;
use crate::embedder::AnyEmbedder;
use crate::error::Result;
use crate::output::Formatter;
use quarry_domain::MetadataFilter;
use quarry_store::SemanticIndex;

/// Search the index and print the matching chunks.
pub fn execute_search(
    args: SearchArgs,
    config: &Config,
    offline: bool,
    formatter: &Formatter,
) -> Result<()> {
    let index_dir = args.index.unwrap_or_else(|| config.index_dir.clone());
    let embedder = AnyEmbedder::from_config(config, offline);
    let index = SemanticIndex::open(&index_dir, embedder)?;

    let filter = args.entity.map(MetadataFilter::entity);
    let results = index.retrieve(&args.query, args.limit, filter.as_ref())?;

    println!("{}", formatter.format_search(&results)?);
    Ok(())
}

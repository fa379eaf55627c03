//! The ingest command: corpus directory → persistent index.

use crate::cli::IngestArgs;
use crate::config::Config;
use crate::embedder::AnyEmbedder;
use crate::error::Result;
use crate::output::Formatter;
use quarry_extractor::Ingestor;
use quarry_store::SemanticIndex;
use tracing::info;

/// Ingest a corpus directory into the index.
pub fn execute_ingest(
    args: IngestArgs,
    config: &Config,
    offline: bool,
    formatter: &Formatter,
) -> Result<()> {
    let index_dir = args.index.unwrap_or_else(|| config.index_dir.clone());

    if args.fresh && index_dir.exists() {
        // No index handle is open yet in this process, so the directory can
        // be removed safely
        info!("Removing existing index at {}", index_dir.display());
        std::fs::remove_dir_all(&index_dir)?;
        println!("{}", formatter.info("Existing index removed"));
    }

    let embedder = AnyEmbedder::from_config(config, offline);
    let index = SemanticIndex::open(&index_dir, embedder)?;

    let report = Ingestor::from_config(&config.analysis).ingest_directory(&args.corpus, &index)?;

    index.flush()?;
    index.close()?;

    println!(
        "{}",
        formatter.success(&format!(
            "Indexed {} document(s) as {} chunk(s) into {} ({} skipped)",
            report.documents,
            report.chunks,
            index_dir.display(),
            report.skipped
        ))
    );
    Ok(())
}

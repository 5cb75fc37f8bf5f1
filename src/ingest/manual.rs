//! Owner's manual loading: page-separated text into [`DocumentChunk`]s.

use std::path::Path;

use crate::config::IngestConfig;
use crate::error::{MechanicError, Result};
use crate::index::DocumentChunk;
use crate::ingest::chunker::chunk_text;

/// Page separator emitted by PDF-to-text converters.
pub const PAGE_BREAK: char = '\u{000C}';

/// Split manual text into pages, keeping 0-based page numbers and dropping
/// pages with no text.
pub fn split_pages(content: &str) -> Vec<(usize, &str)> {
    content
        .split(PAGE_BREAK)
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .collect()
}

/// Chunk every page of a manual. Chunk ids are `doc_{page}_{position}`.
pub fn chunk_manual(source: &str, content: &str, config: &IngestConfig) -> Vec<DocumentChunk> {
    split_pages(content)
        .into_iter()
        .flat_map(|(page, text)| {
            chunk_text(text, config)
                .into_iter()
                .enumerate()
                .map(move |(position, text)| DocumentChunk {
                    chunk_id: format!("doc_{}_{}", page, position),
                    source: source.to_string(),
                    page,
                    position,
                    text,
                })
        })
        .collect()
}

/// Read and chunk a manual file.
pub fn load_manual(path: &Path, config: &IngestConfig) -> Result<Vec<DocumentChunk>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MechanicError::InvalidInput(format!("cannot read manual {}: {}", path.display(), e))
    })?;
    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("manual")
        .to_string();

    let chunks = chunk_manual(&source, &content, config);
    log::info!(
        "Manual {}: {} pages with text, {} chunks",
        source,
        split_pages(&content).len(),
        chunks.len()
    );
    Ok(chunks)
}

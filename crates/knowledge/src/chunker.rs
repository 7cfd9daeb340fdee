//! Lesson text chunking.

use coursebot_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Split text into chunks of at most `chunk_size` characters, with up to
/// `overlap` characters shared between neighbours.
///
/// Splitting prefers sentence and paragraph boundaries over raw character
/// offsets. Whitespace-only chunks are dropped.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> AppResult<Vec<String>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| {
            AppError::Config(format!(
                "Invalid chunking (size {}, overlap {}): {}",
                chunk_size, overlap, e
            ))
        })?;

    let splitter = TextSplitter::new(config);
    let chunks: Vec<String> = splitter
        .chunks(text)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    tracing::debug!(
        "Chunked {} bytes into {} chunks (size: {}, overlap: {})",
        text.len(),
        chunks.len(),
        chunk_size,
        overlap
    );

    Ok(chunks)
}

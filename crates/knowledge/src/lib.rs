//! Course knowledge and answering for coursebot.
//!
//! Loads course documents into an in-memory vector store, exposes retrieval
//! tools to the completion provider and answers queries through a bounded
//! tool-use loop.

pub mod chunker;
pub mod embeddings;
pub mod parser;
pub mod rag;
pub mod store;
pub mod tools;
pub mod types;
pub mod vector_store;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{EmbeddingProvider, TrigramEmbedder};
pub use rag::{Conductor, GenerationLoop, LoopState, RagResponse, SessionManager, SessionStore};
pub use store::RetrievalProvider;
pub use tools::{Tool, ToolContext, ToolRegistry};
pub use types::{
    ChunkMetadata, Course, CourseAnalytics, CourseChunk, Lesson, LoadStats, SearchResults, Source,
};
pub use vector_store::VectorStore;

use coursebot_core::{AppError, AppResult};
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

const COURSE_EXTENSIONS: &[&str] = &["txt", "md"];

/// Load every course document under `dir` into `store`.
///
/// Courses whose title is already indexed are skipped. Files that fail to
/// parse are logged and skipped so one bad document does not block the rest.
pub async fn load_course_folder(
    store: &VectorStore,
    dir: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<LoadStats> {
    let start = Instant::now();

    if !dir.is_dir() {
        return Err(AppError::Retrieval(format!(
            "Course folder {:?} does not exist",
            dir
        )));
    }

    tracing::info!("Loading course documents from {:?}", dir);

    let mut courses_added = 0u32;
    let mut chunks_added = 0u32;

    let mut paths: Vec<_> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_course_file(p))
        .collect();
    paths.sort();

    for path in paths {
        let parsed = match parser::parse_course_file(&path, chunk_size, chunk_overlap) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let chunk_count = parsed.chunks.len() as u32;
        if store.add_course(parsed).await? {
            courses_added += 1;
            chunks_added += chunk_count;
        }
    }

    let duration = start.elapsed();

    tracing::info!(
        "Loaded {} courses with {} chunks in {:.2}s",
        courses_added,
        chunks_added,
        duration.as_secs_f64()
    );

    Ok(LoadStats {
        courses_added,
        chunks_added,
        duration_secs: duration.as_secs_f64(),
    })
}

fn is_course_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| COURSE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

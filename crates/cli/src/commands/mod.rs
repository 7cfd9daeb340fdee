//! Command handlers for the coursebot CLI.
//!
//! Every command answers from the same pipeline: a completion client, an
//! in-memory course store loaded from the docs folder, and a conductor.

pub mod ask;
pub mod chat;
pub mod courses;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use courses::CoursesCommand;
pub use serve::ServeCommand;

use coursebot_core::{AppConfig, AppResult};
use coursebot_knowledge::{load_course_folder, Conductor, TrigramEmbedder, VectorStore};
use coursebot_llm::create_client;
use std::sync::Arc;

/// Build the answering pipeline from configuration.
///
/// A missing docs folder is not fatal: the bot starts with an empty catalog
/// and can still answer general questions.
pub async fn build_conductor(config: &AppConfig) -> AppResult<Conductor> {
    let client = create_client(
        &config.provider,
        config.endpoint.as_deref(),
        config.api_key.as_deref(),
    )?;

    let embedder = Arc::new(TrigramEmbedder::new(config.embedding_dim));
    let store = Arc::new(VectorStore::new(embedder, config.max_results));

    let docs_dir = config.resolved_docs_dir();
    if docs_dir.is_dir() {
        let stats =
            load_course_folder(&store, &docs_dir, config.chunk_size, config.chunk_overlap).await?;
        tracing::debug!(
            "Course folder loaded: {} courses, {} chunks",
            stats.courses_added,
            stats.chunks_added
        );
    } else {
        tracing::warn!("Course folder {:?} not found; starting with no courses", docs_dir);
    }

    Conductor::from_config(config, client, store)
}

//! In-memory vector store for course content.
//!
//! Holds two collections: a catalog with one embedded entry per course title
//! (used to resolve fuzzy course names) and the embedded content chunks.

use crate::embeddings::{cosine_similarity, EmbeddingProvider};
use crate::parser::ParsedCourse;
use crate::store::RetrievalProvider;
use crate::types::{ChunkMetadata, Course, SearchResults};
use coursebot_core::{AppError, AppResult};
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};

/// Minimum cosine similarity for an embedded title match to count as a resolution.
const MIN_TITLE_SIMILARITY: f32 = 0.3;

struct CatalogEntry {
    course: Course,
    embedding: Vec<f32>,
}

struct ContentEntry {
    content: String,
    metadata: ChunkMetadata,
    embedding: Vec<f32>,
}

#[derive(Default)]
struct StoreState {
    catalog: IndexMap<String, CatalogEntry>,
    content: Vec<ContentEntry>,
}

/// Thread-safe in-memory retrieval backend.
pub struct VectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    max_results: usize,
    state: RwLock<StoreState>,
}

impl VectorStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, max_results: usize) -> Self {
        tracing::debug!(
            provider = embedder.provider_name(),
            model = embedder.model_name(),
            dimensions = embedder.dimensions(),
            "Creating vector store"
        );
        Self {
            embedder,
            max_results,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Index a parsed course.
    ///
    /// Returns `Ok(false)` without touching the store when a course with the
    /// same title is already indexed.
    pub async fn add_course(&self, parsed: ParsedCourse) -> AppResult<bool> {
        let title = parsed.course.title.clone();
        if self.has_course(&title)? {
            tracing::debug!("Course '{}' already indexed, skipping", title);
            return Ok(false);
        }

        let mut texts = Vec::with_capacity(parsed.chunks.len() + 1);
        texts.push(title.clone());
        texts.extend(parsed.chunks.iter().map(|c| c.content.clone()));

        let mut embeddings = self.embedder.embed_batch(&texts).await?.into_iter();
        let title_embedding = embeddings
            .next()
            .ok_or_else(|| AppError::Retrieval("No embedding returned for course title".to_string()))?;

        let content: Vec<ContentEntry> = parsed
            .chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| ContentEntry {
                content: chunk.content,
                metadata: chunk.metadata,
                embedding,
            })
            .collect();

        let mut state = self.write_state()?;
        // Another writer may have won the race while we were embedding
        if state.catalog.contains_key(&title) {
            return Ok(false);
        }

        tracing::info!("Indexed course '{}' with {} chunks", title, content.len());

        state.catalog.insert(
            title,
            CatalogEntry {
                course: parsed.course,
                embedding: title_embedding,
            },
        );
        state.content.extend(content);

        Ok(true)
    }

    pub fn has_course(&self, title: &str) -> AppResult<bool> {
        Ok(self.read_state()?.catalog.contains_key(title))
    }

    /// Number of indexed chunks.
    pub fn chunk_count(&self) -> AppResult<usize> {
        Ok(self.read_state()?.content.len())
    }

    fn read_state(&self) -> AppResult<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|e| AppError::Retrieval(format!("Vector store lock poisoned: {}", e)))
    }

    fn write_state(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|e| AppError::Retrieval(format!("Vector store lock poisoned: {}", e)))
    }

    async fn rank(
        &self,
        query: &str,
        course_title: Option<&str>,
        lesson_number: Option<u32>,
    ) -> AppResult<SearchResults> {
        let query_embedding = self.embedder.embed(query).await?;
        let state = self.read_state()?;

        let mut scored: Vec<(&ContentEntry, f32)> = state
            .content
            .iter()
            .filter(|e| course_title.map_or(true, |t| e.metadata.course_title == t))
            .filter(|e| lesson_number.map_or(true, |n| e.metadata.lesson_number == Some(n)))
            .map(|e| (e, 1.0 - cosine_similarity(&query_embedding, &e.embedding)))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.max_results);

        let (documents, metadata, distances) = scored.into_iter().fold(
            (Vec::new(), Vec::new(), Vec::new()),
            |(mut docs, mut metas, mut dists), (entry, distance)| {
                docs.push(entry.content.clone());
                metas.push(entry.metadata.clone());
                dists.push(distance);
                (docs, metas, dists)
            },
        );

        SearchResults::from_parallel(documents, metadata, distances)
    }
}

#[async_trait::async_trait]
impl RetrievalProvider for VectorStore {
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        let course_title = match course_name {
            Some(name) => match self.resolve_course_name(name).await {
                Some(title) => Some(title),
                None => return SearchResults::empty(format!("No course found matching '{}'", name)),
            },
            None => None,
        };

        match self.rank(query, course_title.as_deref(), lesson_number).await {
            Ok(results) => {
                tracing::debug!(
                    "Search returned {} results (course: {:?}, lesson: {:?})",
                    results.len(),
                    course_title,
                    lesson_number
                );
                results
            }
            Err(e) => {
                tracing::warn!("Search failed: {}", e);
                SearchResults::empty(format!("Search error: {}", e))
            }
        }
    }

    async fn resolve_course_name(&self, course_name: &str) -> Option<String> {
        let needle = course_name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        {
            let state = self.read_state().ok()?;
            if state.catalog.is_empty() {
                return None;
            }

            let titles = state.catalog.keys();
            if let Some(title) = titles.clone().find(|t| t.to_lowercase() == needle) {
                return Some(title.clone());
            }
            if let Some(title) = titles.clone().find(|t| t.to_lowercase().contains(&needle)) {
                return Some(title.clone());
            }
        }

        let query_embedding = self.embedder.embed(course_name).await.ok()?;
        let state = self.read_state().ok()?;

        let best = state
            .catalog
            .iter()
            .map(|(title, entry)| (title, cosine_similarity(&query_embedding, &entry.embedding)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))?;

        tracing::debug!(
            "Nearest catalog title for '{}': '{}' ({:.3})",
            course_name,
            best.0,
            best.1
        );

        (best.1 >= MIN_TITLE_SIMILARITY).then(|| best.0.clone())
    }

    fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        let state = self.read_state().ok()?;
        state
            .catalog
            .get(course_title)?
            .course
            .lesson(lesson_number)?
            .link
            .clone()
    }

    fn get_course(&self, course_title: &str) -> Option<Course> {
        let state = self.read_state().ok()?;
        state.catalog.get(course_title).map(|e| e.course.clone())
    }

    fn course_titles(&self) -> Vec<String> {
        match self.read_state() {
            Ok(state) => state.catalog.keys().cloned().collect(),
            Err(e) => {
                tracing::warn!("Failed to list courses: {}", e);
                Vec::new()
            }
        }
    }
}

//! Query answering across retrieval, history and the generation loop.

use crate::rag::generator::GenerationLoop;
use crate::rag::session::{SessionManager, SessionStore};
use crate::rag::types::RagResponse;
use crate::store::RetrievalProvider;
use crate::tools::{CourseOutlineTool, CourseSearchTool, ToolContext, ToolRegistry};
use crate::types::CourseAnalytics;
use coursebot_core::{AppConfig, AppResult};
use coursebot_llm::CompletionClient;
use std::sync::Arc;

/// Answers queries for any number of sessions.
///
/// Safe to share across concurrent requests: each `answer` call gets its own
/// [`ToolContext`], so citations never leak between queries.
pub struct Conductor {
    generator: GenerationLoop,
    registry: Arc<ToolRegistry>,
    store: Arc<dyn RetrievalProvider>,
    sessions: Arc<dyn SessionStore>,
}

impl Conductor {
    /// Build a conductor with the course search and outline tools registered.
    pub fn new(
        generator: GenerationLoop,
        store: Arc<dyn RetrievalProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> AppResult<Self> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CourseSearchTool::new(store.clone())))?;
        registry.register(Arc::new(CourseOutlineTool::new(store.clone())))?;

        Ok(Self::with_registry(generator, Arc::new(registry), store, sessions))
    }

    pub fn with_registry(
        generator: GenerationLoop,
        registry: Arc<ToolRegistry>,
        store: Arc<dyn RetrievalProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            generator,
            registry,
            store,
            sessions,
        }
    }

    /// Build from application configuration with an in-memory session store.
    pub fn from_config(
        config: &AppConfig,
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn RetrievalProvider>,
    ) -> AppResult<Self> {
        let generator = GenerationLoop::new(client, config.model.clone())
            .with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
            .with_max_tool_rounds(config.max_tool_rounds);
        let sessions = Arc::new(SessionManager::new(config.max_history));

        Self::new(generator, store, sessions)
    }

    /// Answer a query, optionally within a session.
    ///
    /// Without a session id no history is used and nothing is remembered.
    pub async fn answer(&self, query: &str, session_id: Option<&str>) -> AppResult<RagResponse> {
        tracing::info!(session = ?session_id, "Answering query");

        let history = match session_id {
            Some(id) => self.sessions.get_history(id).await,
            None => None,
        };

        let mut ctx = ToolContext::new();
        let tools = self.registry.schemas();
        let outcome = self
            .generator
            .generate(query, history.as_deref(), &tools, Some(&self.registry), &mut ctx)
            .await;

        // Sources are single-use whether or not generation succeeded
        let sources = self.registry.collect_sources(&ctx);
        self.registry.clear_sources(&mut ctx);

        let answer = outcome?;

        if let Some(id) = session_id {
            self.sessions.add_exchange(id, query, &answer).await;
        }

        tracing::debug!(sources = sources.len(), "Query answered");
        Ok(RagResponse::new(answer, sources))
    }

    pub async fn create_session(&self) -> String {
        self.sessions.create_session().await
    }

    pub fn course_analytics(&self) -> CourseAnalytics {
        self.store.course_analytics()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

//! Retrieval tools exposed to the completion provider.
//!
//! Tool results travel to the model as plain text, which loses structured
//! citations. Each tool therefore records the sources it surfaced into a
//! per-query [`ToolContext`]; the conductor reads them back once the answer
//! is complete. Tools themselves hold no per-query state and can be shared
//! across concurrent queries.

mod outline;
mod registry;
mod search;

pub use outline::CourseOutlineTool;
pub use registry::ToolRegistry;
pub use search::CourseSearchTool;

use crate::types::Source;
use coursebot_core::{AppError, AppResult};
use coursebot_llm::ToolSpec;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Per-query scratch space shared by all tool calls of one query.
#[derive(Debug, Default, Clone)]
pub struct ToolContext {
    sources: IndexMap<String, Vec<Source>>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sources last surfaced by `tool`.
    pub fn record_sources(&mut self, tool: &str, sources: Vec<Source>) {
        self.sources.insert(tool.to_string(), sources);
    }

    /// Sources last surfaced by `tool`, empty when it has not run.
    pub fn sources_for(&self, tool: &str) -> &[Source] {
        self.sources.get(tool).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn reset(&mut self, tool: &str) {
        self.sources.shift_remove(tool);
    }

    pub fn is_empty(&self) -> bool {
        self.sources.values().all(Vec::is_empty)
    }
}

/// A named, schema-described operation the model may ask to run.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique dispatch name; must match `spec().name`.
    fn name(&self) -> &str;

    /// Schema advertised to the model.
    fn spec(&self) -> ToolSpec;

    /// Run the tool.
    ///
    /// `Err` is reserved for failures the caller should report as a tool
    /// execution error. Retrieval problems the model can act on are returned
    /// as `Ok` text.
    async fn execute(&self, args: &Value, ctx: &mut ToolContext) -> AppResult<String>;

    /// Sources recorded by the most recent successful execution in `ctx`.
    fn last_sources<'a>(&self, ctx: &'a ToolContext) -> &'a [Source] {
        ctx.sources_for(self.name())
    }

    fn reset_sources(&self, ctx: &mut ToolContext) {
        ctx.reset(self.name());
    }
}

/// Decode tool arguments into a typed struct.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: &Value) -> AppResult<T> {
    serde_json::from_value(args.clone())
        .map_err(|e| AppError::Tool(format!("Invalid arguments for {}: {}", tool, e)))
}

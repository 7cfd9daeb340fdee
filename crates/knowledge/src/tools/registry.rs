//! Tool registry: registration, schema listing, dispatch and source collection.

use super::{Tool, ToolContext};
use crate::types::Source;
use coursebot_core::{AppError, AppResult};
use coursebot_llm::ToolSpec;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Registered tools, kept in registration order.
///
/// The registry holds no per-query state; sources live in the caller's
/// [`ToolContext`]. Build it once, then share it behind an `Arc`.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its name.
    ///
    /// Re-registering a name replaces the earlier tool but keeps its original
    /// position in the schema list.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> AppResult<()> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(AppError::Tool("Tool must have a name".to_string()));
        }

        if self.contains(&name) {
            tracing::warn!("Tool '{}' registered twice; the later registration wins", name);
        } else {
            tracing::debug!("Registered tool: {}", name);
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Schemas of all tools, in registration order.
    pub fn schemas(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    /// Run the named tool.
    ///
    /// An unknown name is reported as text, not as an error. Errors returned
    /// by the tool itself are passed through for the caller to render.
    pub async fn execute(&self, name: &str, args: &Value, ctx: &mut ToolContext) -> AppResult<String> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(args, ctx).await,
            None => {
                tracing::warn!("Model requested unknown tool '{}'", name);
                Ok(format!("Tool '{}' not found", name))
            }
        }
    }

    /// Sources recorded by every tool, in registration order.
    pub fn collect_sources(&self, ctx: &ToolContext) -> Vec<Source> {
        self.tools
            .values()
            .flat_map(|t| t.last_sources(ctx).iter().cloned())
            .collect()
    }

    /// Forget every tool's recorded sources.
    pub fn clear_sources(&self, ctx: &mut ToolContext) {
        for tool in self.tools.values() {
            tool.reset_sources(ctx);
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fakes::StubTool;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(
                StubTool::ok("search_course_content", "results")
                    .with_sources(vec![Source::new("AI Course - Lesson 1", None)]),
            ))
            .unwrap();
        registry
            .register(Arc::new(
                StubTool::ok("get_course_outline", "outline")
                    .with_sources(vec![Source::new("AI Course", Some("https://example.com/ai".to_string()))]),
            ))
            .unwrap();
        registry
    }

    #[test]
    fn test_schemas_follow_registration_order() {
        let names: Vec<String> = registry().schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["search_course_content", "get_course_outline"]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Arc::new(StubTool::ok("", "x"))).is_err());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_replaces_in_place() {
        let mut registry = registry();
        registry
            .register(Arc::new(StubTool::ok("search_course_content", "replacement")))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("search_course_content"));
        assert!(!registry.contains("unknown_tool"));
        assert_eq!(registry.schemas()[0].name, "search_course_content");

        let mut ctx = ToolContext::new();
        let text = registry
            .execute("search_course_content", &json!({}), &mut ctx)
            .await
            .unwrap();
        assert_eq!(text, "replacement");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_text() {
        let registry = registry();
        let mut ctx = ToolContext::new();

        let text = registry.execute("unknown_tool", &json!({}), &mut ctx).await.unwrap();
        assert!(text.to_lowercase().contains("not found"));
        assert!(text.contains("unknown_tool"));
    }

    #[tokio::test]
    async fn test_tool_errors_pass_through() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool::failing("broken", "boom"))).unwrap();
        let mut ctx = ToolContext::new();

        let err = registry.execute("broken", &json!({}), &mut ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_collect_then_clear_sources() {
        let registry = registry();
        let mut ctx = ToolContext::new();

        registry.execute("get_course_outline", &json!({}), &mut ctx).await.unwrap();
        registry.execute("search_course_content", &json!({}), &mut ctx).await.unwrap();

        // registration order, not execution order
        let sources = registry.collect_sources(&ctx);
        assert_eq!(
            sources.iter().map(|s| s.text.as_str()).collect::<Vec<_>>(),
            vec!["AI Course - Lesson 1", "AI Course"]
        );

        registry.clear_sources(&mut ctx);
        assert!(registry.collect_sources(&ctx).is_empty());
    }
}

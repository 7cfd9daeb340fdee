//! Course content search tool.

use super::{parse_args, Tool, ToolContext};
use crate::store::RetrievalProvider;
use crate::types::{SearchResults, Source};
use coursebot_core::AppResult;
use coursebot_llm::ToolSpec;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const NAME: &str = "search_course_content";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    lesson_number: Option<u32>,
}

/// Searches course content with optional course and lesson filters.
pub struct CourseSearchTool {
    store: Arc<dyn RetrievalProvider>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<dyn RetrievalProvider>) -> Self {
        Self { store }
    }

    /// Render hits as labelled blocks and collect one source per hit.
    fn format_results(&self, results: &SearchResults) -> (String, Vec<Source>) {
        let mut blocks = Vec::with_capacity(results.len());
        let mut sources = Vec::with_capacity(results.len());

        for (document, metadata, _) in results.iter() {
            let label = metadata.label();
            blocks.push(format!("[{}]\n{}", label, document));

            let url = match metadata.lesson_number {
                Some(n) => self.store.get_lesson_link(&metadata.course_title, n),
                None => None,
            };
            sources.push(Source::new(label, url));
        }

        (blocks.join("\n\n"), sources)
    }
}

#[async_trait::async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: NAME.to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: &Value, ctx: &mut ToolContext) -> AppResult<String> {
        let args: SearchArgs = parse_args(NAME, args)?;

        let results = self
            .store
            .search(&args.query, args.course_name.as_deref(), args.lesson_number)
            .await;

        if let Some(error) = &results.error {
            return Ok(error.clone());
        }

        if results.is_empty() {
            let mut filters = String::new();
            if let Some(course) = &args.course_name {
                filters.push_str(&format!(" in course '{}'", course));
            }
            if let Some(lesson) = args.lesson_number {
                filters.push_str(&format!(" in lesson {}", lesson));
            }
            return Ok(format!("No relevant content found{}.", filters));
        }

        let (text, sources) = self.format_results(&results);
        tracing::debug!("{} returned {} results", NAME, sources.len());
        ctx.record_sources(NAME, sources);

        Ok(text)
    }
}

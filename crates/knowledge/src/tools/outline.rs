//! Course outline tool.

use super::{parse_args, Tool, ToolContext};
use crate::store::RetrievalProvider;
use crate::types::{Course, Source};
use coursebot_core::AppResult;
use coursebot_llm::ToolSpec;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Write;
use std::sync::Arc;

const NAME: &str = "get_course_outline";

#[derive(Debug, Deserialize)]
struct OutlineArgs {
    course_title: String,
}

/// Returns a course's title, link and ordered lesson list.
pub struct CourseOutlineTool {
    store: Arc<dyn RetrievalProvider>,
}

impl CourseOutlineTool {
    pub fn new(store: Arc<dyn RetrievalProvider>) -> Self {
        Self { store }
    }
}

fn render_outline(course: &Course) -> String {
    let mut out = format!("Course Title: {}\n", course.title);
    if let Some(link) = &course.link {
        let _ = writeln!(out, "Course Link: {}", link);
    }
    if let Some(instructor) = &course.instructor {
        let _ = writeln!(out, "Course Instructor: {}", instructor);
    }

    let _ = write!(out, "Lessons ({} total):", course.lessons.len());
    for lesson in &course.lessons {
        let _ = write!(out, "\n- Lesson {}: {}", lesson.number, lesson.title);
    }

    out
}

#[async_trait::async_trait]
impl Tool for CourseOutlineTool {
    fn name(&self) -> &str {
        NAME
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: NAME.to_string(),
            description: "Get a course outline: title, link and the complete list of lessons".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "course_title": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    }
                },
                "required": ["course_title"]
            }),
        }
    }

    async fn execute(&self, args: &Value, ctx: &mut ToolContext) -> AppResult<String> {
        let args: OutlineArgs = parse_args(NAME, args)?;

        let course = match self.store.resolve_course_name(&args.course_title).await {
            Some(title) => self.store.get_course(&title),
            None => None,
        };

        let Some(course) = course else {
            return Ok(format!("No course found matching '{}'", args.course_title));
        };

        ctx.record_sources(NAME, vec![Source::new(course.title.clone(), course.link.clone())]);

        Ok(render_outline(&course))
    }
}

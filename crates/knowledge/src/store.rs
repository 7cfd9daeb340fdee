//! Retrieval provider abstraction.
//!
//! Tools only talk to course content through this trait, so the in-memory
//! `VectorStore` can be swapped for any backend that can rank chunks and
//! resolve course names.

use crate::types::{Course, CourseAnalytics, SearchResults};

/// Trait for course retrieval backends.
///
/// Implementations must:
/// - Never fail structurally from `search`: failures are reported through
///   `SearchResults::error`
/// - Report an unresolvable `course_name` filter as an error result, not as
///   an empty one
/// - Return results in ranking order (most relevant first)
#[async_trait::async_trait]
pub trait RetrievalProvider: Send + Sync {
    /// Search course content, optionally filtered by course and lesson.
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults;

    /// Resolve a partial or fuzzy course name to an exact course title.
    async fn resolve_course_name(&self, course_name: &str) -> Option<String>;

    /// Link for a specific lesson of a course.
    fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String>;

    /// Full course record by exact title.
    fn get_course(&self, course_title: &str) -> Option<Course>;

    /// All known course titles, in insertion order.
    fn course_titles(&self) -> Vec<String>;

    /// Catalog summary.
    fn course_analytics(&self) -> CourseAnalytics {
        let course_titles = self.course_titles();
        CourseAnalytics {
            total_courses: course_titles.len(),
            course_titles,
        }
    }
}

//! Course knowledge type definitions.

use coursebot_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A lesson inside a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson number as written in the course document
    pub number: u32,

    /// Lesson title
    pub title: String,

    /// Link to the lesson, if published
    pub link: Option<String>,
}

/// A course and its ordered lesson list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course title; the unique course identifier in the store
    pub title: String,

    /// Link to the course page
    pub link: Option<String>,

    /// Course instructor
    pub instructor: Option<String>,

    /// Lessons in document order
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Look up a lesson by number.
    pub fn lesson(&self, number: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.number == number)
    }
}

/// Metadata attached to every indexed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Exact title of the owning course
    pub course_title: String,

    /// Lesson the chunk came from, if the document had lesson markers
    pub lesson_number: Option<u32>,

    /// Position of the chunk within its course
    pub chunk_index: usize,
}

impl ChunkMetadata {
    /// Human-readable label, e.g. "Course - Lesson 3".
    pub fn label(&self) -> String {
        match self.lesson_number {
            Some(n) => format!("{} - Lesson {}", self.course_title, n),
            None => self.course_title.clone(),
        }
    }
}

/// A chunk of lesson text ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Outcome of a content search.
///
/// `documents`, `metadata` and `distances` are parallel lists of equal length.
/// When `error` is set the lists are empty and the search must be treated as
/// failed; empty lists without an error mean "no matches".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub distances: Vec<f32>,
    pub error: Option<String>,
}

impl SearchResults {
    /// Build a successful result set from parallel lists.
    pub fn from_parallel(
        documents: Vec<String>,
        metadata: Vec<ChunkMetadata>,
        distances: Vec<f32>,
    ) -> AppResult<Self> {
        if documents.len() != metadata.len() || documents.len() != distances.len() {
            return Err(AppError::Retrieval(format!(
                "Mismatched search result lists: {} documents, {} metadata, {} distances",
                documents.len(),
                metadata.len(),
                distances.len()
            )));
        }

        Ok(Self {
            documents,
            metadata,
            distances,
            error: None,
        })
    }

    /// A failed search carrying an error message.
    pub fn empty(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A successful search that matched nothing.
    pub fn no_matches() -> Self {
        Self::default()
    }

    /// True when there are no documents (whether or not the search failed).
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Iterate `(document, metadata, distance)` in ranking order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChunkMetadata, f32)> {
        self.documents
            .iter()
            .zip(&self.metadata)
            .zip(&self.distances)
            .map(|((doc, meta), dist)| (doc.as_str(), meta, *dist))
    }
}

/// A citation shown alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display text, e.g. "Course - Lesson 2"
    pub text: String,

    /// Link to the cited lesson or course
    pub url: Option<String>,
}

impl Source {
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }
}

/// Catalog summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// Result of loading a folder of course documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadStats {
    pub courses_added: u32,
    pub chunks_added: u32,
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(title: &str, lesson: Option<u32>) -> ChunkMetadata {
        ChunkMetadata {
            course_title: title.to_string(),
            lesson_number: lesson,
            chunk_index: 0,
        }
    }

    #[test]
    fn test_from_parallel_rejects_mismatched_lengths() {
        let result = SearchResults::from_parallel(
            vec!["a".to_string(), "b".to_string()],
            vec![meta("AI Course", Some(1))],
            vec![0.1, 0.2],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_with_error() {
        let results = SearchResults::empty("Search error: connection failed");
        assert!(results.is_empty());
        assert_eq!(results.error.as_deref(), Some("Search error: connection failed"));
    }

    #[test]
    fn test_no_matches_is_not_an_error() {
        let results = SearchResults::no_matches();
        assert!(results.is_empty());
        assert!(results.error.is_none());
    }

    #[test]
    fn test_iter_keeps_ranking_order() {
        let results = SearchResults::from_parallel(
            vec!["first".to_string(), "second".to_string()],
            vec![meta("A", Some(1)), meta("A", Some(2))],
            vec![0.1, 0.4],
        )
        .unwrap();

        let docs: Vec<&str> = results.iter().map(|(d, _, _)| d).collect();
        assert_eq!(docs, vec!["first", "second"]);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_metadata_label() {
        assert_eq!(meta("AI Course", Some(5)).label(), "AI Course - Lesson 5");
        assert_eq!(meta("AI Course", None).label(), "AI Course");
    }

    #[test]
    fn test_course_lesson_lookup() {
        let course = Course {
            title: "MCP".to_string(),
            link: None,
            instructor: None,
            lessons: vec![Lesson {
                number: 2,
                title: "Servers".to_string(),
                link: Some("https://example.com/2".to_string()),
            }],
        };
        assert_eq!(course.lesson(2).map(|l| l.title.as_str()), Some("Servers"));
        assert!(course.lesson(3).is_none());
    }
}

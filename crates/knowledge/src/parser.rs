//! Course document parsing.
//!
//! A course document starts with a small header:
//!
//! ```text
//! Course Title: Building Towards Computer Use
//! Course Link: https://example.com/course
//! Course Instructor: Jane Doe
//!
//! Lesson 0: Introduction
//! Lesson Link: https://example.com/lesson-0
//! ...lesson body...
//! ```
//!
//! Header lines are optional except the title; when the first line carries no
//! `Course Title:` prefix it is taken as the title verbatim.

use crate::chunker::chunk_text;
use crate::types::{ChunkMetadata, Course, CourseChunk, Lesson};
use coursebot_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// A parsed course and its chunks, ready for indexing.
#[derive(Debug, Clone)]
pub struct ParsedCourse {
    pub course: Course,
    pub chunks: Vec<CourseChunk>,
}

/// Read and parse a course document from disk.
pub fn parse_course_file(path: &Path, chunk_size: usize, overlap: usize) -> AppResult<ParsedCourse> {
    let raw = fs::read_to_string(path)?;
    parse_course_document(&raw, chunk_size, overlap)
        .map_err(|e| AppError::Retrieval(format!("Failed to parse {:?}: {}", path, e)))
}

/// Parse course document text into a `Course` plus its chunks.
pub fn parse_course_document(text: &str, chunk_size: usize, overlap: usize) -> AppResult<ParsedCourse> {
    let mut lines = text.lines().peekable();

    // Leading blank lines carry nothing
    while lines.peek().is_some_and(|l| l.trim().is_empty()) {
        lines.next();
    }

    let title = match lines.next() {
        Some(first) => header_value(first, "Course Title:")
            .unwrap_or(first.trim())
            .to_string(),
        None => return Err(AppError::Retrieval("Course document is empty".to_string())),
    };
    if title.is_empty() {
        return Err(AppError::Retrieval("Course document has no title".to_string()));
    }

    let mut link = None;
    let mut instructor = None;
    while let Some(line) = lines.peek() {
        if let Some(value) = header_value(line, "Course Link:") {
            link = non_empty(value);
        } else if let Some(value) = header_value(line, "Course Instructor:") {
            instructor = non_empty(value);
        } else {
            break;
        }
        lines.next();
    }

    let mut lessons: Vec<Lesson> = Vec::new();
    let mut bodies: Vec<(Option<u32>, String)> = Vec::new();
    let mut preamble = String::new();

    for line in lines {
        if let Some((number, lesson_title)) = parse_lesson_marker(line) {
            lessons.push(Lesson {
                number,
                title: lesson_title,
                link: None,
            });
            bodies.push((Some(number), String::new()));
            continue;
        }

        if let Some(value) = header_value(line, "Lesson Link:") {
            if let Some(lesson) = lessons.last_mut() {
                if lesson.link.is_none() {
                    lesson.link = non_empty(value);
                    continue;
                }
            }
        }

        let body = match bodies.last_mut() {
            Some((_, body)) => body,
            None => &mut preamble,
        };
        body.push_str(line);
        body.push('\n');
    }

    // Without lesson markers the whole body belongs to the course itself
    if lessons.is_empty() {
        bodies.push((None, preamble));
    }

    let mut chunks = Vec::new();
    for (lesson_number, body) in &bodies {
        for (i, piece) in chunk_text(body, chunk_size, overlap)?.into_iter().enumerate() {
            let content = match (i, lesson_number) {
                (0, Some(n)) => format!("Lesson {} content: {}", n, piece),
                _ => piece,
            };
            chunks.push(CourseChunk {
                content,
                metadata: ChunkMetadata {
                    course_title: title.clone(),
                    lesson_number: *lesson_number,
                    chunk_index: chunks.len(),
                },
            });
        }
    }

    tracing::debug!(
        "Parsed course '{}': {} lessons, {} chunks",
        title,
        lessons.len(),
        chunks.len()
    );

    Ok(ParsedCourse {
        course: Course {
            title,
            link,
            instructor,
            lessons,
        },
        chunks,
    })
}

fn header_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let trimmed = line.trim();
    let head = trimmed.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(trimmed[prefix.len()..].trim())
    } else {
        None
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Match `Lesson <n>: <title>`.
fn parse_lesson_marker(line: &str) -> Option<(u32, String)> {
    let rest = header_value(line, "Lesson ")?;
    let (number, title) = rest.split_once(':')?;
    let number = number.trim().parse().ok()?;
    Some((number, title.trim().to_string()))
}

//! Ask command handler.
//!
//! Answers one question without session memory.

use super::build_conductor;
use clap::Args;
use coursebot_core::{config::AppConfig, AppError, AppResult};
use coursebot_knowledge::RagResponse;
use std::path::PathBuf;

/// Ask a single question about the course materials
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let query = self.get_query()?;
        let conductor = build_conductor(config).await?;
        let response = conductor.answer(&query, None).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", render_response(&response));
        }

        Ok(())
    }

    fn get_query(&self) -> AppResult<String> {
        let query = match (&self.query, &self.file) {
            (Some(query), _) => query.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => return Err(AppError::Config("No question provided".to_string())),
        };

        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Config("Question is empty".to_string()));
        }
        Ok(query.to_string())
    }
}

/// Plain text rendering: the answer, then a numbered source list.
pub(crate) fn render_response(response: &RagResponse) -> String {
    let mut out = response.answer.clone();

    if !response.sources.is_empty() {
        out.push_str("\n\nSources:");
        for (i, source) in response.sources.iter().enumerate() {
            match &source.url {
                Some(url) => out.push_str(&format!("\n  {}. {} <{}>", i + 1, source.text, url)),
                None => out.push_str(&format!("\n  {}. {}", i + 1, source.text)),
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursebot_knowledge::Source;

    fn command(query: Option<&str>) -> AskCommand {
        AskCommand {
            query: query.map(str::to_string),
            file: None,
            json: false,
        }
    }

    #[test]
    fn test_render_without_sources() {
        let response = RagResponse::new("Just the answer.", vec![]);
        assert_eq!(render_response(&response), "Just the answer.");
    }

    #[test]
    fn test_render_with_sources() {
        let response = RagResponse::new(
            "Answer.",
            vec![
                Source::new("AI Course - Lesson 1", Some("https://example.com/1".to_string())),
                Source::new("AI Course", None),
            ],
        );

        assert_eq!(
            render_response(&response),
            "Answer.\n\nSources:\n  1. AI Course - Lesson 1 <https://example.com/1>\n  2. AI Course"
        );
    }

    #[test]
    fn test_query_is_trimmed() {
        assert_eq!(command(Some("  what is RAG?\n")).get_query().unwrap(), "what is RAG?");
    }

    #[test]
    fn test_missing_or_blank_query_is_error() {
        assert!(command(None).get_query().is_err());
        assert!(command(Some("   ")).get_query().is_err());
    }
}

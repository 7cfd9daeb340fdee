//! Chat command handler.
//!
//! A line-oriented conversation over stdin sharing one session, so
//! follow-up questions see earlier exchanges.

use super::ask::render_response;
use super::build_conductor;
use clap::Args;
use coursebot_core::{config::AppConfig, AppResult};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const EXIT_COMMANDS: &[&str] = &["exit", "quit", ":q"];

/// Interactive conversation about the course materials
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Prompt shown before each question
    #[arg(long, default_value = "> ")]
    pub prompt: String,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let conductor = build_conductor(config).await?;
        let session_id = conductor.create_session().await;
        tracing::info!(session = %session_id, "Chat session started");

        println!("Ask about the course materials. Type 'exit' to leave.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{}", self.prompt);
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if is_exit(query) {
                break;
            }

            // A failed query ends that turn only; the session carries on
            match conductor.answer(query, Some(&session_id)).await {
                Ok(response) => println!("{}\n", render_response(&response)),
                Err(e) => {
                    tracing::warn!("Query failed: {}", e);
                    eprintln!("Error: {}\n", e);
                }
            }
        }

        Ok(())
    }
}

fn is_exit(input: &str) -> bool {
    EXIT_COMMANDS.iter().any(|c| input.eq_ignore_ascii_case(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(is_exit(":q"));
        assert!(!is_exit("exit strategies in lesson 3?"));
    }
}

//! Courses command handler.

use super::build_conductor;
use clap::Args;
use coursebot_core::{config::AppConfig, AppResult};

/// List the courses loaded from the docs folder
#[derive(Args, Debug)]
pub struct CoursesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CoursesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let conductor = build_conductor(config).await?;
        let analytics = conductor.course_analytics();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&analytics)?);
            return Ok(());
        }

        if analytics.total_courses == 0 {
            println!("No courses loaded from {:?}", config.resolved_docs_dir());
            return Ok(());
        }

        println!("Courses ({}):", analytics.total_courses);
        for title in &analytics.course_titles {
            println!("  - {}", title);
        }

        Ok(())
    }
}

//! Configuration management for coursebot.
//!
//! Configuration is merged from several layers, later layers winning:
//! - Built-in defaults
//! - Config file (`.coursebot/config.yaml` or `COURSEBOT_CONFIG`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the completion factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["anthropic", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .coursebot/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Completion provider ("anthropic" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Provider base URL override
    pub endpoint: Option<String>,

    /// API key for the completion provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Completion budget per provider call
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Number of tool rounds before the forced text-only call
    pub max_tool_rounds: usize,

    /// Exchanges retained per session
    pub max_history: usize,

    /// Chunks returned per content search
    pub max_results: usize,

    /// Characters per chunk at ingestion
    pub chunk_size: usize,

    /// Overlapping characters between neighbouring chunks
    pub chunk_overlap: usize,

    /// Embedding vector width
    pub embedding_dim: usize,

    /// Folder of course documents loaded at startup
    pub docs_dir: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// On-disk configuration file. Every field is optional so partial files merge cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalSection>,
    session: Option<SessionSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    max_tool_rounds: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalSection {
    docs_dir: Option<String>,
    max_results: Option<usize>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    embedding_dim: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionSection {
    max_history: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            endpoint: None,
            api_key: None,
            max_tokens: 800,
            temperature: 0.0,
            max_tool_rounds: 2,
            max_history: 2,
            max_results: 5,
            chunk_size: 800,
            chunk_overlap: 100,
            embedding_dim: 384,
            docs_dir: PathBuf::from("docs"),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `COURSEBOT_WORKSPACE`: Override workspace path
    /// - `COURSEBOT_CONFIG`: Path to config file
    /// - `COURSEBOT_PROVIDER`: Completion provider
    /// - `COURSEBOT_MODEL`: Model identifier
    /// - `COURSEBOT_API_KEY` / `ANTHROPIC_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use coursebot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Provider: {}", config.provider);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Load configuration with an explicit workspace and/or config file.
    ///
    /// Explicit paths win over `COURSEBOT_WORKSPACE` and `COURSEBOT_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| std::env::var_os("COURSEBOT_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        if let Some(config_file) = config_file.or_else(|| std::env::var_os("COURSEBOT_CONFIG").map(PathBuf::from)) {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the config file
        if let Ok(provider) = std::env::var("COURSEBOT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("COURSEBOT_MODEL") {
            config.model = model;
        }

        if let Ok(key) = std::env::var("COURSEBOT_API_KEY") {
            config.api_key = Some(key);
        } else if config.api_key.is_none() {
            config.api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        let mut result = self.clone();

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(env_var) = llm.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
            if let Some(max_tokens) = llm.max_tokens {
                result.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                result.temperature = temperature;
            }
            if let Some(rounds) = llm.max_tool_rounds {
                result.max_tool_rounds = rounds;
            }
        }

        if let Some(retrieval) = file.retrieval {
            if let Some(dir) = retrieval.docs_dir {
                result.docs_dir = PathBuf::from(dir);
            }
            if let Some(max_results) = retrieval.max_results {
                result.max_results = max_results;
            }
            if let Some(size) = retrieval.chunk_size {
                result.chunk_size = size;
            }
            if let Some(overlap) = retrieval.chunk_overlap {
                result.chunk_overlap = overlap;
            }
            if let Some(dim) = retrieval.embedding_dim {
                result.embedding_dim = dim;
            }
        }

        if let Some(session) = file.session {
            if let Some(max_history) = session.max_history {
                result.max_history = max_history;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        docs_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(docs_dir) = docs_dir {
            self.docs_dir = docs_dir;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .coursebot directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".coursebot")
    }

    /// Resolve the course documents folder against the workspace.
    pub fn resolved_docs_dir(&self) -> PathBuf {
        if self.docs_dir.is_absolute() {
            self.docs_dir.clone()
        } else {
            self.workspace.join(&self.docs_dir)
        }
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.provider == "anthropic" && self.api_key.as_deref().unwrap_or("").is_empty() {
            return Err(AppError::Config(
                "Anthropic provider requires an API key (COURSEBOT_API_KEY or ANTHROPIC_API_KEY)"
                    .to_string(),
            ));
        }

        if self.max_tool_rounds == 0 {
            return Err(AppError::Config(
                "max_tool_rounds must be at least 1".to_string(),
            ));
        }

        if self.max_results == 0 {
            return Err(AppError::Config("max_results must be at least 1".to_string()));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}

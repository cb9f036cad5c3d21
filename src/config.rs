//! TOML configuration.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [recommender]
//! provider = "gemini"            # or "disabled"
//! model = "gemini-3-flash-preview"
//! api_key_env = "API_KEY"
//! top_n = 3
//! ranking = "as_returned"        # or "score"
//!
//! [seed]
//! demo = true                    # default; false starts with empty collections
//! ```

use anyhow::{Context, Result};
use mentor_match_core::prompt::PromptOptions;
use mentor_match_core::recommend::RankingOrder;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub recommender: RecommenderConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommenderConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Inline key. Takes precedence over `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout. Unset means wait for the service indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub ranking: RankingOrder,
    #[serde(default = "default_program_name")]
    pub program_name: String,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: None,
            top_n: default_top_n(),
            ranking: RankingOrder::default(),
            program_name: default_program_name(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_api_key_env() -> String {
    "API_KEY".to_string()
}
fn default_top_n() -> usize {
    3
}
fn default_program_name() -> String {
    "Iron Lady".to_string()
}

impl RecommenderConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    pub fn prompt_options(&self) -> PromptOptions {
        PromptOptions {
            program_name: self.program_name.clone(),
            top_n: self.top_n,
        }
    }

    /// Resolve the API key from config, then from the environment.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .with_context(|| {
                format!(
                    "{} environment variable not set (or set recommender.api_key)",
                    self.api_key_env
                )
            })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    /// Start with the built-in demo roster. `false` starts empty.
    #[serde(default = "default_demo")]
    pub demo: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            demo: default_demo(),
        }
    }
}

fn default_demo() -> bool {
    true
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.recommender.top_n == 0 {
        anyhow::bail!("recommender.top_n must be >= 1");
    }

    if config.recommender.timeout_secs == Some(0) {
        anyhow::bail!("recommender.timeout_secs must be > 0 when set");
    }

    match config.recommender.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown recommender provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

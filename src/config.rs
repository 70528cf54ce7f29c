//! Service configuration, read from a TOML or YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_MAX_ITERATIONS;
use crate::error::ConfigError;
use crate::planner::PlannerLayout;
use crate::tools::Variant;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub planner: PlannerLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Sessions whose last result is kept for `GET /chat/{id}`; the least
    /// recently used is dropped first.
    #[serde(default = "default_max_stored_results")]
    pub max_stored_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible server, without `/v1/...`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Directory of `<object>.txt` notes used by the retrieval variant.
    #[serde(default = "default_kb_dir")]
    pub kb_dir: PathBuf,
    /// Variant used when a request does not name one.
    #[serde(default)]
    pub variant: Variant,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_max_stored_results() -> usize {
    64
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_kb_dir() -> PathBuf {
    PathBuf::from("kb")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
            max_stored_results: default_max_stored_results(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            kb_dir: default_kb_dir(),
            variant: Variant::default(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse TOML config: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse YAML config: {}", e))
    }

    /// Load from `path`, trying TOML first and then YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        match Self::from_toml(&content) {
            Ok(config) => Ok(config),
            Err(toml_err) => Self::from_yaml(&content).map_err(|yaml_err| {
                log::debug!(target: "config", "{toml_err}; {yaml_err}");
                ConfigError::Parse {
                    path: path.display().to_string(),
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.server.max_stored_results, 64);
        assert_eq!(config.agent.max_iterations, 30);
        assert_eq!(config.agent.variant, Variant::Diagram);
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.planner.canvas_width, 700.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [llm]
            model = "local-model"

            [agent]
            variant = "retrieval"

            [planner]
            spacing = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.llm.base_url, "http://localhost:8080");
        assert_eq!(config.agent.variant, Variant::Retrieval);
        assert_eq!(config.planner.spacing, 120.0);
        assert_eq!(config.planner.process_width, 150.0);
    }

    #[test]
    fn yaml_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  bind: \"127.0.0.1:9000\"\nagent:\n  max_iterations: 5\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.agent.max_iterations, 5);
    }

    #[test]
    fn unreadable_and_unparsable_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "server = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }
}

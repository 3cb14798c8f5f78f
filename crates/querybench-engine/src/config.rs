//! Workspace configuration.
//!
//! One JSON file under the workspace data directory holds the assistant
//! command, the evaluation settings, and the optional schema file that is
//! folded into assistant prompts. Every field has a serde default so a
//! partial (or absent) file still produces a usable config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for querybench.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// The assistant used to answer questions.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Evaluation settings.
    #[serde(default)]
    pub evaluation: EvalConfig,

    /// Optional path to a schema description included in assistant prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<PathBuf>,
}

/// Configuration for the assistant subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Assistant name (e.g., "claude", "codex", "gemini").
    pub name: String,

    /// Command and arguments to invoke the assistant.
    pub command_argv: Vec<String>,

    /// Timeout in seconds for one assistant invocation.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    300
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self::default_for("claude")
    }
}

impl AssistantConfig {
    /// Default invocation for a known assistant CLI; unknown names get a
    /// bare single-word command the user can refine in the config editor.
    pub fn default_for(name: &str) -> Self {
        let command_argv = match name {
            "claude" => vec!["claude", "-p", "--output-format", "text"],
            "codex" => vec!["codex", "exec", "-"],
            "gemini" => vec!["gemini", "-p"],
            other => vec![other],
        };
        Self {
            name: name.into(),
            command_argv: command_argv.into_iter().map(String::from).collect(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Resolve the assistant binary on `PATH`, if present.
    pub fn resolve_command(&self) -> Option<PathBuf> {
        let binary = self.command_argv.first()?;
        which::which(binary).ok()
    }
}

/// Evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Path to the ground-truth corpus of (input, expected SQL) pairs.
    #[serde(default = "default_ground_truth_path")]
    pub ground_truth_path: PathBuf,

    /// Minimum similarity for a case to count as successful.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Cap on the number of evaluated cases (all cases when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_limit: Option<usize>,
}

fn default_ground_truth_path() -> PathBuf {
    PathBuf::from("ground_truth.csv")
}

fn default_similarity_threshold() -> f64 {
    0.8
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            ground_truth_path: default_ground_truth_path(),
            similarity_threshold: default_similarity_threshold(),
            case_limit: None,
        }
    }
}

impl Config {
    /// Read and parse the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(ConfigError::Parse)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Contents of the configured schema file, if readable.
    pub fn read_schema(&self) -> Option<String> {
        let path = self.schema_path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(schema) => Some(schema),
            Err(e) => {
                tracing::warn!("failed to read schema file {}: {e}", path.display());
                None
            }
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// How a text span is resolved to an industry or video-purpose category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// First declared category with any keyword present in the text.
    FirstMatch,
    /// Category with the most distinct keywords present; ties go to the
    /// category declared first.
    #[default]
    MostMatches,
}

impl FromStr for MatchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-match" | "first_match" | "first" => Ok(Self::FirstMatch),
            "most-matches" | "most_matches" | "score" => Ok(Self::MostMatches),
            other => Err(Error::Config(format!("unknown match strategy: {}", other))),
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstMatch => write!(f, "first-match"),
            Self::MostMatches => write!(f, "most-matches"),
        }
    }
}

/// Paths to all vidscript data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database (`data/vidscript.db`).
    pub database: PathBuf,
    /// LLM configuration (`data/llm-config.json`).
    pub llm_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            database: root.join("vidscript.db"),
            llm_config_file: root.join("llm-config.json"),
            root,
        })
    }
}

/// Top-level vidscript configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Category resolution used by the rule-based extractor.
    pub match_strategy: MatchStrategy,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5119);

        let match_strategy = match std::env::var("VIDSCRIPT_MATCH_STRATEGY") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; using {}", e, MatchStrategy::default());
                MatchStrategy::default()
            }),
            Err(_) => MatchStrategy::default(),
        };

        Ok(Self {
            port,
            data_paths: DataPaths::new(data_dir)?,
            match_strategy,
            max_upload_bytes: 10 * 1024 * 1024,
        })
    }
}

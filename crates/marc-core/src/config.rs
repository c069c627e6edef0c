use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MarcError, MarcResult};
use crate::types::{Algorithm, NameEncoding};

/// Top-level configuration (loaded from marc.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarcConfig {
    pub archive: ArchiveConfig,
    pub crypto: CryptoConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Archive name used when none is given on the command line
    pub default_name: String,
    /// Byte encoding for entry names (utf-8, ascii, latin-1)
    pub name_encoding: NameEncoding,
    /// Extraction directory (default: current directory)
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Algorithm applied when a password is supplied ("aes" or "none")
    pub algorithm: Algorithm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            default_name: "archive".into(),
            name_encoding: NameEncoding::Utf8,
            output_dir: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl MarcConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> MarcResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| MarcError::Config(format!("reading {}: {e}", path.display())))?;
        Self::parse(&content)
            .map_err(|e| MarcError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

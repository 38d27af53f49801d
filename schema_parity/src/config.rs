//! Configuration handling for SchemaParity

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sources::SourceKind;

/// Default file name looked up in the working directory by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "schema_parity.toml";

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete SchemaParity configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub logging: Option<LoggingConfig>,
}

/// Locations of the three schema descriptions
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directory that relative paths are resolved against
    pub base_dir: PathBuf,
    pub sync_rules: PathBuf,
    pub client_schema: PathBuf,
    pub backend_schema: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            sync_rules: PathBuf::from("powersync-sync-rules.yaml"),
            client_schema: PathBuf::from("src/lib/powersync/PowerSyncSchema.ts"),
            backend_schema: PathBuf::from("src/types/supabase.ts"),
        }
    }
}

impl SourcesConfig {
    /// Configured location of a source, resolved against `base_dir`
    pub fn path_for(&self, kind: SourceKind) -> PathBuf {
        let path = match kind {
            SourceKind::SyncRules => &self.sync_rules,
            SourceKind::ClientSchema => &self.client_schema,
            SourceKind::BackendSchema => &self.backend_schema,
        };
        resolve(&self.base_dir, path)
    }
}

/// Report output configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub path: PathBuf,
    /// Exit with a failure status when the report contains issues
    pub strict: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sync_compatibility_report.txt"),
            strict: false,
        }
    }
}

/// Extraction tuning
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Client column types accepted as `column.<type>`; `None` accepts any
    pub client_column_types: Option<Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "text".to_string(),
            console: true,
        }
    }
}

impl Config {
    /// Report destination, resolved against the sources base directory
    pub fn report_path(&self) -> PathBuf {
        resolve(&self.sources.base_dir, &self.report.path)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver (directories only)
//!
//! Loads and saves user settings as TOML from the cross-platform config path
//! resolved by the [`directories`](https://docs.rs/directories) crate.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::python::environment::PackageManager;

pub const QUALIFIER: &str = "org";
pub const ORGANIZATION: &str = "lazypy";
pub const APPLICATION: &str = "lazypy";

/// Logging configuration for the tracing file layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, combined with `RUST_LOG`.
    pub level: String,

    /// Override for the log directory. Defaults to `<data_dir>/logs`.
    pub dir: Option<PathBuf>,

    /// Rolling file prefix.
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            file_prefix: "lazypy".to_string(),
        }
    }
}

/// Remote endpoints queried by the package index collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Simple index listing page, scraped line by line.
    pub index_url: String,

    /// Package metadata document, `{name}` is substituted.
    pub detail_url_template: String,

    /// Download statistics document, `{name}` is substituted.
    pub stats_url_template: String,

    /// Fewer names than this marks the index as degraded.
    pub min_index_names: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_url: "https://pypi.org/simple/".to_string(),
            detail_url_template: "https://pypi.org/pypi/{name}/json".to_string(),
            stats_url_template: "https://pypistats.org/api/packages/{name}/recent".to_string(),
            min_index_names: 50,
        }
    }
}

impl IndexConfig {
    pub fn detail_url(&self, name: &str) -> String {
        self.detail_url_template.replace("{name}", name)
    }

    pub fn stats_url(&self, name: &str) -> String {
        self.stats_url_template.replace("{name}", name)
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_manager: PackageManager,

    /// Spinner tick interval.
    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,

    /// Directory scanned recursively for Python scripts.
    pub script_root: PathBuf,

    /// Directory name skipped while scanning scripts.
    pub venv_dir_name: String,

    pub index: IndexConfig,

    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_manager: PackageManager::Pip,
            tick_rate: Duration::from_millis(120),
            script_root: PathBuf::from("."),
            venv_dir_name: ".venv".to_string(),
            index: IndexConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Loads config from the TOML file in the app config dir, or returns defaults.
    ///
    /// A missing file is created with the default configuration.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config to the TOML file in the app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    pub fn project_dirs() -> anyhow::Result<ProjectDirs> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| anyhow::anyhow!("Could not determine project directories."))
    }

    /// Returns the canonical config file path.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for the rolling log files.
    pub fn log_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.log.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("logs")),
        }
    }
}

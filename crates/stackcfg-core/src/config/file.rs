//! File-based configuration (YAML)
//!
//! User-level config lives at `<config_dir>/stackcfg/config.yaml`; any other
//! path can be given explicitly.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::deployment::DeploymentConfig;
use super::settings::ResolverSettings;
use super::traits::{ConfigError, ConfigResult};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Deployment flags used by the planner
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Resolver options
    #[serde(default)]
    pub resolver: ResolverOptions,
}

/// Resolver options as written in the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    pub region: Option<String>,
    pub max_concurrent_lookups: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Build resolver settings for an already selected region
    pub fn resolver_settings(&self, region: impl Into<String>) -> ResolverSettings {
        let mut settings =
            ResolverSettings::new(region).with_name_prefix(self.deployment.name_prefix.clone());
        if let Some(limit) = self.resolver.max_concurrent_lookups {
            settings = settings.with_max_concurrent_lookups(limit);
        }
        if let Some(secs) = self.resolver.timeout_secs {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        settings
    }
}

/// Reads the YAML configuration file
///
/// # Example
///
/// ```no_run
/// use stackcfg_core::config::FileConfigSource;
///
/// let config = FileConfigSource::user().load().unwrap();
/// println!("suffix: {}", config.deployment.stack_suffix);
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// User-level config (`<config_dir>/stackcfg/config.yaml`)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("stackcfg").join("config.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the file; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: self.path.display().to_string(),
            message,
        })
    }

    /// Load the file, failing if it does not exist
    pub fn load_required(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            return Err(ConfigError::Invalid(format!(
                "config file {} does not exist",
                self.path.display()
            )));
        }
        self.load()
    }

    fn parse(content: &str) -> Result<ConfigFile, String> {
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}

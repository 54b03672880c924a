//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dynsky/dynsky.toml`
//! 3. Local config: `<dir>/.dynsky.toml` (working directory by default)
//! 4. Environment variables: `DYNSKY_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, RecordPolicy};

/// Maps a file-name fragment to a dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DimensionHint {
    /// Substring searched for in the coordinate file name
    pub pattern: String,
    pub dimension: usize,
}

impl DimensionHint {
    pub fn new(pattern: impl Into<String>, dimension: usize) -> Self {
        Self {
            pattern: pattern.into(),
            dimension,
        }
    }
}

/// Raw settings for intermediate parsing (every field optional to detect
/// "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub dimension: Option<usize>,
    pub default_dimension: Option<usize>,
    pub dimension_hints: Option<Vec<DimensionHint>>,
    pub output: Option<PathBuf>,
    pub lenient: Option<bool>,
}

/// Unified configuration for dynsky.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Explicit dimension, overrides hints and default
    pub dimension: Option<usize>,
    /// Dimension used when nothing else applies
    pub default_dimension: usize,
    /// Snapshot output file
    pub output: PathBuf,
    /// Skip bad records instead of aborting
    pub lenient: bool,
    /// Checked in order against the coordinate file name
    pub dimension_hints: Vec<DimensionHint>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dimension: None,
            default_dimension: 4,
            output: PathBuf::from("small.out"),
            lenient: false,
            dimension_hints: vec![DimensionHint::new("medium", 5), DimensionHint::new("large", 7)],
        }
    }
}

/// Get the XDG config directory for dynsky.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dynsky").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dynsky.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".dynsky.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Typed lookup of one override; None when the variable is not set.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("DYNSKY_{}: {}", key.to_uppercase(), e),
        }),
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            dimension: overlay.dimension.or(self.dimension),
            default_dimension: overlay.default_dimension.unwrap_or(self.default_dimension),
            output: overlay.output.clone().unwrap_or_else(|| self.output.clone()),
            lenient: overlay.lenient.unwrap_or(self.lenient),
            dimension_hints: overlay
                .dimension_hints
                .clone()
                .unwrap_or_else(|| self.dimension_hints.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Directory searched for `.dynsky.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, Self::environment())?;

        current.output = expand_path(&current.output);
        current.validate()?;
        Ok(current)
    }

    /// The `DYNSKY_*` variable source.
    fn environment() -> Environment {
        Environment::with_prefix("DYNSKY")
            .prefix_separator("_")
            .separator("__")
    }

    /// Apply DYNSKY_* environment variables as explicit overrides.
    ///
    /// A variable that is set but does not parse is a config error.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value::<usize>(&config, "dimension")? {
            settings.dimension = Some(val);
        }
        if let Some(val) = env_value::<usize>(&config, "default_dimension")? {
            settings.default_dimension = val;
        }
        if let Some(val) = env_value::<String>(&config, "output")? {
            settings.output = PathBuf::from(val);
        }
        if let Some(val) = env_value::<bool>(&config, "lenient")? {
            settings.lenient = val;
        }

        Ok(settings)
    }

    /// Reject dimensions of zero anywhere in the settings.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let zero_hint = self.dimension_hints.iter().find(|h| h.dimension == 0);
        if self.dimension == Some(0) || self.default_dimension == 0 || zero_hint.is_some() {
            return Err(ApplicationError::Config {
                message: "dimension must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Dimension for a coordinate file: explicit setting, then the first
    /// hint found in the file name, then the default.
    pub fn resolve_dimension(&self, coords: &Path) -> usize {
        if let Some(dimension) = self.dimension {
            return dimension;
        }
        let name = coords
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.dimension_hints
            .iter()
            .find(|hint| name.contains(&hint.pattern))
            .map_or(self.default_dimension, |hint| hint.dimension)
    }

    pub fn record_policy(&self) -> RecordPolicy {
        RecordPolicy::from_lenient(self.lenient)
    }

    /// Settings rendered as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

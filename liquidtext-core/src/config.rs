use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::gesture::{SpacingLimits, DEFAULT_SPACING, MAX_SPACING, MIN_SPACING, PINCH_SENSITIVITY};
use crate::layout::BASE_UNIT;
use crate::search::MIN_QUERY_LEN;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the text layer. Every field is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub min_spacing: f32,
    pub max_spacing: f32,
    pub default_spacing: f32,
    pub base_unit: f32,
    pub pinch_sensitivity: f32,
    pub min_query_len: usize,
    /// Terminal rows per layout unit.
    pub rows_per_unit: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_spacing: MIN_SPACING,
            max_spacing: MAX_SPACING,
            default_spacing: DEFAULT_SPACING,
            base_unit: BASE_UNIT,
            pinch_sensitivity: PINCH_SENSITIVITY,
            min_query_len: MIN_QUERY_LEN,
            rows_per_unit: 1.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.min_spacing,
            self.max_spacing,
            self.default_spacing,
            self.base_unit,
            self.pinch_sensitivity,
            self.rows_per_unit,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(ConfigError::Invalid("values must be finite".into()));
        }
        if self.min_spacing <= 0.0 || self.min_spacing > self.max_spacing {
            return Err(ConfigError::Invalid(format!(
                "spacing range {}..{} is empty",
                self.min_spacing, self.max_spacing
            )));
        }
        if !(self.min_spacing..=self.max_spacing).contains(&self.default_spacing) {
            return Err(ConfigError::Invalid(format!(
                "default spacing {} outside {}..{}",
                self.default_spacing, self.min_spacing, self.max_spacing
            )));
        }
        if self.base_unit <= 0.0 || self.rows_per_unit <= 0.0 {
            return Err(ConfigError::Invalid(
                "base_unit and rows_per_unit must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn spacing_limits(&self) -> SpacingLimits {
        SpacingLimits {
            min: self.min_spacing,
            max: self.max_spacing,
            default: self.default_spacing,
            sensitivity: self.pinch_sensitivity,
        }
    }
}

pub fn default_config_path(project_dirs: &ProjectDirs) -> PathBuf {
    project_dirs.config_dir().join(CONFIG_FILE_NAME)
}

//! Application configuration.

use clusterpad_core::Rgba;
use clusterpad_core::palette;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "CLUSTERPAD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub initial_k: usize,
    pub min_k: usize,
    pub max_k: usize,
    /// Show cluster hulls from the first frame.
    pub show_boundaries: bool,
    pub background_color: Rgba,
    pub canvas_color: Rgba,
    pub point_color: Rgba,
    /// Right-click removes every point within this distance.
    pub removal_radius: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "ClusterPad".to_string(),
            width: 800,
            height: 600,
            canvas_width: 600.0,
            canvas_height: 600.0,
            initial_k: 3,
            min_k: 1,
            max_k: 10,
            show_boundaries: false,
            background_color: palette::BACKGROUND,
            canvas_color: palette::WHITE,
            point_color: palette::BLACK,
            removal_radius: 10.0,
        }
    }
}

impl AppConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from `$CLUSTERPAD_CONFIG` when set, otherwise use defaults.
    ///
    /// A broken config file is reported and replaced by the defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                log::warn!("{}; using default config", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} is empty",
                self.width, self.height
            )));
        }
        let canvas_ok = self.canvas_width.is_finite()
            && self.canvas_height.is_finite()
            && self.canvas_width > 0.0
            && self.canvas_height > 0.0;
        if !canvas_ok {
            return Err(ConfigError::Invalid(format!(
                "canvas size {}x{} is not positive",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.min_k == 0 || self.min_k > self.max_k {
            return Err(ConfigError::Invalid(format!(
                "k range {}..={} is empty or starts at zero",
                self.min_k, self.max_k
            )));
        }
        if !(self.min_k..=self.max_k).contains(&self.initial_k) {
            return Err(ConfigError::Invalid(format!(
                "initial k {} outside {}..={}",
                self.initial_k, self.min_k, self.max_k
            )));
        }
        if !self.removal_radius.is_finite() || self.removal_radius < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "removal radius {} is negative",
                self.removal_radius
            )));
        }
        Ok(())
    }
}

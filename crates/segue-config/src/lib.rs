//! Segue configuration system
//!
//! This crate provides centralized configuration for Segue, loading
//! transition defaults and runner settings from `segue.toml`, with
//! environment variables taking precedence over file values.
//!
//! ```toml
//! [transitions]
//! default_length = 0.5
//! default_easing = "ease_out_cubic"
//! default_animation = "slide_left"
//! sort_priority = "target"
//!
//! [runner]
//! time_scale = 1.0
//!
//! [logging]
//! filter = "segue_nav=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use segue_anim::{AnimationType, EasingMode};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "segue.toml";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which side of a transition is drawn on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPriority {
    /// Derived from which sides animate.
    Auto,
    Source,
    Target,
}

impl Default for SortPriority {
    fn default() -> Self {
        Self::Auto
    }
}

/// Main configuration structure for Segue
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SegueConfig {
    /// Defaults for transitions requested without explicit parameters
    pub transitions: TransitionsConfig,
    /// Frame driver settings
    pub runner: RunnerConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Transition defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionsConfig {
    /// Transition length in seconds
    pub default_length: f32,
    pub default_easing: EasingMode,
    /// Animation type used for both entry and exit
    pub default_animation: AnimationType,
    pub sort_priority: SortPriority,
}

/// Frame driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Multiplier applied to scaled players
    pub time_scale: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for TransitionsConfig {
    fn default() -> Self {
        Self {
            default_length: 0.3,
            default_easing: EasingMode::EaseInOut,
            default_animation: AnimationType::Fade,
            sort_priority: SortPriority::Auto,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl SegueConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `segue.toml` in the current directory,
    /// or return defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over file values. Values that
    /// fail to parse are ignored.
    pub fn merge_with_env(&mut self) {
        // Transition settings
        if let Ok(val) = std::env::var("SEGUE_TRANSITION_LENGTH") {
            if let Ok(length) = val.parse::<f32>() {
                if length >= 0.0 {
                    self.transitions.default_length = length;
                }
            }
        }
        if let Ok(val) = std::env::var("SEGUE_TRANSITION_EASING") {
            if let Ok(easing) = val.parse::<EasingMode>() {
                self.transitions.default_easing = easing;
            }
        }
        if let Ok(val) = std::env::var("SEGUE_TRANSITION_ANIMATION") {
            if let Ok(kind) = val.parse::<AnimationType>() {
                self.transitions.default_animation = kind;
            }
        }

        // Runner settings
        if let Ok(val) = std::env::var("SEGUE_TIME_SCALE") {
            if let Ok(scale) = val.parse::<f32>() {
                self.runner.time_scale = scale.max(0.0);
            }
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from segue.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

//! # Try-On Configuration
//!
//! Configuration management for the try-on engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TRYON_API_TOKEN=...                                                │
//! │     TRYON_LOCALE=en                                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tryon/tryon.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.tryon.tryon/tryon.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     built-in default lens, 1280x720 front camera, no step timeout      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [runtime]
//! api_token = "eyJhbGciOi..."
//!
//! [effects]
//! default_effect_id = "967302b9-f409-48d8-b310-0141b6c51425"
//! default_group_id = "5b40ca22-8160-4210-8bbd-c2ac69befd8d"
//!
//! [camera]
//! facing_mode = "user"
//! ideal_width = 1280
//! ideal_height = 720
//!
//! [session]
//! locale = "es"
//! step_timeout_secs = 20   # omit for no timeout
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use tryon_core::{EffectRef, Locale, DEFAULT_EFFECT_GROUP_ID, DEFAULT_EFFECT_ID};

use crate::error::{SessionError, SessionResult};
use crate::platform::{FacingMode, VideoConstraints};

// =============================================================================
// Sections
// =============================================================================

/// AR runtime credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Token passed to the runtime bootstrap.
    #[serde(default)]
    pub api_token: String,
}

/// Lens used when a product has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSettings {
    #[serde(default = "default_effect_id")]
    pub default_effect_id: String,

    #[serde(default = "default_group_id")]
    pub default_group_id: String,
}

fn default_effect_id() -> String {
    DEFAULT_EFFECT_ID.to_string()
}

fn default_group_id() -> String {
    DEFAULT_EFFECT_GROUP_ID.to_string()
}

impl Default for EffectSettings {
    fn default() -> Self {
        EffectSettings {
            default_effect_id: default_effect_id(),
            default_group_id: default_group_id(),
        }
    }
}

/// Camera request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    #[serde(default)]
    pub facing_mode: FacingMode,

    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,

    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
}

fn default_ideal_width() -> u32 {
    1280
}

fn default_ideal_height() -> u32 {
    720
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            facing_mode: FacingMode::default(),
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
        }
    }
}

/// Session behaviour settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Language of failure messages.
    #[serde(default)]
    pub locale: Locale,

    /// Upper bound for each awaited step. `None` waits indefinitely.
    #[serde(default)]
    pub step_timeout_secs: Option<u64>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete try-on configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TryOnConfig {
    #[serde(default)]
    pub runtime: RuntimeSettings,

    #[serde(default)]
    pub effects: EffectSettings,

    #[serde(default)]
    pub camera: CameraSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl TryOnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tryon.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading try-on config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());

        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Try-on config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        if self.effects.default_effect_id.trim().is_empty()
            || self.effects.default_group_id.trim().is_empty()
        {
            return Err(SessionError::InvalidConfig(
                "default lens id and group id must both be set".into(),
            ));
        }

        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            return Err(SessionError::InvalidConfig(
                "camera dimensions must be greater than 0".into(),
            ));
        }

        if self.session.step_timeout_secs == Some(0) {
            return Err(SessionError::InvalidConfig(
                "step_timeout_secs must be greater than 0 (omit it to disable)".into(),
            ));
        }

        // The runtime rejects a bad token itself, at bootstrap.
        if self.runtime.api_token.is_empty() {
            warn!("No AR runtime API token configured");
        }

        Ok(())
    }

    /// Applies overrides from a key lookup (the process environment in
    /// [`TryOnConfig::load`]).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TRYON_API_TOKEN") {
            debug!("Overriding API token from environment");
            self.runtime.api_token = token;
        }

        if let Some(id) = lookup("TRYON_DEFAULT_EFFECT_ID") {
            self.effects.default_effect_id = id;
        }

        if let Some(id) = lookup("TRYON_DEFAULT_EFFECT_GROUP_ID") {
            self.effects.default_group_id = id;
        }

        if let Some(locale) = lookup("TRYON_LOCALE") {
            match locale.parse() {
                Ok(parsed) => self.session.locale = parsed,
                Err(e) => warn!(%locale, "Ignoring locale override: {}", e),
            }
        }

        if let Some(secs) = lookup("TRYON_STEP_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(0) => self.session.step_timeout_secs = None,
                Ok(s) => self.session.step_timeout_secs = Some(s),
                Err(_) => warn!(value = %secs, "Ignoring invalid step timeout override"),
            }
        }

        if let Some(mode) = lookup("TRYON_FACING_MODE") {
            match mode.to_lowercase().as_str() {
                "user" | "front" => self.camera.facing_mode = FacingMode::User,
                "environment" | "rear" | "back" => {
                    self.camera.facing_mode = FacingMode::Environment
                }
                _ => warn!(mode = %mode, "Unknown facing mode in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tryon", "tryon")
            .map(|dirs| dirs.config_dir().join("tryon.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Lens used for generic try-on and products without their own.
    pub fn default_effect(&self) -> EffectRef {
        EffectRef::new(
            self.effects.default_effect_id.clone(),
            self.effects.default_group_id.clone(),
        )
    }

    pub fn video_constraints(&self) -> VideoConstraints {
        VideoConstraints {
            facing_mode: self.camera.facing_mode,
            ideal_width: self.camera.ideal_width,
            ideal_height: self.camera.ideal_height,
        }
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.session.step_timeout_secs.map(Duration::from_secs)
    }

    pub fn locale(&self) -> Locale {
        self.session.locale
    }

    pub fn api_token(&self) -> &str {
        &self.runtime.api_token
    }
}

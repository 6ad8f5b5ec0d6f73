//! Configuration management for Ghost-Engine

use crate::behavior::{ClickConfig, KeystrokeConfig, MotionConfig, ScrollConfig};
use crate::render::RenderConfig;
use crate::session::FatigueConfig;
use crate::transport::{RotationStrategy, TransportConfig};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

/// Engine configuration
///
/// Every section falls back to its defaults, so a file only needs the
/// values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pointer paths
    pub motion: MotionConfig,

    /// Click and double-click timing
    pub click: ClickConfig,

    /// Scroll plans
    pub scroll: ScrollConfig,

    /// Keystroke dynamics
    pub keystroke: KeystrokeConfig,

    /// Session fatigue
    pub fatigue: FatigueConfig,

    /// Transport profile selection
    pub transport: TransportConfig,

    /// Raster noise
    pub render: RenderConfig,
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::configuration(format!("Invalid {}: '{}'", name, value)))
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Apply `GHOST_*` overrides read through `lookup` on top of the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EngineConfig::default();

        if let Some(speed) = lookup("GHOST_SPEED") {
            config.motion.speed = parse_var("GHOST_SPEED", &speed)?;
        }

        if let Some(overshoot) = lookup("GHOST_OVERSHOOT") {
            config.motion.overshoot_probability = parse_var("GHOST_OVERSHOOT", &overshoot)?;
        }

        if let Some(typing_speed) = lookup("GHOST_TYPING_SPEED") {
            config.keystroke.typing_speed = parse_var("GHOST_TYPING_SPEED", &typing_speed)?;
        }

        if let Some(typo_rate) = lookup("GHOST_TYPO_RATE") {
            config.keystroke.typo_rate = parse_var("GHOST_TYPO_RATE", &typo_rate)?;
        }

        if let Some(fatigue) = lookup("GHOST_FATIGUE") {
            config.fatigue.enabled = parse_var("GHOST_FATIGUE", &fatigue)?;
        }

        if let Some(strategy) = lookup("GHOST_TRANSPORT_STRATEGY") {
            config.transport.strategy = RotationStrategy::from_str(&strategy)?;
        }

        if let Some(intensity) = lookup("GHOST_NOISE_INTENSITY") {
            config.render.noise_intensity = parse_var("GHOST_NOISE_INTENSITY", &intensity)?;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject values no generator can honour
    pub fn validate(&self) -> Result<()> {
        self.motion.validate()?;
        self.click.validate()?;
        self.scroll.validate()?;
        self.keystroke.validate()?;
        self.fatigue.validate()?;
        self.render.validate()?;
        self.transport.registry()?;
        Ok(())
    }
}

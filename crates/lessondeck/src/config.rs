use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::render::transition::{TransitionKind, TransitionSettings};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "lessondeck";

pub const MAX_TRANSITION_MS: u64 = 2000;

pub const KEYS: [&str; 3] = [
    "defaults.theme",
    "defaults.transition",
    "defaults.transition_ms",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    /// Duration of each transition half, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_ms: Option<u64>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `lessondeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# lessondeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.transition" => {
                match value {
                    "slide" | "fade" | "none" => {}
                    _ => anyhow::bail!(
                        "Invalid transition: {value}. Must be 'slide', 'fade', or 'none'."
                    ),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .transition = Some(value.to_string());
            }
            "defaults.transition_ms" => {
                let ms = match value.parse::<u64>() {
                    Ok(ms) if ms <= MAX_TRANSITION_MS => ms,
                    _ => anyhow::bail!(
                        "Invalid transition_ms: {value}. Must be a whole number from 0 to {MAX_TRANSITION_MS}."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .transition_ms = Some(ms);
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {}", KEYS.join(", ")),
        }
        Ok(())
    }

    pub fn theme_name(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("light")
    }

    pub fn transition_settings(&self) -> TransitionSettings {
        let mut settings = TransitionSettings::default();
        if let Some(defaults) = &self.defaults {
            if let Some(name) = defaults.transition.as_deref() {
                settings.kind = TransitionKind::from_name(name);
            }
            if let Some(ms) = defaults.transition_ms {
                settings.half_duration = ms.min(MAX_TRANSITION_MS) as f32 / 1000.0;
            }
        }
        settings
    }
}

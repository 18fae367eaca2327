//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default session length and tick interval
//! - The category set offered when labelling a session
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{TargetMinutes, DEFAULT_CATEGORY, DEFAULT_MINUTES};

/// Timer-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u64,
    /// How often a running countdown is recomputed.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Category configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    #[serde(default = "default_category")]
    pub default: String,
    #[serde(default = "default_available")]
    pub available: Vec<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
}

// Default functions
fn default_minutes() -> u64 {
    DEFAULT_MINUTES
}
fn default_tick_interval_ms() -> u64 {
    250
}
fn default_category() -> String {
    DEFAULT_CATEGORY.into()
}
fn default_available() -> Vec<String> {
    ["Studying", "Coding", "Project", "Reading"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            default: default_category(),
            available: default_available(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Array(_) => {
                        // Accept a JSON array or a comma separated list.
                        match serde_json::from_str::<serde_json::Value>(value) {
                            Ok(parsed @ serde_json::Value::Array(_)) => parsed,
                            _ => serde_json::Value::Array(
                                value
                                    .split(',')
                                    .map(str::trim)
                                    .filter(|s| !s.is_empty())
                                    .map(|s| serde_json::Value::String(s.to_string()))
                                    .collect(),
                            ),
                        }
                    }
                    serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// into the existing type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !TargetMinutes::from_minutes(self.timer.default_minutes).is_valid() {
            return Err(ConfigError::InvalidValue {
                key: "timer.default_minutes".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.categories.available.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "categories.available".into(),
                message: "at least one category is required".into(),
            });
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timer.tick_interval_ms.max(1))
    }

    pub fn default_target(&self) -> TargetMinutes {
        TargetMinutes::from_minutes(self.timer.default_minutes)
    }

    /// Match `name` against the available categories, ignoring case.
    ///
    /// Returns the configured spelling.
    pub fn resolve_category(&self, name: &str) -> Result<String, ConfigError> {
        let wanted = name.trim();
        let folded = wanted.to_lowercase();
        self.categories
            .available
            .iter()
            .find(|c| c.to_lowercase() == folded)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownCategory {
                name: wanted.to_string(),
                available: self.categories.available.clone(),
            })
    }

    /// The default category, or the first available one if the default
    /// is not in the set.
    pub fn default_category(&self) -> String {
        self.resolve_category(&self.categories.default)
            .ok()
            .or_else(|| self.categories.available.first().cloned())
            .unwrap_or_else(default_category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.default_minutes, 25);
        assert_eq!(parsed.timer.tick_interval_ms, 250);
        assert_eq!(parsed.categories.available.len(), 4);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\ndefault_minutes = 50\n").unwrap();
        assert_eq!(parsed.timer.default_minutes, 50);
        assert_eq!(parsed.timer.tick_interval_ms, 250);
        assert_eq!(parsed.categories.default, "Studying");
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.default_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("categories.default").as_deref(), Some("Studying"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("timer.tick_interval_ms", "100").unwrap();
        assert_eq!(cfg.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn apply_accepts_comma_separated_categories() {
        let mut cfg = Config::default();
        cfg.apply("categories.available", "Coding, Writing").unwrap();
        assert_eq!(cfg.categories.available, vec!["Coding", "Writing"]);

        cfg.apply("categories.available", r#"["Music"]"#).unwrap();
        assert_eq!(cfg.categories.available, vec!["Music"]);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.default_minutes", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn apply_rejects_zero_values_and_keeps_previous() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.default_minutes", "0").is_err());
        assert!(cfg.apply("timer.tick_interval_ms", "0").is_err());
        assert!(cfg.apply("categories.available", "").is_err());
        assert_eq!(cfg.timer.default_minutes, 25);
        assert_eq!(cfg.categories.available.len(), 4);
    }

    #[test]
    fn resolve_category_is_case_insensitive() {
        let cfg = Config::default();
        assert_eq!(cfg.resolve_category("coding").unwrap(), "Coding");
        assert_eq!(cfg.resolve_category(" READING ").unwrap(), "Reading");
        assert!(matches!(
            cfg.resolve_category("Gaming"),
            Err(ConfigError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn default_category_falls_back_to_first_available() {
        let mut cfg = Config::default();
        cfg.categories.default = "Gone".into();
        assert_eq!(cfg.default_category(), "Studying");
        cfg.categories.available = vec!["Music".into()];
        assert_eq!(cfg.default_category(), "Music");
    }

    #[test]
    fn default_target_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.default_target().minutes(), 25);
    }
}

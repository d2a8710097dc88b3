//! TOML-based application configuration.
//!
//! Stores planning preferences including:
//! - Chunk sizing bounds
//! - Break duration and cadence
//! - Session defer limit
//! - Per-task-type priority scores and the must-do boost
//!
//! Configuration is stored at `~/.config/studyplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::chunker::ChunkingConfig;
use crate::error::ConfigError;
use crate::priority::TypePriorityFeed;
use crate::scheduler::SchedulerConfig;
use crate::session::SessionConfig;
use crate::task::TaskType;

/// Break configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSettings {
    #[serde(default = "default_break_duration")]
    pub break_duration: u32,
    #[serde(default = "default_work_before_break")]
    pub work_before_break: u32,
}

/// Priority annotation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritySettings {
    /// Added to the score of every must-do task.
    #[serde(default = "default_must_do_boost")]
    pub must_do_boost: f64,
    /// Score per task type, keyed by task type label.
    #[serde(default)]
    pub by_type: BTreeMap<String, f64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyplan/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub breaks: BreakSettings,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub priority: PrioritySettings,
}

/// Upper bound for any duration setting (one day).
const MAX_SETTING_MINUTES: u32 = 24 * 60;

// Default functions
fn default_break_duration() -> u32 {
    5
}
fn default_work_before_break() -> u32 {
    25
}
fn default_must_do_boost() -> f64 {
    0.5
}

impl Default for BreakSettings {
    fn default() -> Self {
        Self {
            break_duration: default_break_duration(),
            work_before_break: default_work_before_break(),
        }
    }
}

impl Default for PrioritySettings {
    fn default() -> Self {
        Self {
            must_do_boost: default_must_do_boost(),
            by_type: BTreeMap::new(),
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
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                // Entries of open tables (priority.by_type) may be created.
                let existing = obj.get(part).cloned().unwrap_or(serde_json::Value::Null);
                if existing.is_null() && !key.starts_with("priority.by_type.") {
                    return Err(unknown());
                }

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) | serde_json::Value::Null => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or is
    /// inconsistent, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate a config file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        let cfg: Config = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default configuration");
            Self::default()
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

    /// Set a config value by key. The result must still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the updated config is inconsistent. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check that the settings describe a usable planner.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let c = &self.chunking;
        if c.min_chunk_length == 0 {
            return invalid("chunking.min_chunk_length", "must be at least 1".into());
        }
        if c.max_chunk_length < c.min_chunk_length {
            return invalid(
                "chunking.max_chunk_length",
                format!("must be >= min_chunk_length ({})", c.min_chunk_length),
            );
        }
        if c.must_do_max_chunk_length < c.min_chunk_length {
            return invalid(
                "chunking.must_do_max_chunk_length",
                format!("must be >= min_chunk_length ({})", c.min_chunk_length),
            );
        }
        if self.breaks.break_duration == 0 {
            return invalid("breaks.break_duration", "must be at least 1".into());
        }
        if self.breaks.work_before_break == 0 {
            return invalid("breaks.work_before_break", "must be at least 1".into());
        }
        for (key, minutes) in [
            ("chunking.max_chunk_length", c.max_chunk_length),
            ("chunking.must_do_max_chunk_length", c.must_do_max_chunk_length),
            ("breaks.break_duration", self.breaks.break_duration),
            ("breaks.work_before_break", self.breaks.work_before_break),
        ] {
            if minutes > MAX_SETTING_MINUTES {
                return invalid(key, format!("must be at most {MAX_SETTING_MINUTES} minutes"));
            }
        }
        if !self.priority.must_do_boost.is_finite() {
            return invalid("priority.must_do_boost", "must be a finite number".into());
        }
        for (label, score) in &self.priority.by_type {
            let key = format!("priority.by_type.{label}");
            if TaskType::normalize(label).is_none() {
                return invalid(&key, format!("unknown task type '{label}'"));
            }
            if !score.is_finite() {
                return invalid(&key, "must be a finite number".into());
            }
        }
        Ok(())
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            chunking: self.chunking,
            break_duration: self.breaks.break_duration,
            work_before_break: self.breaks.work_before_break,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        self.session
    }

    /// Priority feed backed by `priority.by_type`.
    pub fn priority_feed(&self) -> TypePriorityFeed {
        TypePriorityFeed::from_labels(&self.priority.by_type)
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
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.chunking.max_chunk_length, 25);
        assert_eq!(cfg.chunking.min_chunk_length, 10);
        assert_eq!(cfg.chunking.must_do_max_chunk_length, 15);
        assert_eq!(cfg.breaks.break_duration, 5);
        assert_eq!(cfg.breaks.work_before_break, 25);
        assert_eq!(cfg.session.max_defers_per_item, 3);
        assert_eq!(cfg.priority.must_do_boost, 0.5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [chunking]
            max_chunk_length = 30

            [priority.by_type]
            reading = 0.8
            "#,
        )
        .unwrap();
        assert_eq!(cfg.chunking.max_chunk_length, 30);
        assert_eq!(cfg.chunking.min_chunk_length, 10);
        assert_eq!(cfg.breaks.break_duration, 5);
        assert_eq!(cfg.priority.by_type.get("reading"), Some(&0.8));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("chunking.max_chunk_length").as_deref(), Some("25"));
        assert_eq!(cfg.get("session.max_defers_per_item").as_deref(), Some("3"));
        assert!(cfg.get("chunking.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("breaks.break_duration", "10").unwrap();
        assert_eq!(cfg.breaks.break_duration, 10);
    }

    #[test]
    fn set_creates_priority_by_type_entry() {
        let mut cfg = Config::default();
        cfg.set("priority.by_type.reading", "0.75").unwrap();
        assert_eq!(cfg.priority.by_type.get("reading"), Some(&0.75));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("chunking.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_number() {
        let mut cfg = Config::default();
        assert!(cfg.set("chunking.max_chunk_length", "long").is_err());
    }

    #[test]
    fn set_rejects_inconsistent_bounds_and_leaves_config_unchanged() {
        let mut cfg = Config::default();
        let err = cfg.set("chunking.max_chunk_length", "5").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.chunking.max_chunk_length, 25);
    }

    #[test]
    fn set_rejects_durations_longer_than_a_day() {
        let mut cfg = Config::default();
        let err = cfg.set("breaks.break_duration", "4294967295").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "breaks.break_duration"));
        assert_eq!(cfg.breaks.break_duration, 5);
        assert!(cfg.set("chunking.max_chunk_length", "1441").is_err());
        assert!(cfg.set("breaks.work_before_break", "1440").is_ok());
    }

    #[test]
    fn validate_rejects_unknown_task_type_score() {
        let mut cfg = Config::default();
        cfg.priority.by_type.insert("knitting".into(), 1.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.session.max_defers_per_item = 7;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.session.max_defers_per_item, 7);
    }

    #[test]
    fn load_from_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "chunking = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn scheduler_config_mirrors_sections() {
        let mut cfg = Config::default();
        cfg.breaks.work_before_break = 40;
        let sc = cfg.scheduler_config();
        assert_eq!(sc.work_before_break, 40);
        assert_eq!(sc.chunking, cfg.chunking);
    }
}

//! Layered settings: built-in defaults, then an optional TOML file, then
//! `SHIFT_EXTRACT__*` environment variables.
//!
//! ```toml
//! target_name = "瓜田"
//!
//! [policy]
//! default_time_column = 3
//! cross_line_patterns = false
//!
//! [event]
//! title = "図書館バイト📚"
//! ```
//!
//! `SHIFT_EXTRACT__POLICY__CONTEXT_LINES_BEFORE=5` overrides a nested key.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::calendar::EventSettings;
use crate::error::ShiftError;
use crate::grid::GridPolicy;
use crate::text::TextPolicy;

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "shift_extract.toml";
pub const ENV_PREFIX: &str = "SHIFT_EXTRACT";

const MAX_UTC_OFFSET_HOURS: i32 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_name: String,
    pub log_level: String,
    pub policy: PolicySettings,
    pub event: EventSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_name: "瓜田".to_string(),
            log_level: "info".to_string(),
            policy: PolicySettings::default(),
            event: EventSettings::default(),
        }
    }
}

/// Grid and text tunables in one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub default_date_column: usize,
    pub default_time_column: usize,
    pub context_lines_before: usize,
    pub context_lines_after: usize,
    pub cross_line_patterns: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        let grid = GridPolicy::default();
        let text = TextPolicy::default();
        Self {
            default_date_column: grid.default_date_column,
            default_time_column: grid.default_time_column,
            context_lines_before: text.context_lines_before,
            context_lines_after: text.context_lines_after,
            cross_line_patterns: text.cross_line_patterns,
        }
    }
}

impl PolicySettings {
    pub fn grid(&self) -> GridPolicy {
        GridPolicy {
            default_date_column: self.default_date_column,
            default_time_column: self.default_time_column,
        }
    }

    pub fn text(&self) -> TextPolicy {
        TextPolicy {
            context_lines_before: self.context_lines_before,
            context_lines_after: self.context_lines_after,
            cross_line_patterns: self.cross_line_patterns,
        }
    }
}

impl Settings {
    /// Load from `path` (must exist) or from [`DEFAULT_CONFIG_FILE`] if
    /// present, then apply the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ShiftError> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ShiftError> {
        let file = match path {
            Some(p) => File::from(p).format(FileFormat::Toml).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE))
                .format(FileFormat::Toml)
                .required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ShiftError> {
        if self.target_name.trim().is_empty() {
            return Err(ShiftError::InvalidSettings(
                "target_name cannot be empty".to_string(),
            ));
        }
        if !(-MAX_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&self.event.utc_offset_hours) {
            return Err(ShiftError::InvalidSettings(format!(
                "event.utc_offset_hours must be within ±{MAX_UTC_OFFSET_HOURS}, got {}",
                self.event.utc_offset_hours
            )));
        }
        self.event.fallback_minutes()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use std::fs;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.target_name, "瓜田");
        assert_eq!(settings.policy.grid(), GridPolicy::default());
        assert_eq!(settings.policy.text(), TextPolicy::default());
        assert_eq!(settings.event.location, "図書館");
    }

    #[test]
    fn test_file_then_env_layering() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shift.toml");
        fs::write(
            &path,
            r#"
target_name = "佐藤"

[policy]
default_time_column = 3
context_lines_before = 1

[event]
title = "受付"
"#,
        )
        .unwrap();

        let settings = Settings::load_with(
            Some(&path),
            env(&[
                ("SHIFT_EXTRACT__POLICY__CONTEXT_LINES_BEFORE", "5"),
                ("SHIFT_EXTRACT__POLICY__CROSS_LINE_PATTERNS", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(settings.target_name, "佐藤");
        assert_eq!(settings.policy.default_time_column, 3);
        assert_eq!(settings.policy.default_date_column, 0);
        assert_eq!(settings.policy.context_lines_before, 5);
        assert!(!settings.policy.cross_line_patterns);
        assert_eq!(settings.event.title, "受付");
        assert_eq!(settings.event.location, "図書館");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Settings::load_with(Some(&missing), env(&[])),
            Err(ShiftError::Config(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings {
            target_name: "  ".to_string(),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ShiftError::InvalidSettings(_))));

        settings.target_name = "瓜田".to_string();
        settings.event.utc_offset_hours = -15;
        assert!(settings.validate().is_err());

        settings.event.utc_offset_hours = 9;
        settings.event.fallback_end = "25:99".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_file_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shift.toml");
        fs::write(&path, "target_name = \"\"\n").unwrap();
        assert!(matches!(
            Settings::load_with(Some(&path), env(&[])),
            Err(ShiftError::InvalidSettings(_))
        ));
    }
}

//! Serializable logger configuration

use super::error::{LoggerError, Result};
use super::formatter::DEFAULT_TIME_LAYOUT;
use super::severity::Severity;
use chrono::format::{Item, StrftimeItems};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Declarative logger settings, typically loaded from a JSON document.
///
/// Every field is optional in the source document.
///
/// # Example
///
/// ```
/// use rust_leveled_log::{LoggerConfig, Severity};
///
/// let config = LoggerConfig::from_json(r#"{ "level": "warn", "full_path": true }"#).unwrap();
/// assert_eq!(config.level, Severity::Warn);
/// assert!(config.full_path);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Threshold, by name (`"info"`) or rank (`2`)
    #[serde(deserialize_with = "deserialize_level")]
    pub level: Severity,

    /// strftime layout for timestamps
    pub time_layout: String,

    /// Strip source roots instead of reducing file paths to their basename
    pub full_path: bool,

    /// Build directory whose parent is registered as a source root
    pub build_dir: Option<String>,

    /// Additional source roots
    pub source_roots: Vec<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Severity::Debug,
            time_layout: DEFAULT_TIME_LAYOUT.to_string(),
            full_path: false,
            build_dir: None,
            source_roots: Vec::new(),
        }
    }
}

impl LoggerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_layout.is_empty() {
            return Err(LoggerError::config("time_layout", "layout must not be empty"));
        }
        if StrftimeItems::new(&self.time_layout).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "time_layout",
                format!("'{}' is not a valid strftime layout", self.time_layout),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Name(String),
    Rank(i64),
}

fn deserialize_level<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Severity, D::Error> {
    match LevelRepr::deserialize(deserializer)? {
        LevelRepr::Name(name) => name.parse().map_err(de::Error::custom),
        LevelRepr::Rank(rank) => Severity::try_from(rank).map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LoggerConfig::from_json("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_level_by_name_or_rank() {
        assert_eq!(LoggerConfig::from_json(r#"{"level":"ERROR"}"#).unwrap().level, Severity::Error);
        assert_eq!(LoggerConfig::from_json(r#"{"level":3}"#).unwrap().level, Severity::Warn);
        assert!(LoggerConfig::from_json(r#"{"level":42}"#).is_err());
        assert!(LoggerConfig::from_json(r#"{"level":"loud"}"#).is_err());
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let err = LoggerConfig::from_json(r#"{"time_layout":"%Y %Q"}"#).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_full_document() {
        let config = LoggerConfig::from_json(
            r#"{
                "level": "info",
                "time_layout": "%H:%M:%S",
                "full_path": true,
                "build_dir": "/srv/app/cmd",
                "source_roots": ["/opt/vendor"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.time_layout, "%H:%M:%S");
        assert_eq!(config.build_dir.as_deref(), Some("/srv/app/cmd"));
        assert_eq!(config.source_roots, vec!["/opt/vendor"]);
    }
}

//! Command-line tool configuration parsing.

use serde::Deserialize;
use std::path::Path;

/// Configuration loaded from a TOML file. Every field has a default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log output settings.
    pub logging: LoggingConfig,
    /// Core module export names.
    pub runtime: RuntimeConfig,
}

/// Log output settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"wit_canon=trace"`.
    pub level: String,
    pub format: LogFormat,
    /// `"stdout"`, `"stderr"` or a file path.
    pub output: String,
    pub timestamps: bool,
    pub color: bool,
    pub target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            output: "stderr".to_string(),
            timestamps: false,
            color: true,
            target: false,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Names of the core module exports used as canonical options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Memory export used for `memory`.
    pub memory_export: String,
    /// Function export used for `realloc`.
    pub realloc_export: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            memory_export: "memory".to_string(),
            realloc_export: "cabi_realloc".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        Self::from_str(&content)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(String, std::io::Error),
    /// TOML parse error.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to read config file '{}': {}", path, e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "wit_canon=trace"
format = "json"
output = "/tmp/wit-canon.log"
timestamps = true

[runtime]
memory_export = "mem"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.logging.level, "wit_canon=trace");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.output, "/tmp/wit-canon.log");
        assert!(config.logging.timestamps);
        assert_eq!(config.runtime.memory_export, "mem");
        assert_eq!(config.runtime.realloc_export, "cabi_realloc");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.logging.output, "stderr");
        assert_eq!(config.runtime.memory_export, "memory");
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(matches!(
            Config::from_str("[logging]\nformat = \"xml\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}

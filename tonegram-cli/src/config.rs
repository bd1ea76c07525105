//! CLI-specific configuration: logging defaults and on-disk document loading.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use tonegram_core::message::MessageEnvelope;
use tonegram_core::FrequencyPlan;

/// Optional TOML file controlling logging defaults, loaded via `--config`.
///
/// Everything the codec itself needs (plan, message, rates) is passed as
/// explicit CLI arguments per the external interface; this file only carries
/// operator preferences that would be tedious to repeat on every invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read CLI config file: {}", path.display()))?;
        toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse CLI config file: {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
}

fn default_log_target() -> LogTarget {
    LogTarget::Stderr
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            target: default_log_target(),
            file_path: None,
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Stdout,
    Stderr,
    File,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Logfmt,
    Pretty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_core_level(self) -> tonegram_core::logging::LogLevel {
        use tonegram_core::logging::LogLevel as Core;
        match self {
            LogLevel::Debug => Core::Debug,
            LogLevel::Info => Core::Info,
            LogLevel::Warn => Core::Warn,
            LogLevel::Error => Core::Error,
        }
    }
}

/// Read a frequency-plan document (`clock`/`header`/`content`/`footer`/`modes`
/// keys, §6) from a JSON file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<FrequencyPlan> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read frequency plan: {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse frequency plan: {}", path.display()))
}

/// Read a message envelope (`header`/`content` base64/`footer`, §6) from a
/// JSON file.
pub fn load_message_envelope<P: AsRef<Path>>(path: P) -> Result<MessageEnvelope> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read message document: {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse message document: {}", path.display()))
}

/// Write a message envelope to a JSON file, creating it if absent.
pub fn write_message_envelope<P: AsRef<Path>>(path: P, envelope: &MessageEnvelope) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(envelope)
        .wrap_err("failed to serialize decoded message envelope")?;
    std::fs::write(path, content)
        .wrap_err_with(|| format!("failed to write decoded message to: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_stderr_pretty_info() {
        let config = CliConfig::default();
        assert_eq!(config.logging.target, LogTarget::Stderr);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn from_file_parses_partial_toml() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("tonegram-cli-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();
        let config = CliConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.target, LogTarget::Stderr);
    }
}

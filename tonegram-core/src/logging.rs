//! Unified logging infrastructure for the tonegram codec.
//!
//! Structured logging that can be configured and read back from both the
//! CLI and any host embedding the core library.

use std::fmt;

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to record
    pub level: LogLevel,

    /// Enable logging for the framing/synthesis subsystems.
    pub enable_framing: bool,
    /// Enable logging for the spectrogram/clock-recovery subsystems.
    pub enable_recovery: bool,
    /// Enable logging for WAV I/O.
    pub enable_io: bool,

    /// Maximum number of log entries to keep (for memory management)
    pub max_entries: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            enable_framing: true,
            enable_recovery: true,
            enable_io: true,
            max_entries: 1000,
        }
    }
}

impl LogConfig {
    /// Verbose logging for debugging
    pub fn verbose() -> Self {
        Self {
            level: LogLevel::Debug,
            enable_framing: true,
            enable_recovery: true,
            enable_io: true,
            max_entries: 5000,
        }
    }

    /// Quiet logging for production
    pub fn quiet() -> Self {
        Self {
            level: LogLevel::Warn,
            enable_framing: false,
            enable_recovery: false,
            enable_io: false,
            max_entries: 100,
        }
    }

    /// Disable all logging
    pub fn disabled() -> Self {
        Self {
            level: LogLevel::Error,
            enable_framing: false,
            enable_recovery: false,
            enable_io: false,
            max_entries: 0,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub subsystem: &'static str,
    pub message: String,
}

/// Logger that collects structured log entries
#[derive(Debug, Clone)]
pub struct SignalLogger {
    config: LogConfig,
    entries: Vec<LogEntry>,
}

impl SignalLogger {
    pub fn new(config: LogConfig) -> Self {
        let capacity = config.max_entries.min(1000);
        Self {
            config,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Log a message at the specified level
    pub fn log(&mut self, level: LogLevel, subsystem: &'static str, message: impl fmt::Display) {
        if level < self.config.level {
            return;
        }

        let enabled = match subsystem {
            "FRAMING" | "SYNTH" | "OVERLAY" => self.config.enable_framing,
            "SPECTROGRAM" | "CLOCK" | "SAMPLER" => self.config.enable_recovery,
            "WAV" => self.config.enable_io,
            _ => true,
        };

        if !enabled {
            return;
        }

        let entry = LogEntry {
            level,
            subsystem,
            message: message.to_string(),
        };

        if self.config.max_entries > 0 {
            if self.entries.len() >= self.config.max_entries {
                self.entries.remove(0);
            }
            self.entries.push(entry);
        }

        #[cfg(any(test, debug_assertions))]
        {
            eprintln!("[{}] {}: {}", level, subsystem, message);
        }
    }

    pub fn trace(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Trace, subsystem, message);
    }

    pub fn debug(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Debug, subsystem, message);
    }

    pub fn info(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Info, subsystem, message);
    }

    pub fn warn(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Warn, subsystem, message);
    }

    pub fn error(&mut self, subsystem: &'static str, message: impl fmt::Display) {
        self.log(LogLevel::Error, subsystem, message);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn entries_for_subsystem(&self, subsystem: &str) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.subsystem == subsystem)
            .collect()
    }

    pub fn entries_at_level(&self, level: LogLevel) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| e.level >= level).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SignalLogger {
    fn default() -> Self {
        Self::new(LogConfig::default())
    }
}

impl fmt::Display for SignalLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "[{}] {}: {}", entry.level, entry.subsystem, entry.message)?;
        }
        Ok(())
    }
}

//! Structured logging for the encode/decode CLI commands.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{LogFormat, LogLevel, LogTarget, LoggingConfig};

/// Structured log event types emitted by the CLI binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    /// Summary of a completed encode invocation.
    EncodeSummary(EncodeSummary),
    /// Summary of a completed decode invocation.
    DecodeSummary(DecodeSummary),
    /// General info message.
    Info { message: String },
    /// Warning message.
    Warn { message: String },
    /// Error message.
    Error {
        message: String,
        details: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeSummary {
    pub timestamp: DateTime<Utc>,
    pub header_bytes: usize,
    pub content_bytes: usize,
    pub footer_bytes: usize,
    pub sample_count: usize,
    pub duration_secs: f64,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeSummary {
    pub timestamp: DateTime<Utc>,
    pub sample_count: usize,
    pub content_bytes: usize,
    pub footer_chars: usize,
    pub warnings: Vec<String>,
    pub duration_secs: f64,
}

impl LogEvent {
    fn level(&self) -> LogLevel {
        match self {
            LogEvent::Error { .. } => LogLevel::Error,
            LogEvent::Warn { .. } => LogLevel::Warn,
            _ => LogLevel::Info,
        }
    }
}

/// Writes [`LogEvent`]s to stdout/stderr/file in JSON, logfmt, or a
/// human-readable pretty format, filtering by the configured minimum level.
pub struct StructuredLogger {
    config: LoggingConfig,
    writer: Box<dyn Write + Send>,
    start: Instant,
}

impl StructuredLogger {
    pub fn new(config: LoggingConfig) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match config.target {
            LogTarget::Stdout => Box::new(io::stdout()),
            LogTarget::Stderr => Box::new(io::stderr()),
            LogTarget::File => {
                let path = config
                    .file_path
                    .clone()
                    .ok_or_else(|| color_eyre::eyre::eyre!("logging.target is \"file\" but no logging.file_path was given"))?;
                let file = File::create(&path)
                    .wrap_err_with(|| format!("failed to create log file: {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
        };

        Ok(Self {
            config,
            writer,
            start: Instant::now(),
        })
    }

    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn log(&mut self, event: LogEvent) -> Result<()> {
        if event.level() < self.config.level {
            return Ok(());
        }

        let line = match self.config.format {
            LogFormat::Json => serde_json::to_string(&event).wrap_err("failed to serialize log event")?,
            LogFormat::Logfmt => format_logfmt(&event),
            LogFormat::Pretty => format_pretty(&event),
        };

        writeln!(self.writer, "{line}").wrap_err("failed to write log event")?;
        self.writer.flush().ok();
        Ok(())
    }
}

fn format_pretty(event: &LogEvent) -> String {
    match event {
        LogEvent::Info { message } => format!("[INFO] {message}"),
        LogEvent::Warn { message } => format!("[WARN] {message}"),
        LogEvent::Error { message, details } => match details {
            Some(d) => format!("[ERROR] {message}: {d}"),
            None => format!("[ERROR] {message}"),
        },
        LogEvent::EncodeSummary(s) => format!(
            "[INFO] encoded header={}B content={}B footer={}B -> {} samples in {:.3}s -> {}",
            s.header_bytes, s.content_bytes, s.footer_bytes, s.sample_count, s.duration_secs, s.output_path
        ),
        LogEvent::DecodeSummary(s) => format!(
            "[INFO] decoded {} samples -> content={}B footer={} chars, {} warning(s) in {:.3}s",
            s.sample_count, s.content_bytes, s.footer_chars, s.warnings.len(), s.duration_secs
        ),
    }
}

fn format_logfmt(event: &LogEvent) -> String {
    match event {
        LogEvent::Info { message } => format!("level=info msg={message:?}"),
        LogEvent::Warn { message } => format!("level=warn msg={message:?}"),
        LogEvent::Error { message, details } => {
            format!("level=error msg={message:?} details={:?}", details.as_deref().unwrap_or(""))
        }
        LogEvent::EncodeSummary(s) => format!(
            "level=info event=encode_summary header_bytes={} content_bytes={} footer_bytes={} sample_count={} duration_secs={:.3} output={:?}",
            s.header_bytes, s.content_bytes, s.footer_bytes, s.sample_count, s.duration_secs, s.output_path
        ),
        LogEvent::DecodeSummary(s) => format!(
            "level=info event=decode_summary sample_count={} content_bytes={} footer_chars={} warnings={} duration_secs={:.3}",
            s.sample_count, s.content_bytes, s.footer_chars, s.warnings.len(), s.duration_secs
        ),
    }
}

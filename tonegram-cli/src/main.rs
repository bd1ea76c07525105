mod config;
mod logging;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};

use tonegram_core::config::{DecoderOptions, EncoderOptions};
use tonegram_core::message::{Message, MessageEnvelope};
use tonegram_core::{decode, encode};

use config::CliConfig;
use logging::{DecodeSummary, EncodeSummary, LogEvent, StructuredLogger};

#[derive(Parser, Debug)]
#[command(author, version, about = "MFSK audio transmission encoder/decoder", long_about = None)]
struct Cli {
    /// Optional TOML file with logging preferences
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a message document into a WAV waveform
    Encode {
        /// Path to the message document: {"header": {...}, "content": "<base64>", "footer": "..."}
        message: PathBuf,
        /// Path to the frequency plan document
        plan: PathBuf,
        /// Output WAV path
        output: PathBuf,
        /// Clock cycles per second; the observable transition rate is 2x this value
        #[arg(long, default_value_t = 5.0)]
        clock_speed: f64,
        /// Output sample rate in Hz
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
    },
    /// Decode a WAV waveform back into a message document
    Decode {
        /// Path to the WAV file to decode
        wav: PathBuf,
        /// Path to the frequency plan document
        plan: PathBuf,
        /// Expected clock transition rate in Hz, nominally 2x the encoder's clock_speed
        #[arg(long, default_value_t = 10.0)]
        data_rate: f64,
        /// Optional output path for the decoded message document; printed to stdout if omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cli_config = match &cli.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };
    let mut logger = StructuredLogger::new(cli_config.logging.clone())?;

    match cli.command {
        Command::Encode {
            message,
            plan,
            output,
            clock_speed,
            sample_rate,
        } => run_encode(&mut logger, &message, &plan, &output, clock_speed, sample_rate),
        Command::Decode {
            wav,
            plan,
            data_rate,
            output,
        } => run_decode(&mut logger, &wav, &plan, data_rate, output.as_deref()),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}

fn run_encode(
    logger: &mut StructuredLogger,
    message_path: &std::path::Path,
    plan_path: &std::path::Path,
    output_path: &std::path::Path,
    clock_speed: f64,
    sample_rate: u32,
) -> Result<()> {
    logger.log(LogEvent::Info {
        message: format!("encoding {} against plan {}", message_path.display(), plan_path.display()),
    })?;

    let plan = config::load_plan(plan_path)?;
    let envelope = config::load_message_envelope(message_path)?;
    let message: Message = envelope.into();

    let options = EncoderOptions {
        sample_rate,
        clock_speed,
        ..EncoderOptions::default()
    };

    let bar = spinner("rendering MFSK waveform");
    let start = Instant::now();
    let waveform = encode(&message, &plan, &options)?;
    tonegram_core::wav::write_wav(output_path, &waveform.samples, waveform.sample_rate)?;
    let duration_secs = start.elapsed().as_secs_f64();
    bar.finish_and_clear();

    logger.log(LogEvent::EncodeSummary(EncodeSummary {
        timestamp: chrono::Utc::now(),
        header_bytes: message.header.to_canonical_string().len(),
        content_bytes: message.content.len(),
        footer_bytes: message.footer.len(),
        sample_count: waveform.samples.len(),
        duration_secs,
        output_path: output_path.display().to_string(),
    }))?;

    Ok(())
}

fn run_decode(
    logger: &mut StructuredLogger,
    wav_path: &std::path::Path,
    plan_path: &std::path::Path,
    data_rate: f64,
    output_path: Option<&std::path::Path>,
) -> Result<()> {
    logger.log(LogEvent::Info {
        message: format!("decoding {} against plan {}", wav_path.display(), plan_path.display()),
    })?;

    let plan = config::load_plan(plan_path)?;
    let (samples, sample_rate) = tonegram_core::wav::read_wav(wav_path)?;

    let options = DecoderOptions {
        data_rate,
        ..DecoderOptions::default()
    };

    let bar = spinner("recovering clock and symbols");
    let start = Instant::now();
    let outcome = decode(&samples, sample_rate, &plan, &options);
    let duration_secs = start.elapsed().as_secs_f64();
    bar.finish_and_clear();

    for warning in &outcome.warnings {
        logger.log(LogEvent::Warn {
            message: warning.to_string(),
        })?;
    }

    let envelope: MessageEnvelope = outcome.message.clone().into();

    match output_path {
        Some(path) => config::write_message_envelope(path, &envelope)?,
        None => println!("{}", serde_json::to_string_pretty(&envelope)?),
    }

    logger.log(LogEvent::DecodeSummary(DecodeSummary {
        timestamp: chrono::Utc::now(),
        sample_count: samples.len(),
        content_bytes: outcome.message.content.len(),
        footer_chars: outcome.message.footer.chars().count(),
        warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        duration_secs,
    }))?;

    Ok(())
}

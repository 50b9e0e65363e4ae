use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

use crate::codec::{CodecConfig, Endianness};
use crate::cli::decode::DecodeArgs;
use crate::cli::encode::EncodeArgs;

/// Command-line options for the avionics frame tool.
#[derive(Debug, Parser)]
#[command(
    name = "avlink",
    about = "Decode and build avionics telemetry and command frames."
)]
pub struct Args {
    /// Log verbosity; falls back to `RUST_LOG`, then `warn`.
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,
    /// Output format; defaults to `pretty` on a terminal and `json` otherwise.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Args {
    /// Creates argument values directly without CLI parsing.
    ///
    /// ```
    /// use avlink::{Args, Command};
    ///
    /// let args = Args::new(Command::Fields);
    /// assert_eq!(None, args.output_format());
    /// ```
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            log_level: None,
            format: None,
            command,
        }
    }

    /// Sets an explicit log level.
    #[must_use]
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = Some(log_level);
        self
    }

    /// Sets an explicit output format.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Log level requested on the command line, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Output format requested on the command line, if any.
    #[must_use]
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.format
    }

    /// Consumes the arguments and returns the selected command.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Supported CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode one frame given as hex text and report every finding.
    Decode(DecodeArgs),
    /// Build one telemetry frame from field values and print it as hex.
    Encode(EncodeArgs),
    /// List the telemetry field registry.
    Fields,
    /// List the command registry.
    Commands,
}

/// Log verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub(crate) fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::OFF,
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

/// Rendering used for command output.
#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

/// Byte-order options shared by `decode` and `encode`.
#[derive(Debug, Clone, clap::Args)]
pub struct ByteOrderArgs {
    /// Byte order of multi-byte TLV values.
    #[arg(long, value_enum, default_value_t = Endianness::LittleEndian)]
    value_endian: Endianness,
    /// Byte order of the sequence number.
    #[arg(long, value_enum, default_value_t = Endianness::BigEndian)]
    sequence_endian: Endianness,
}

impl ByteOrderArgs {
    /// Creates byte-order options from explicit values.
    #[must_use]
    pub fn new(value_endian: Endianness, sequence_endian: Endianness) -> Self {
        Self {
            value_endian,
            sequence_endian,
        }
    }

    pub(crate) fn config(&self) -> CodecConfig {
        CodecConfig::new(self.value_endian, self.sequence_endian)
    }
}

impl Default for ByteOrderArgs {
    fn default() -> Self {
        let config = CodecConfig::default();
        Self::new(config.value_endian(), config.sequence_endian())
    }
}

use std::io;

use anyhow::Result;
use tracing::instrument;

use crate::cli::{Command, LogLevel, OutputFormat};
use crate::telemetry;
use crate::terminal::{SystemTerminalClient, TerminalClient};

/// Runs the CLI command against the real terminal.
///
/// ```
/// use clap::Parser;
///
/// let args = avlink::Args::try_parse_from(["avlink", "commands"])?;
/// let mut out = Vec::new();
/// avlink::run(args.into_command(), &mut out, avlink::OutputFormat::Json)?;
/// assert!(String::from_utf8(out)?.contains("LAUNCH"));
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, input cannot be parsed,
/// a decoded frame carries errors, or output writing fails.
pub fn run<W>(command: Command, out: &mut W, output_format: OutputFormat) -> Result<()>
where
    W: io::Write,
{
    run_with_log_level(command, out, None, output_format)
}

/// Runs the CLI command with an explicit telemetry log-level override.
///
/// ```
/// use clap::Parser;
///
/// let args = avlink::Args::try_parse_from(["avlink", "--log-level", "debug", "fields"])?;
/// let log_level = args.log_level();
/// let mut out = Vec::new();
/// avlink::run_with_log_level(
///     args.into_command(),
///     &mut out,
///     log_level,
///     avlink::OutputFormat::Json,
/// )?;
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, input cannot be parsed,
/// a decoded frame carries errors, or output writing fails.
pub fn run_with_log_level<W>(
    command: Command,
    out: &mut W,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients_and_log_level(
        command,
        out,
        &SystemTerminalClient,
        log_level,
        output_format,
    )
}

/// Runs the CLI command with an injected terminal client.
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, input cannot be parsed,
/// a decoded frame carries errors, or output writing fails.
pub fn run_with_clients<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    run_with_clients_and_log_level(command, out, terminal_client, None, output_format)
}

/// Runs the CLI command with an injected terminal client and explicit
/// telemetry settings.
///
/// ```
/// use clap::Parser;
///
/// struct FakeTerminal;
/// impl avlink::TerminalClient for FakeTerminal {
///     fn stdout_is_terminal(&self) -> bool { false }
///     fn stderr_is_terminal(&self) -> bool { false }
/// }
///
/// let args = avlink::Args::try_parse_from([
///     "avlink",
///     "decode",
///     "FD 06 C0 00 01 70 50 3C FE",
/// ])?;
/// let mut out = Vec::new();
/// avlink::run_with_clients_and_log_level(
///     args.into_command(),
///     &mut out,
///     &FakeTerminal,
///     None,
///     avlink::OutputFormat::Pretty,
/// )?;
/// assert!(String::from_utf8(out)?.contains("LAUNCH"));
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if tracing initialisation fails, input cannot be parsed,
/// a decoded frame carries errors, or output writing fails.
#[instrument(
    skip(out, terminal_client),
    level = "info",
    fields(command = %command_name(&command), ?log_level)
)]
pub fn run_with_clients_and_log_level<W>(
    command: Command,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    log_level: Option<LogLevel>,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    telemetry::initialise_tracing(
        terminal_client.stderr_is_terminal(),
        log_level.map(LogLevel::as_level_filter),
    )?;

    match command {
        Command::Decode(args) => {
            crate::cli::decode::run(&args, out, terminal_client, output_format)
        }
        Command::Encode(args) => {
            crate::cli::encode::run(&args, out, terminal_client, output_format)
        }
        Command::Fields => crate::cli::registry::run_fields(out, terminal_client, output_format),
        Command::Commands => {
            crate::cli::registry::run_commands(out, terminal_client, output_format)
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Decode(_args) => "decode",
        Command::Encode(_args) => "encode",
        Command::Fields => "fields",
        Command::Commands => "commands",
    }
}

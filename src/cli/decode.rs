use std::io;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::cli::OutputFormat;
use crate::cli::command::ByteOrderArgs;
use crate::codec::{self, CodecConfig};
use crate::error::CliError;
use crate::protocol::{FLAGS_MASK, HEADER_OFFSET};
use crate::terminal::TerminalClient;
use crate::utils::parse_hex_bytes;

use super::ui::{DecodedFrameView, Painter};

/// Arguments for the `decode` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DecodeArgs {
    /// Frame bytes as hex text; whitespace, commas and `0x` prefixes are ignored.
    #[arg(value_name = "HEX")]
    hex: String,
    #[command(flatten)]
    byte_order: ByteOrderArgs,
    /// Use the byte orders advertised by the header flags instead of the
    /// configured ones.
    #[arg(long, conflicts_with_all = ["value_endian", "sequence_endian"])]
    from_flags: bool,
}

impl DecodeArgs {
    /// Creates decode arguments with the default byte orders.
    ///
    /// ```
    /// use avlink::DecodeArgs;
    ///
    /// let args = DecodeArgs::new("FD 06 C0 00 01 70 50 3C FE");
    /// let _ = args;
    /// ```
    #[must_use]
    pub fn new(hex: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            byte_order: ByteOrderArgs::default(),
            from_flags: false,
        }
    }

    /// Overrides the configured byte orders.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrderArgs) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Takes byte orders from the frame's own header flags.
    #[must_use]
    pub fn with_from_flags(mut self, from_flags: bool) -> Self {
        self.from_flags = from_flags;
        self
    }

    fn config_for(&self, bytes: &[u8]) -> CodecConfig {
        if !self.from_flags {
            return self.byte_order.config();
        }
        match bytes.get(HEADER_OFFSET) {
            Some(header) => CodecConfig::from_header_flags(header & FLAGS_MASK),
            None => {
                debug!("no header byte to read flags from; using defaults");
                CodecConfig::default()
            }
        }
    }
}

/// Executes the `decode` command.
///
/// The decoded frame is always written; a frame carrying errors then fails
/// the command.
#[instrument(skip(args, out, terminal_client), level = "info", fields(?output_format))]
pub(crate) fn run<W>(
    args: &DecodeArgs,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let bytes = parse_hex_bytes(&args.hex).context("failed to read frame hex")?;
    let config = args.config_for(&bytes);
    let frame = codec::decode(&bytes, config);

    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            writeln!(out, "{}", DecodedFrameView::new(&frame, &painter))?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &frame)?;
            writeln!(out)?;
        }
    }

    if frame.is_ok() {
        Ok(())
    } else {
        Err(CliError::FrameRejected {
            errors: frame.errors().len(),
        }
        .into())
    }
}

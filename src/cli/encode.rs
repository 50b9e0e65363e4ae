use std::io;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_with::{hex::Hex, serde_as};
use tracing::instrument;

use crate::cli::OutputFormat;
use crate::cli::command::ByteOrderArgs;
use crate::codec::{self, BuildError, FieldInput, FrameRequest};
use crate::error::InputError;
use crate::protocol::{self, END_OF_FRAME, LEGACY_END_OF_FRAME};
use crate::terminal::TerminalClient;
use crate::utils::parse_byte;

use super::ui::{EncodedFrameView, Painter};

/// End marker written after the CRC.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum EndMarker {
    /// `0xFE`.
    #[default]
    #[value(name = "fe")]
    Standard,
    /// `0xF1`, for receivers still on the legacy marker.
    #[value(name = "f1")]
    Legacy,
}

impl EndMarker {
    fn byte(self) -> u8 {
        match self {
            Self::Standard => END_OF_FRAME,
            Self::Legacy => LEGACY_END_OF_FRAME,
        }
    }
}

/// One `--field ID_OR_KEY=VALUE` argument.
///
/// The left side is a registry key such as `altitude_m` or an ArgID such as
/// `0x05`; the right side is passed to the field's input policy unchanged.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FieldArg {
    id: u8,
    value: String,
}

impl FieldArg {
    fn to_input(&self) -> FieldInput {
        FieldInput::new(self.id, self.value.as_str())
    }
}

impl FromStr for FieldArg {
    type Err = InputError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let Some((key, value)) = text.split_once('=') else {
            return Err(InputError::MalformedFieldArgument {
                value: text.to_string(),
            });
        };
        let key = key.trim();
        let id = match protocol::field_definition_by_key(key) {
            Some(definition) => definition.id(),
            None => parse_byte(key).map_err(|_error| InputError::UnknownFieldKey {
                key: key.to_string(),
            })?,
        };
        Ok(Self {
            id,
            value: value.trim().to_string(),
        })
    }
}

/// Arguments for the `encode` command.
#[derive(Debug, Clone, clap::Args)]
pub struct EncodeArgs {
    /// Sequence number.
    #[arg(long = "seq")]
    sequence: u16,
    /// User flag bits (`0x00`..`0x3F`); byte-order indicator bits are set
    /// from the byte-order options.
    #[arg(long, default_value = "0", value_parser = parse_flags)]
    flags: u8,
    /// End marker to write.
    #[arg(long, value_enum, default_value_t = EndMarker::Standard)]
    end_marker: EndMarker,
    #[command(flatten)]
    byte_order: ByteOrderArgs,
    /// Field value as `KEY=VALUE` or `ARGID=VALUE`; repeat for more fields.
    #[arg(long = "field", value_name = "ID_OR_KEY=VALUE")]
    fields: Vec<FieldArg>,
}

impl EncodeArgs {
    /// Creates encode arguments for an empty telemetry frame.
    ///
    /// ```
    /// use avlink::EncodeArgs;
    ///
    /// let args = EncodeArgs::new(1).with_field("millis=123456")?;
    /// let _ = args;
    /// # Ok::<(), avlink::InputError>(())
    /// ```
    #[must_use]
    pub fn new(sequence: u16) -> Self {
        Self {
            sequence,
            flags: 0,
            end_marker: EndMarker::Standard,
            byte_order: ByteOrderArgs::default(),
            fields: Vec::new(),
        }
    }

    /// Appends one `ID_OR_KEY=VALUE` field argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument is malformed or names no field.
    pub fn with_field(mut self, field: &str) -> Result<Self, InputError> {
        self.fields.push(field.parse()?);
        Ok(self)
    }

    /// Sets the user flag bits.
    #[must_use]
    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the end marker.
    #[must_use]
    pub fn with_end_marker(mut self, end_marker: EndMarker) -> Self {
        self.end_marker = end_marker;
        self
    }

    /// Overrides the byte orders.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrderArgs) -> Self {
        self.byte_order = byte_order;
        self
    }

    fn build_frame(&self) -> Result<Vec<u8>, BuildError> {
        let request = FrameRequest::builder()
            .sequence(self.sequence)
            .flags(self.flags)
            .end_marker(self.end_marker.byte())
            .config(self.byte_order.config())
            .fields(self.fields.iter().map(FieldArg::to_input).collect())
            .build();
        codec::encode(&request)
    }
}

/// JSON shape of an encoded frame.
#[serde_as]
#[derive(Debug, Serialize)]
struct EncodedFrameReport<'a> {
    #[serde_as(as = "Hex<serde_with::formats::Uppercase>")]
    frame: &'a [u8],
    length: usize,
}

/// Executes the `encode` command.
#[instrument(skip(args, out, terminal_client), level = "info", fields(?output_format))]
pub(crate) fn run<W>(
    args: &EncodeArgs,
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let frame = args.build_frame().context("failed to encode frame")?;

    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            writeln!(out, "{}", EncodedFrameView::new(&frame, &painter))?;
        }
        OutputFormat::Json => {
            let report = EncodedFrameReport {
                frame: &frame,
                length: frame.len(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn parse_flags(value: &str) -> Result<u8, InputError> {
    parse_byte(value)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::codec::Endianness;

    #[rstest]
    #[case::key("altitude_m=12.5", 0x05, "12.5")]
    #[case::hex_id("0x05=12.5", 0x05, "12.5")]
    #[case::decimal_id("5 = 12.5", 0x05, "12.5")]
    #[case::unregistered_id("0x7E=1", 0x7E, "1")]
    fn field_arg_resolves_key_or_id(#[case] input: &str, #[case] id: u8, #[case] value: &str) {
        let parsed: FieldArg = input.parse().expect("valid field argument");
        assert_eq!(
            FieldArg {
                id,
                value: value.to_string()
            },
            parsed
        );
    }

    #[test]
    fn field_arg_requires_equals_sign() {
        assert_matches!(
            "altitude_m".parse::<FieldArg>(),
            Err(InputError::MalformedFieldArgument { .. })
        );
    }

    #[test]
    fn field_arg_rejects_unknown_key() {
        assert_matches!(
            "altitude=1".parse::<FieldArg>(),
            Err(InputError::UnknownFieldKey { key }) if key == "altitude"
        );
    }

    #[test]
    fn build_frame_matches_reference_millis_frame() {
        let args = EncodeArgs::new(1)
            .with_field("millis=123456")
            .expect("valid field");
        assert_eq!(
            vec![
                0xFD, 0x0A, 0x00, 0x00, 0x01, 0x01, 0x40, 0xE2, 0x01, 0x00, 0x7C, 0xC8, 0xFE
            ],
            args.build_frame().expect("valid frame")
        );
    }

    #[test]
    fn build_frame_sets_indicator_bits_from_byte_order() {
        let args = EncodeArgs::new(1)
            .with_flags(0x20)
            .with_byte_order(ByteOrderArgs::new(
                Endianness::BigEndian,
                Endianness::LittleEndian,
            ));
        let frame = args.build_frame().expect("valid frame");
        assert_eq!(0x23, frame[2]);
        assert_eq!([0x01, 0x00], [frame[3], frame[4]]);
    }

    #[test]
    fn build_frame_writes_legacy_end_marker() {
        let args = EncodeArgs::new(7).with_end_marker(EndMarker::Legacy);
        let frame = args.build_frame().expect("valid frame");
        assert_eq!(Some(&LEGACY_END_OF_FRAME), frame.last());
    }

    #[test]
    fn build_frame_reports_every_invalid_field() {
        let args = EncodeArgs::new(1)
            .with_field("battery_pct=101")
            .and_then(|args| args.with_field("altitude_m=abc"))
            .expect("valid field arguments");

        let error = args.build_frame().expect_err("invalid fields should fail");
        assert_matches!(
            error,
            BuildError::InvalidFields(errors) if errors.errors().len() == 2
        );
    }

    #[test]
    fn build_frame_rejects_flags_above_six_bits() {
        let error = EncodeArgs::new(1)
            .with_flags(0x40)
            .build_frame()
            .expect_err("flags out of range");
        assert_matches!(
            error,
            BuildError::FlagsOutOfRange { flags: 0x40 }
        );
    }
}

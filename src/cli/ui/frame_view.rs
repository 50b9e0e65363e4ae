use std::fmt::{self, Display, Formatter};

use crate::codec::{DecodedCommand, DecodedField, DecodedFrame, Envelope, FrameBody};
use crate::utils::{format_byte, format_hex};

use super::painter::Painter;
use super::table::Table;

/// Renders a decoded frame as a verdict, envelope table, body and findings.
pub(crate) struct DecodedFrameView<'a> {
    frame: &'a DecodedFrame,
    painter: &'a Painter,
}

impl<'a> DecodedFrameView<'a> {
    pub(crate) fn new(frame: &'a DecodedFrame, painter: &'a Painter) -> Self {
        Self { frame, painter }
    }

    fn envelope_table(&self, envelope: &Envelope) -> Table {
        let crc = if envelope.crc_received() == envelope.crc_computed() {
            format!("0x{:04X}", envelope.crc_received())
        } else {
            format!(
                "0x{:04X} (computed 0x{:04X})",
                envelope.crc_received(),
                envelope.crc_computed()
            )
        };
        let config = envelope.config();

        Table::key_value(
            self.painter,
            vec![
                ("start marker", format_byte(envelope.start_marker())),
                ("length", envelope.total_length().to_string()),
                (
                    "header",
                    format!(
                        "{} ({})",
                        format_byte(envelope.header()),
                        envelope.header_type()
                    ),
                ),
                ("flags", format!("0b{:06b}", envelope.flags())),
                ("sequence", envelope.sequence().to_string()),
                (
                    "byte order",
                    format!(
                        "values {}, sequence {}",
                        config.value_endian(),
                        config.sequence_endian()
                    ),
                ),
                ("payload", format_hex(envelope.payload())),
                ("crc", crc),
                ("end marker", format_byte(envelope.end_marker())),
            ],
        )
    }

    fn fields_table(fields: &[DecodedField]) -> Table {
        let rows = fields
            .iter()
            .map(|field| {
                vec![
                    format_byte(field.id()),
                    field.name().to_string(),
                    field.kind().to_string(),
                    format_hex(field.raw_bytes()),
                    field.value().to_string(),
                    field.engineering_value().to_string(),
                ]
            })
            .collect();
        Table::grid(["id", "field", "kind", "raw", "value", "engineering"], rows)
    }

    fn command_table(&self, command: &DecodedCommand) -> Table {
        let name = if command.is_known() {
            self.painter.value(command.name())
        } else {
            self.painter.warning(command.name())
        };
        Table::key_value(
            self.painter,
            vec![("command id", format_byte(command.id())), ("name", name)],
        )
    }
}

impl Display for DecodedFrameView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let frame = self.frame;
        writeln!(
            f,
            "{} {}",
            self.painter.heading("Frame"),
            self.painter.verdict(frame.is_ok())
        )?;
        writeln!(f, "{}", self.painter.muted(format_hex(frame.raw())))?;

        if let Some(envelope) = frame.envelope() {
            writeln!(f)?;
            writeln!(
                f,
                "{}",
                self.envelope_table(envelope)
                    .titled(self.painter.heading("Envelope"))
            )?;
        }

        match frame.body() {
            FrameBody::Telemetry(fields) if !fields.is_empty() => {
                writeln!(f)?;
                writeln!(
                    f,
                    "{}",
                    Self::fields_table(fields).titled(self.painter.heading("Telemetry"))
                )?;
            }
            FrameBody::Command(Some(command)) => {
                writeln!(f)?;
                writeln!(
                    f,
                    "{}",
                    self.command_table(command)
                        .titled(self.painter.heading("Command"))
                )?;
            }
            FrameBody::Telemetry(_) | FrameBody::Command(None) | FrameBody::Undecoded => {}
        }

        if !frame.errors().is_empty() || !frame.warnings().is_empty() {
            writeln!(f)?;
        }
        for error in frame.errors() {
            writeln!(f, "{} {error}", self.painter.error("error:"))?;
        }
        for warning in frame.warnings() {
            writeln!(f, "{} {warning}", self.painter.warning("warning:"))?;
        }

        Ok(())
    }
}

/// Renders a freshly built frame as hex with a short summary.
pub(crate) struct EncodedFrameView<'a> {
    frame: &'a [u8],
    painter: &'a Painter,
}

impl<'a> EncodedFrameView<'a> {
    pub(crate) fn new(frame: &'a [u8], painter: &'a Painter) -> Self {
        Self { frame, painter }
    }
}

impl Display for EncodedFrameView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            self.painter.heading("Frame"),
            self.painter.muted(format!("({} bytes)", self.frame.len()))
        )?;
        write!(f, "{}", self.painter.value(format_hex(self.frame)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codec::{self, CodecConfig};

    const MILLIS_FRAME: [u8; 13] = [
        0xFD, 0x0A, 0x00, 0x00, 0x01, 0x01, 0x40, 0xE2, 0x01, 0x00, 0x7C, 0xC8, 0xFE,
    ];

    fn render(bytes: &[u8]) -> String {
        let frame = codec::decode(bytes, CodecConfig::default());
        let painter = Painter::new(false);
        DecodedFrameView::new(&frame, &painter).to_string()
    }

    #[test]
    fn valid_telemetry_frame_lists_fields() {
        let rendered = render(&MILLIS_FRAME);

        assert!(rendered.starts_with("Frame OK\n"));
        assert!(rendered.contains("millis"));
        assert!(rendered.contains("123456"));
        assert!(!rendered.contains("error:"));
    }

    #[test]
    fn command_frame_shows_command_name() {
        let rendered = render(&[0xFD, 0x06, 0xC0, 0x00, 0x01, 0x70, 0x50, 0x3C, 0xFE]);

        assert!(rendered.starts_with("Frame OK\n"));
        assert!(!rendered.contains("warning:"));
        assert!(rendered.contains("Command"));
        assert!(rendered.contains("LAUNCH"));
    }

    #[test]
    fn crc_mismatch_shows_both_values_and_error() {
        let mut bytes = MILLIS_FRAME;
        bytes[11] ^= 0xFF;
        let rendered = render(&bytes);

        assert!(rendered.starts_with("Frame REJECTED\n"));
        assert!(rendered.contains("0x7C37 (computed 0x7CC8)"));
        assert!(rendered.contains("error: CRC mismatch"));
    }

    #[test]
    fn short_buffer_renders_without_envelope() {
        let rendered = render(&[0xFD, 0x05]);
        assert!(rendered.contains("error: frame too short"));
        assert!(!rendered.contains("start marker"));
    }

    #[test]
    fn encoded_view_prints_length_and_hex() {
        let painter = Painter::new(false);
        let rendered = EncodedFrameView::new(&MILLIS_FRAME, &painter).to_string();
        assert_eq!(
            "Frame (13 bytes)\nFD 0A 00 00 01 01 40 E2 01 00 7C C8 FE",
            rendered
        );
    }
}

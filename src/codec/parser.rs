use serde::Serialize;
use serde_with::{DisplayFromStr, hex::Hex, serde_as};
use tracing::{debug, instrument};

use crate::protocol::{
    CRC_LEN, END_OF_FRAME, FLAGS_MASK, HEADER_OFFSET, HeaderType, LEGACY_END_OF_FRAME,
    LENGTH_OVERHEAD, MIN_FRAME_LEN, PAYLOAD_OFFSET, PREAMBLE_LEN, SEQUENCE_OFFSET,
    START_OF_FRAME,
};

use super::command::{CommandDecoder, DecodedCommand};
use super::config::CodecConfig;
use super::crc::crc16;
use super::issue::FrameIssue;
use super::primitive::read_u16;
use super::tlv::{DecodedField, TlvDecoder};

/// Envelope fields read from a frame, zero-filled where the buffer ran out.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    start_marker: u8,
    total_length: u8,
    header: u8,
    header_type: HeaderType,
    flags: u8,
    config: CodecConfig,
    sequence: u16,
    #[serde_as(as = "Hex")]
    payload: Vec<u8>,
    crc_received: u16,
    crc_computed: u16,
    end_marker: u8,
}

impl Envelope {
    /// Byte found at the start-marker position.
    #[must_use]
    pub fn start_marker(&self) -> u8 {
        self.start_marker
    }

    /// Length field: bytes from header through CRC inclusive.
    #[must_use]
    pub fn total_length(&self) -> u8 {
        self.total_length
    }

    /// Raw header byte.
    #[must_use]
    pub fn header(&self) -> u8 {
        self.header
    }

    /// Frame class from the header type bits.
    #[must_use]
    pub fn header_type(&self) -> HeaderType {
        self.header_type
    }

    /// Low six header bits.
    #[must_use]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Byte orders used to interpret this frame.
    #[must_use]
    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Byte orders the header flags advertise.
    ///
    /// Decoding always uses [`Envelope::config`]; this is reported so callers
    /// can compare the two.
    #[must_use]
    pub fn advertised_config(&self) -> CodecConfig {
        CodecConfig::from_header_flags(self.flags)
    }

    /// Sequence number.
    #[must_use]
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Payload window between the sequence and the CRC.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// CRC carried by the frame.
    #[must_use]
    pub fn crc_received(&self) -> u16 {
        self.crc_received
    }

    /// CRC computed over header, sequence and payload.
    #[must_use]
    pub fn crc_computed(&self) -> u16 {
        self.crc_computed
    }

    /// Byte found at the end-marker position.
    #[must_use]
    pub fn end_marker(&self) -> u8 {
        self.end_marker
    }
}

/// Interpreted payload of a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum FrameBody {
    /// Telemetry fields decoded before the TLV walk ended.
    Telemetry(Vec<DecodedField>),
    /// Command frame; `None` when the command byte was missing.
    Command(Option<DecodedCommand>),
    /// Payload not interpreted (undefined header type or no envelope).
    Undecoded,
}

/// Fully annotated result of decoding one byte buffer.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFrame {
    ok: bool,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    errors: Vec<FrameIssue>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    warnings: Vec<FrameIssue>,
    #[serde_as(as = "Hex")]
    raw: Vec<u8>,
    envelope: Option<Envelope>,
    body: FrameBody,
}

impl DecodedFrame {
    /// `true` when no errors were recorded; warnings do not count.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Errors in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FrameIssue] {
        &self.errors
    }

    /// Warnings in the order they were found.
    #[must_use]
    pub fn warnings(&self) -> &[FrameIssue] {
        &self.warnings
    }

    /// The input buffer.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Envelope fields, absent when the buffer was too short to parse.
    #[must_use]
    pub fn envelope(&self) -> Option<&Envelope> {
        self.envelope.as_ref()
    }

    /// Interpreted payload.
    #[must_use]
    pub fn body(&self) -> &FrameBody {
        &self.body
    }

    /// Decoded telemetry fields; empty for non-telemetry frames.
    #[must_use]
    pub fn fields(&self) -> &[DecodedField] {
        match &self.body {
            FrameBody::Telemetry(fields) => fields,
            FrameBody::Command(_) | FrameBody::Undecoded => &[],
        }
    }

    /// Decoded command, if this is a command frame with a command byte.
    #[must_use]
    pub fn command(&self) -> Option<&DecodedCommand> {
        match &self.body {
            FrameBody::Command(command) => command.as_ref(),
            FrameBody::Telemetry(_) | FrameBody::Undecoded => None,
        }
    }

    /// Looks up a decoded telemetry field by registry key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DecodedField> {
        self.fields().iter().find(|field| field.name() == name)
    }
}

/// Parses raw frames into [`DecodedFrame`] results.
pub struct FrameParser;

impl FrameParser {
    /// Decodes one frame. Never fails: every problem is recorded on the
    /// result as an error or warning.
    ///
    /// ```
    /// use avlink::{CodecConfig, FrameParser};
    ///
    /// let frame = FrameParser::decode(&[0xFD, 0x06], CodecConfig::default());
    /// assert!(!frame.is_ok());
    /// assert!(frame.envelope().is_none());
    /// ```
    #[must_use]
    #[instrument(skip(bytes), level = "debug", fields(len = bytes.len()))]
    pub fn decode(bytes: &[u8], config: CodecConfig) -> DecodedFrame {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if bytes.len() < MIN_FRAME_LEN {
            errors.push(FrameIssue::TooShort {
                minimum: MIN_FRAME_LEN,
                actual: bytes.len(),
            });
            debug!("frame too short; skipping envelope parse");
            return DecodedFrame {
                ok: false,
                errors,
                warnings,
                raw: bytes.to_vec(),
                envelope: None,
                body: FrameBody::Undecoded,
            };
        }

        let byte_at = |index: usize| bytes.get(index).copied().unwrap_or(0);

        let start_marker = byte_at(0);
        if start_marker != START_OF_FRAME {
            errors.push(FrameIssue::BadStartMarker {
                actual: start_marker,
            });
        }

        let total_length = byte_at(1);
        let declared = usize::from(total_length);
        let required = PREAMBLE_LEN + declared + 1;
        if bytes.len() < required {
            errors.push(FrameIssue::Truncated {
                required,
                actual: bytes.len(),
            });
        }
        if declared < LENGTH_OVERHEAD {
            errors.push(FrameIssue::LengthTooSmall {
                declared: total_length,
                minimum: LENGTH_OVERHEAD,
            });
        }

        let header = byte_at(HEADER_OFFSET);
        let header_type = HeaderType::from_header_byte(header);
        let flags = header & FLAGS_MASK;
        let advertised = CodecConfig::from_header_flags(flags);
        if advertised != config {
            debug!(
                ?advertised,
                configured = ?config,
                "header flags advertise different byte orders; using configured"
            );
        }

        let sequence = read_u16(
            [byte_at(SEQUENCE_OFFSET), byte_at(SEQUENCE_OFFSET + 1)],
            config.sequence_endian(),
        );

        let payload_end = (PREAMBLE_LEN + declared)
            .saturating_sub(CRC_LEN)
            .max(PAYLOAD_OFFSET);
        let covered: Vec<u8> = (HEADER_OFFSET..payload_end).map(byte_at).collect();
        let payload = covered[PAYLOAD_OFFSET - HEADER_OFFSET..].to_vec();

        let crc_received = u16::from_be_bytes([byte_at(payload_end), byte_at(payload_end + 1)]);
        let crc_computed = crc16(&covered);
        if crc_received != crc_computed {
            debug!(crc_received, crc_computed, "CRC mismatch");
            errors.push(FrameIssue::CrcMismatch {
                received: crc_received,
                computed: crc_computed,
            });
        }

        let end_marker = byte_at(PREAMBLE_LEN + declared);
        match end_marker {
            END_OF_FRAME => {}
            LEGACY_END_OF_FRAME => warnings.push(FrameIssue::LegacyEndMarker),
            actual => errors.push(FrameIssue::BadEndMarker { actual }),
        }

        let body = match header_type {
            HeaderType::Telemetry => {
                let walk = TlvDecoder::decode(&payload, config.value_endian());
                let consumed = walk.consumed();
                if let Some(&byte) = payload.get(consumed) {
                    warnings.push(FrameIssue::TlvStopped {
                        payload_offset: consumed,
                        frame_offset: PAYLOAD_OFFSET + consumed,
                        byte,
                        remaining: payload.len() - consumed,
                    });
                }
                FrameBody::Telemetry(walk.into_fields())
            }
            HeaderType::Command => {
                let decoded = CommandDecoder::decode(&payload);
                warnings.extend(decoded.warnings);
                FrameBody::Command(decoded.command)
            }
            HeaderType::Unknown => {
                warnings.push(FrameIssue::UndefinedHeaderType { bits: header >> 6 });
                FrameBody::Undecoded
            }
        };

        let ok = errors.is_empty();
        debug!(
            ok,
            errors = errors.len(),
            warnings = warnings.len(),
            %header_type,
            sequence,
            "decoded frame"
        );

        DecodedFrame {
            ok,
            errors,
            warnings,
            raw: bytes.to_vec(),
            envelope: Some(Envelope {
                start_marker,
                total_length,
                header,
                header_type,
                flags,
                config,
                sequence,
                payload,
                crc_received,
                crc_computed,
                end_marker,
            }),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::codec::DecodedValue;
    use crate::codec::primitive::Endianness;

    /// Wraps `header`, `sequence` and `payload` in a valid envelope.
    fn frame(header: u8, sequence: [u8; 2], payload: &[u8]) -> Vec<u8> {
        let mut covered = vec![header, sequence[0], sequence[1]];
        covered.extend_from_slice(payload);
        let crc = crc16(&covered);
        let mut bytes = vec![
            START_OF_FRAME,
            u8::try_from(covered.len() + CRC_LEN).expect("test payload fits in a frame"),
        ];
        bytes.extend_from_slice(&covered);
        bytes.extend_from_slice(&crc.to_be_bytes());
        bytes.push(END_OF_FRAME);
        bytes
    }

    #[test]
    fn decodes_millis_vector() {
        let bytes = frame(0x00, [0x00, 0x07], &[0x01, 0x40, 0xE2, 0x01, 0x00]);
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(decoded.is_ok(), "{:?}", decoded.errors());
        assert!(decoded.warnings().is_empty());
        let envelope = decoded.envelope().expect("envelope should parse");
        assert_eq!(HeaderType::Telemetry, envelope.header_type());
        assert_eq!(7, envelope.sequence());
        assert_eq!(10, envelope.total_length());
        let millis = decoded.field("millis").expect("millis should decode");
        assert_eq!(0x01, millis.id());
        assert_eq!(DecodedValue::U32(123_456), millis.value());
    }

    #[test]
    fn decodes_launch_command_without_warnings() {
        let bytes = frame(0xC0, [0x00, 0x01], &[0x70]);
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(decoded.is_ok(), "{:?}", decoded.errors());
        assert!(decoded.warnings().is_empty());
        let command = decoded.command().expect("command should decode");
        assert_eq!(0x70, command.id());
        assert_eq!("LAUNCH", command.name());
    }

    #[rstest]
    #[case::empty(0)]
    #[case::six_bytes(6)]
    fn too_short_returns_empty_envelope(#[case] len: usize) {
        let bytes = vec![START_OF_FRAME; len];
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(!decoded.is_ok());
        assert_eq!(None, decoded.envelope());
        assert_eq!(&FrameBody::Undecoded, decoded.body());
        assert_matches!(
            decoded.errors(),
            [FrameIssue::TooShort { minimum: 7, actual }] if *actual == len
        );
    }

    #[test]
    fn bad_start_marker_does_not_stop_parsing() {
        let mut bytes = frame(0x00, [0x00, 0x01], &[0x03, 0x32]);
        bytes[0] = 0xAA;
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert_matches!(
            decoded.errors(),
            [FrameIssue::BadStartMarker { actual: 0xAA }]
        );
        assert_eq!(1, decoded.fields().len());
    }

    #[test]
    fn truncated_frame_reports_sizes_without_panicking() {
        let mut bytes = frame(0x00, [0x00, 0x01], &[0x01, 0x40, 0xE2, 0x01, 0x00]);
        bytes[1] = 40;
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(!decoded.is_ok());
        assert_eq!(
            Some(&FrameIssue::Truncated {
                required: 43,
                actual: bytes.len(),
            }),
            decoded.errors().first()
        );
        let envelope = decoded.envelope().expect("envelope is best-effort");
        assert_eq!(35, envelope.payload().len());
    }

    #[test]
    fn length_below_overhead_is_an_error() {
        let bytes = [START_OF_FRAME, 0x02, 0x00, 0x00, 0x01, 0xFE, 0x00];
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(
            decoded
                .errors()
                .contains(&FrameIssue::LengthTooSmall {
                    declared: 2,
                    minimum: 5,
                })
        );
        let envelope = decoded.envelope().expect("envelope is best-effort");
        assert!(envelope.payload().is_empty());
    }

    #[test]
    fn crc_mismatch_reports_both_values() {
        let mut bytes = frame(0x00, [0x00, 0x01], &[0x03, 0x32]);
        let crc_offset = bytes.len() - 3;
        bytes[crc_offset] ^= 0xFF;
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        let envelope = decoded.envelope().expect("envelope should parse");
        assert_ne!(envelope.crc_received(), envelope.crc_computed());
        assert_matches!(decoded.errors(), [FrameIssue::CrcMismatch { .. }]);
    }

    #[test]
    fn legacy_end_marker_only_warns() {
        let mut bytes = frame(0x00, [0x00, 0x01], &[0x03, 0x32]);
        let last = bytes.len() - 1;
        bytes[last] = LEGACY_END_OF_FRAME;
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(decoded.is_ok());
        assert_eq!(&[FrameIssue::LegacyEndMarker], decoded.warnings());
    }

    #[test]
    fn other_end_marker_is_an_error() {
        let mut bytes = frame(0x00, [0x00, 0x01], &[0x03, 0x32]);
        let last = bytes.len() - 1;
        bytes[last] = 0x00;
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert_matches!(decoded.errors(), [FrameIssue::BadEndMarker { actual: 0x00 }]);
    }

    #[test]
    fn unknown_arg_id_warns_with_offset_and_keeps_prefix() {
        let bytes = frame(0x00, [0x00, 0x01], &[0x03, 0x32, 0xEE, 0x01]);
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(decoded.is_ok());
        assert_eq!(1, decoded.fields().len());
        assert_eq!(
            &[FrameIssue::TlvStopped {
                payload_offset: 2,
                frame_offset: 7,
                byte: 0xEE,
                remaining: 2,
            }],
            decoded.warnings()
        );
    }

    #[test]
    fn undefined_header_type_is_reported_not_decoded() {
        let bytes = frame(0x40, [0x00, 0x01], &[0x03, 0x32]);
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        assert!(decoded.is_ok());
        assert_eq!(&FrameBody::Undecoded, decoded.body());
        assert_eq!(
            &[FrameIssue::UndefinedHeaderType { bits: 0b01 }],
            decoded.warnings()
        );
    }

    #[test]
    fn sequence_uses_configured_byte_order() {
        let bytes = frame(0x00, [0x12, 0x34], &[]);
        let big = FrameParser::decode(&bytes, CodecConfig::default());
        let little = FrameParser::decode(
            &bytes,
            CodecConfig::new(Endianness::LittleEndian, Endianness::LittleEndian),
        );

        assert_eq!(Some(0x1234), big.envelope().map(Envelope::sequence));
        assert_eq!(Some(0x3412), little.envelope().map(Envelope::sequence));
    }

    #[test]
    fn configured_byte_order_wins_over_header_flags() {
        // Header advertises big-endian values; the caller configured little-endian.
        let bytes = frame(0x01, [0x00, 0x01], &[0x15, 0x34, 0x12]);
        let decoded = FrameParser::decode(&bytes, CodecConfig::default());

        let envelope = decoded.envelope().expect("envelope should parse");
        assert_eq!(Endianness::BigEndian, envelope.advertised_config().value_endian());
        assert_eq!(
            Some(DecodedValue::U16(0x1234)),
            decoded.field("packet_count").map(DecodedField::value)
        );
    }
}

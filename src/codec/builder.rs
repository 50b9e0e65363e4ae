use std::fmt;

use bon::Builder;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::protocol::{
    self, END_OF_FRAME, FLAGS_MASK, FLAG_SEQUENCE_LITTLE_ENDIAN, FLAG_VALUE_BIG_ENDIAN,
    HeaderType, LEGACY_END_OF_FRAME, LENGTH_OVERHEAD, START_OF_FRAME,
};

use super::config::CodecConfig;
use super::crc::crc16;
use super::field_input::{FieldError, FieldInput, convert, encode_value};
use super::primitive::write_u16;

/// Largest payload whose total length still fits the one-byte length field.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize - LENGTH_OVERHEAD;

const INDICATOR_FLAGS: u8 = FLAG_VALUE_BIG_ENDIAN | FLAG_SEQUENCE_LITTLE_ENDIAN;

/// Every field-scoped failure from one build call.
#[derive(Debug, Clone, PartialEq, derive_more::From, derive_more::Into)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// The individual failures in input order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Errors returned when a frame cannot be built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// One or more field values failed validation; no frame was produced.
    #[error("invalid field(s): {0}")]
    InvalidFields(FieldErrors),
    /// Only telemetry frames can be built from field values.
    #[error("building {header_type} frames is not supported")]
    UnsupportedHeader { header_type: HeaderType },
    #[error("flags 0x{flags:02X} do not fit in 6 bits")]
    FlagsOutOfRange { flags: u8 },
    #[error("end marker 0x{value:02X} is not 0xFE or 0xF1")]
    InvalidEndMarker { value: u8 },
    #[error("payload is too large: {payload_len} bytes exceeds max {max_payload_len}")]
    PayloadTooLarge {
        payload_len: usize,
        max_payload_len: usize,
    },
}

/// Everything needed to build one wire frame.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct FrameRequest {
    #[builder(default = HeaderType::Telemetry)]
    header_type: HeaderType,
    /// User flag bits; the two byte-order indicator bits are overwritten.
    #[builder(default)]
    flags: u8,
    sequence: u16,
    /// `0xFE`, or `0xF1` to produce legacy-compatible frames.
    #[builder(default = END_OF_FRAME)]
    end_marker: u8,
    #[builder(default)]
    config: CodecConfig,
    #[builder(default)]
    fields: Vec<FieldInput>,
}

impl FrameRequest {
    /// Byte-order configuration the frame is built with.
    #[must_use]
    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Field inputs in payload order.
    #[must_use]
    pub fn fields(&self) -> &[FieldInput] {
        &self.fields
    }
}

/// Builds wire frames from structured field values.
pub struct FrameBuilder;

impl FrameBuilder {
    /// Validates every field, then assembles SOF, length, header, sequence,
    /// TLV payload, big-endian CRC and end marker.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidFields`] listing every failing field, or
    /// another variant when the envelope settings themselves are invalid.
    ///
    /// ```
    /// use avlink::{FieldInput, FrameBuilder, FrameRequest};
    ///
    /// let request = FrameRequest::builder()
    ///     .sequence(1)
    ///     .fields(vec![FieldInput::new(0x01, "123456")])
    ///     .build();
    /// let frame = FrameBuilder::encode(&request)?;
    /// assert_eq!(
    ///     vec![0xFD, 0x0A, 0x00, 0x00, 0x01, 0x01, 0x40, 0xE2, 0x01, 0x00],
    ///     frame[..10].to_vec()
    /// );
    /// assert_eq!(Some(&0xFE), frame.last());
    /// # Ok::<(), avlink::BuildError>(())
    /// ```
    #[instrument(
        skip(request),
        level = "debug",
        fields(header_type = %request.header_type, sequence = request.sequence, field_count = request.fields.len())
    )]
    pub fn encode(request: &FrameRequest) -> Result<Vec<u8>, BuildError> {
        if request.header_type != HeaderType::Telemetry {
            return Err(BuildError::UnsupportedHeader {
                header_type: request.header_type,
            });
        }
        if request.flags & !FLAGS_MASK != 0 {
            return Err(BuildError::FlagsOutOfRange {
                flags: request.flags,
            });
        }
        if !matches!(request.end_marker, END_OF_FRAME | LEGACY_END_OF_FRAME) {
            return Err(BuildError::InvalidEndMarker {
                value: request.end_marker,
            });
        }

        let payload = encode_payload(request)?;
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(BuildError::PayloadTooLarge {
                payload_len: payload.len(),
                max_payload_len: MAX_PAYLOAD_LEN,
            });
        }
        let total_length = u8::try_from(payload.len() + LENGTH_OVERHEAD).map_err(|_overflow| {
            BuildError::PayloadTooLarge {
                payload_len: payload.len(),
                max_payload_len: MAX_PAYLOAD_LEN,
            }
        })?;

        let flags = (request.flags & !INDICATOR_FLAGS) | request.config.indicator_flags();
        let header = (request.header_type.type_bits().unwrap_or_default() << 6) | flags;

        let mut frame = Vec::with_capacity(usize::from(total_length) + 3);
        frame.push(START_OF_FRAME);
        frame.push(total_length);
        frame.push(header);
        frame.extend_from_slice(&write_u16(
            request.sequence,
            request.config.sequence_endian(),
        ));
        frame.extend_from_slice(&payload);
        let crc = crc16(&frame[2..]);
        frame.extend_from_slice(&crc.to_be_bytes());
        frame.push(request.end_marker);

        debug!(len = frame.len(), crc, "built frame");
        Ok(frame)
    }
}

fn encode_payload(request: &FrameRequest) -> Result<Vec<u8>, BuildError> {
    let mut payload = Vec::new();
    let mut errors = Vec::new();

    for input in &request.fields {
        let Some(definition) = protocol::field_definition(input.id()) else {
            errors.push(FieldError::UnknownField { id: input.id() });
            continue;
        };
        match convert(definition, input.value()) {
            Ok(value) => {
                payload.push(definition.id());
                payload.extend(encode_value(value, request.config.value_endian()));
            }
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(payload)
    } else {
        debug!(count = errors.len(), "field validation failed");
        Err(BuildError::InvalidFields(errors.into()))
    }
}

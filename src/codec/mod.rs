//! Frame codec for the avionics telemetry/command link.
//!
//! Wire layout (`L` = length byte at offset 1):
//!
//! ```text
//! ┌──────┬─────┬────────┬──────────┬─────────────┬──────────┬──────┐
//! │ 0xFD │  L  │ header │ sequence │ payload     │ CRC-16   │ 0xFE │
//! │ 1B   │ 1B  │ 1B     │ 2B       │ L - 5 bytes │ 2B (BE)  │ 1B   │
//! └──────┴─────┴────────┴──────────┴─────────────┴──────────┴──────┘
//! ```
//!
//! `L` counts header through CRC. The CRC covers header, sequence and payload.

mod builder;
mod command;
mod config;
mod crc;
mod field_input;
mod issue;
mod parser;
mod primitive;
mod tlv;

pub use self::builder::{BuildError, FieldErrors, FrameBuilder, FrameRequest, MAX_PAYLOAD_LEN};
pub use self::command::{CommandDecode, CommandDecoder, DecodedCommand};
pub use self::config::CodecConfig;
pub use self::crc::crc16;
pub use self::field_input::{FieldError, FieldInput, InputValue};
pub use self::issue::FrameIssue;
pub use self::parser::{DecodedFrame, Envelope, FrameBody, FrameParser};
pub use self::primitive::{
    Endianness, read_f32, read_i16, read_u16, read_u32, write_f32, write_i16, write_u16,
    write_u32,
};
pub use self::tlv::{DecodedField, DecodedValue, TlvDecoder, TlvWalk};

/// Decodes one frame with the given byte-order configuration.
///
/// ```
/// use avlink::{CodecConfig, codec};
///
/// let frame = codec::decode(&[0xFD, 0x05, 0x00], CodecConfig::default());
/// assert!(!frame.is_ok());
/// ```
#[must_use]
pub fn decode(bytes: &[u8], config: CodecConfig) -> DecodedFrame {
    FrameParser::decode(bytes, config)
}

/// Builds one frame from a validated request.
///
/// # Errors
///
/// Returns an error when any field fails validation or the envelope
/// settings are invalid.
pub fn encode(request: &FrameRequest) -> Result<Vec<u8>, BuildError> {
    FrameBuilder::encode(request)
}

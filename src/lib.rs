//! Codec for the avionics telemetry/command link.
//!
//! [`codec`] holds the frame parser and builder; [`protocol`] holds the wire
//! constants and the field and command registries. The remaining exports
//! back the `avlink` command-line tool.

mod app;
mod cli;
pub mod codec;
mod error;
pub mod protocol;
mod telemetry;
mod terminal;
mod utils;

pub use app::{run, run_with_clients, run_with_clients_and_log_level, run_with_log_level};
pub use cli::{
    Args, ByteOrderArgs, Command, DecodeArgs, EncodeArgs, EndMarker, FieldArg, LogLevel,
    OutputFormat,
};
pub use codec::{
    BuildError, CodecConfig, CommandDecode, CommandDecoder, DecodedCommand, DecodedField,
    DecodedFrame, DecodedValue, Endianness, Envelope, FieldError, FieldErrors, FieldInput,
    FrameBody, FrameBuilder, FrameIssue, FrameParser, FrameRequest, InputValue,
    TlvDecoder, TlvWalk,
};
pub use error::InputError;
pub use protocol::{
    CommandDefinition, FieldDefinition, FieldKind, HeaderType, InputPolicy, command_definition,
    command_definitions, field_definition, field_definition_by_key, field_definitions,
};
pub use terminal::TerminalClient;

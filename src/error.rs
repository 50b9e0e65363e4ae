use thiserror::Error;

/// Errors returned when turning user text into codec inputs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error("hex input is empty")]
    EmptyHex,
    #[error("hex input is not valid: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("field argument `{value}` must look like KEY=VALUE")]
    MalformedFieldArgument { value: String },
    #[error("`{key}` is neither a field key nor an ArgID")]
    UnknownFieldKey { key: String },
    #[error("`{value}` is not a valid byte value")]
    InvalidByte { value: String },
}

/// Errors raised by CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("frame rejected with {errors} error(s)")]
    FrameRejected { errors: usize },
}

/// Errors returned by telemetry initialisation.
#[derive(Debug, Error)]
pub(crate) enum TelemetryError {
    #[error("failed to install tracing subscriber")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

pub(crate) mod command;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod registry;
pub(crate) mod ui;

pub use self::command::{Args, ByteOrderArgs, Command, LogLevel, OutputFormat};
pub use self::decode::DecodeArgs;
pub use self::encode::{EncodeArgs, EndMarker, FieldArg};

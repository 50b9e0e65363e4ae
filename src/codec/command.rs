use std::borrow::Cow;

use serde::Serialize;
use tracing::instrument;

use crate::protocol;

use super::FrameIssue;

/// A command decoded from a command-frame payload.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DecodedCommand {
    id: u8,
    name: Cow<'static, str>,
    known: bool,
}

impl DecodedCommand {
    /// CommandID byte.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Registry name, or `UNKNOWN(0x..)` for unregistered IDs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the ID is present in the command registry.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.known
    }
}

/// Outcome of interpreting a command payload.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandDecode {
    pub(crate) command: Option<DecodedCommand>,
    pub(crate) warnings: Vec<FrameIssue>,
}

/// Decodes the one-byte command payload against the command registry.
pub struct CommandDecoder;

impl CommandDecoder {
    /// Interprets `payload` as a CommandID plus optional trailing bytes.
    ///
    /// ```
    /// use avlink::CommandDecoder;
    ///
    /// let decoded = CommandDecoder::decode(&[0x70]);
    /// let command = decoded.command().expect("command byte present");
    /// assert_eq!("LAUNCH", command.name());
    /// assert!(decoded.warnings().is_empty());
    /// ```
    #[must_use]
    #[instrument(skip(payload), level = "trace", fields(payload_len = payload.len()))]
    pub fn decode(payload: &[u8]) -> CommandDecode {
        let Some((&id, extra)) = payload.split_first() else {
            return CommandDecode {
                command: None,
                warnings: vec![FrameIssue::MissingCommandId],
            };
        };

        let command = match protocol::command_definition(id) {
            Some(definition) => DecodedCommand {
                id,
                name: Cow::Borrowed(definition.key()),
                known: true,
            },
            None => DecodedCommand {
                id,
                name: Cow::Owned(format!("UNKNOWN(0x{id:02X})")),
                known: false,
            },
        };

        let mut warnings = Vec::new();
        if !extra.is_empty() {
            warnings.push(FrameIssue::ExtraCommandBytes { count: extra.len() });
        }

        CommandDecode {
            command: Some(command),
            warnings,
        }
    }
}

impl CommandDecode {
    /// The decoded command, absent when the payload was empty.
    #[must_use]
    pub fn command(&self) -> Option<&DecodedCommand> {
        self.command.as_ref()
    }

    /// Non-fatal anomalies seen while decoding.
    #[must_use]
    pub fn warnings(&self) -> &[FrameIssue] {
        &self.warnings
    }
}

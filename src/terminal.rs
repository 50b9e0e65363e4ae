use std::io::{self, IsTerminal};

/// Reports whether the standard streams are attached to a terminal.
///
/// Injected into the runners so tests can force plain, uncoloured output.
pub trait TerminalClient {
    /// Returns `true` when stdout is an interactive terminal.
    fn stdout_is_terminal(&self) -> bool;
    /// Returns `true` when stderr is an interactive terminal.
    fn stderr_is_terminal(&self) -> bool;
}

/// Terminal client backed by the process's real standard streams.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SystemTerminalClient;

impl TerminalClient for SystemTerminalClient {
    fn stdout_is_terminal(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn stderr_is_terminal(&self) -> bool {
        io::stderr().is_terminal()
    }
}

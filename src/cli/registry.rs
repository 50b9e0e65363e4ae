use std::io;

use anyhow::Result;
use tracing::instrument;

use crate::cli::OutputFormat;
use crate::protocol::{self, InputPolicy};
use crate::terminal::TerminalClient;
use crate::utils::format_byte;

use super::ui::{Painter, Table};

/// Executes the `fields` command.
#[instrument(skip(out, terminal_client), level = "info", fields(?output_format))]
pub(crate) fn run_fields<W>(
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let definitions = protocol::field_definitions();
    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            let rows = definitions
                .iter()
                .map(|definition| {
                    vec![
                        format_byte(definition.id()),
                        painter.value(definition.key()),
                        definition.kind().to_string(),
                        definition.byte_width().to_string(),
                        describe_policy(definition.policy()),
                        painter.muted(definition.note()),
                    ]
                })
                .collect();
            let table = Table::grid(["id", "key", "kind", "bytes", "input", "note"], rows)
                .titled(painter.heading("Telemetry fields"));
            writeln!(out, "{table}")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, definitions)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Executes the `commands` command.
#[instrument(skip(out, terminal_client), level = "info", fields(?output_format))]
pub(crate) fn run_commands<W>(
    out: &mut W,
    terminal_client: &dyn TerminalClient,
    output_format: OutputFormat,
) -> Result<()>
where
    W: io::Write,
{
    let definitions = protocol::command_definitions();
    match output_format {
        OutputFormat::Pretty => {
            let painter = Painter::new(terminal_client.stdout_is_terminal());
            let rows = definitions
                .iter()
                .map(|definition| {
                    vec![
                        format_byte(definition.id()),
                        painter.value(definition.key()),
                    ]
                })
                .collect();
            let table = Table::grid(["id", "name"], rows).titled(painter.heading("Commands"));
            writeln!(out, "{table}")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, definitions)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn describe_policy(policy: InputPolicy) -> String {
    match policy {
        InputPolicy::Float => "finite number".to_string(),
        InputPolicy::Range { min, max } => format!("integer {min}..={max}"),
        InputPolicy::ClampU32 => "rounded, clamped to u32".to_string(),
        InputPolicy::WrapScaledI16 { scale } => format!("x{scale}, rounded, wraps in i16"),
        InputPolicy::ScaledU16 { scale } => format!("x{scale}, rounded, 0..=65535"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::float(InputPolicy::Float, "finite number")]
    #[case::range(InputPolicy::Range { min: 0, max: 100 }, "integer 0..=100")]
    #[case::clamp(InputPolicy::ClampU32, "rounded, clamped to u32")]
    #[case::wrap(InputPolicy::WrapScaledI16 { scale: 100 }, "x100, rounded, wraps in i16")]
    #[case::scaled(InputPolicy::ScaledU16 { scale: 10 }, "x10, rounded, 0..=65535")]
    fn policies_have_readable_descriptions(#[case] policy: InputPolicy, #[case] expected: &str) {
        assert_eq!(expected, describe_policy(policy));
    }
}

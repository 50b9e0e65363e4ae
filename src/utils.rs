use crate::error::InputError;

/// Formats bytes as uppercase hexadecimal pairs separated by spaces.
pub(crate) fn format_hex(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "<empty>".to_string();
    }

    let mut rendered = String::with_capacity(bytes.len().saturating_mul(3));
    for (index, value) in bytes.iter().enumerate() {
        if index > 0 {
            rendered.push(' ');
        }
        let high = value >> 4;
        let low = value & 0x0F;
        rendered.push(nibble_to_hex(high));
        rendered.push(nibble_to_hex(low));
    }
    rendered
}

/// Formats a byte as `0xAB`.
pub(crate) fn format_byte(value: u8) -> String {
    format!("0x{value:02X}")
}

/// Parses loosely formatted hex text into bytes.
///
/// Whitespace, commas and `0x` prefixes are ignored, so `FD 0A`, `0xFD,0x0A`
/// and `fd0a` all yield the same bytes.
pub(crate) fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, InputError> {
    let cleaned: String = text
        .split(|character: char| character.is_whitespace() || character == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();

    if cleaned.is_empty() {
        return Err(InputError::EmptyHex);
    }

    Ok(hex::decode(cleaned)?)
}

/// Parses a byte written in decimal or with a `0x` prefix.
pub(crate) fn parse_byte(text: &str) -> Result<u8, InputError> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_error| InputError::InvalidByte {
        value: text.to_string(),
    })
}

fn nibble_to_hex(value: u8) -> char {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    HEX[value as usize] as char
}

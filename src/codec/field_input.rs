use std::fmt;

use thiserror::Error;

use crate::protocol::{FieldDefinition, FieldKind, InputPolicy};

use super::primitive::{Endianness, write_f32, write_i16, write_u16, write_u32};
use super::tlv::DecodedValue;

/// User-supplied value for one telemetry field.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    /// Text as typed into a form, e.g. `"12.5"` or `"0x1F"`.
    Text(String),
    /// An already-parsed number in engineering units.
    Number(f64),
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// An (ArgID, value) pair to encode into a telemetry payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInput {
    id: u8,
    value: InputValue,
}

impl FieldInput {
    /// Creates a field input from any supported value form.
    ///
    /// ```
    /// use avlink::FieldInput;
    ///
    /// let text = FieldInput::new(0x03, "85");
    /// let number = FieldInput::new(0x05, 1520.25);
    /// assert_eq!(0x03, text.id());
    /// let _ = number;
    /// ```
    #[must_use]
    pub fn new(id: u8, value: impl Into<InputValue>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }

    /// ArgID this input targets.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The value as supplied.
    #[must_use]
    pub fn value(&self) -> &InputValue {
        &self.value
    }
}

/// A validation failure scoped to one field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("ArgID 0x{id:02X} is not a known telemetry field")]
    UnknownField { id: u8 },
    #[error("{field}: `{input}` is not a number")]
    NotANumber { field: &'static str, input: String },
    #[error("{field}: `{input}` must be a finite number")]
    NotFinite { field: &'static str, input: String },
    #[error("{field}: `{input}` must be an integer")]
    NotAnInteger { field: &'static str, input: String },
    #[error("{field}: `{input}` must be an integer in {min}..={max}")]
    OutOfRange {
        field: &'static str,
        input: String,
        min: i64,
        max: i64,
    },
    /// A scaled unsigned quantity fell outside the 16-bit wire range.
    #[error("{field}: `{input}` x{scale} = {scaled} is outside 0..=65535")]
    ScaledOutOfRange {
        field: &'static str,
        input: String,
        scale: u16,
        scaled: f64,
    },
}

impl FieldError {
    /// Registry key of the offending field, when the ArgID was known.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::UnknownField { .. } => None,
            Self::NotANumber { field, .. }
            | Self::NotFinite { field, .. }
            | Self::NotAnInteger { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::ScaledOutOfRange { field, .. } => Some(*field),
        }
    }
}

/// Validates `input` against `definition` and converts it to the wire value.
pub(crate) fn convert(
    definition: &FieldDefinition,
    input: &InputValue,
) -> Result<DecodedValue, FieldError> {
    let field = definition.key();
    let number = parse_number(definition, input)?;

    match definition.policy() {
        InputPolicy::Float => {
            let single = number as f32;
            if !single.is_finite() {
                return Err(FieldError::NotFinite {
                    field,
                    input: input.to_string(),
                });
            }
            Ok(DecodedValue::F32(single))
        }
        InputPolicy::Range { min, max } => {
            if number.fract() != 0.0 {
                return Err(FieldError::NotAnInteger {
                    field,
                    input: input.to_string(),
                });
            }
            let out_of_range = || FieldError::OutOfRange {
                field,
                input: input.to_string(),
                min,
                max,
            };
            if number < min as f64 || number > max as f64 {
                return Err(out_of_range());
            }
            integer_value(definition.kind(), number as i64).ok_or_else(out_of_range)
        }
        InputPolicy::ClampU32 => {
            let clamped = number.round().clamp(0.0, f64::from(u32::MAX));
            Ok(DecodedValue::U32(clamped as u32))
        }
        InputPolicy::WrapScaledI16 { scale } => {
            let scaled = (number * f64::from(scale)).round();
            let wrapped = scaled.rem_euclid(65_536.0) as u16;
            Ok(DecodedValue::I16(wrapped.cast_signed()))
        }
        InputPolicy::ScaledU16 { scale } => {
            let scaled = (number * f64::from(scale)).round();
            if !(0.0..=f64::from(u16::MAX)).contains(&scaled) {
                return Err(FieldError::ScaledOutOfRange {
                    field,
                    input: input.to_string(),
                    scale,
                    scaled,
                });
            }
            Ok(DecodedValue::U16(scaled as u16))
        }
    }
}

/// Encodes a wire value in the given byte order.
pub(crate) fn encode_value(value: DecodedValue, endian: Endianness) -> Vec<u8> {
    match value {
        DecodedValue::U8(value) => vec![value],
        DecodedValue::U16(value) => write_u16(value, endian).to_vec(),
        DecodedValue::I16(value) => write_i16(value, endian).to_vec(),
        DecodedValue::U32(value) => write_u32(value, endian).to_vec(),
        DecodedValue::F32(value) => write_f32(value, endian).to_vec(),
    }
}

fn parse_number(definition: &FieldDefinition, input: &InputValue) -> Result<f64, FieldError> {
    let field = definition.key();
    let number = match input {
        InputValue::Number(value) => *value,
        InputValue::Text(text) => {
            let trimmed = text.trim();
            let hex_digits = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"));
            match (hex_digits, definition.policy()) {
                (Some(digits), InputPolicy::Range { .. }) => u32::from_str_radix(digits, 16)
                    .map(f64::from)
                    .map_err(|_| FieldError::NotANumber {
                        field,
                        input: text.clone(),
                    })?,
                _ => trimmed.parse::<f64>().map_err(|_| FieldError::NotANumber {
                    field,
                    input: text.clone(),
                })?,
            }
        }
    };

    if !number.is_finite() {
        return Err(FieldError::NotFinite {
            field,
            input: input.to_string(),
        });
    }
    Ok(number)
}

fn integer_value(kind: FieldKind, value: i64) -> Option<DecodedValue> {
    match kind {
        FieldKind::Uint8 | FieldKind::Enum8 | FieldKind::Bitfield8 => {
            u8::try_from(value).ok().map(DecodedValue::U8)
        }
        FieldKind::Uint16 => u16::try_from(value).ok().map(DecodedValue::U16),
        FieldKind::Int16 => i16::try_from(value).ok().map(DecodedValue::I16),
        FieldKind::Uint32 => u32::try_from(value).ok().map(DecodedValue::U32),
        FieldKind::Float32 => Some(DecodedValue::F32(value as f32)),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::protocol::{field_definition, field_definition_by_key, field_definitions};

    fn convert_key(key: &str, input: impl Into<InputValue>) -> Result<DecodedValue, FieldError> {
        let definition = field_definition_by_key(key).expect("test key is registered");
        convert(definition, &input.into())
    }

    #[rstest]
    #[case::percent_low("battery_pct", "0", DecodedValue::U8(0))]
    #[case::percent_high("battery_pct", "100", DecodedValue::U8(100))]
    #[case::bitmask_hex("status_flags", "0x1F", DecodedValue::U8(0x1F))]
    #[case::enum_padded("flight_state", " 4 ", DecodedValue::U8(4))]
    #[case::signed_raw("board_temp_c", "-40", DecodedValue::I16(-40))]
    #[case::float("altitude_m", "1520.25", DecodedValue::F32(1520.25))]
    #[case::angle_rounds("roll_deg", "12.345", DecodedValue::I16(1235))]
    #[case::angle_negative("pitch_deg", "-1.5", DecodedValue::I16(-150))]
    #[case::pressure_centibar("tank_pressure_bar", "55.5", DecodedValue::U16(5550))]
    #[case::pressure_decibar("chamber_pressure_bar", "42.26", DecodedValue::U16(423))]
    fn converts_valid_text(
        #[case] key: &str,
        #[case] input: &str,
        #[case] expected: DecodedValue,
    ) {
        assert_eq!(Ok(expected), convert_key(key, input));
    }

    #[test]
    fn angle_outside_i16_wraps() {
        // 400.00 deg -> 40000 centidegrees -> 40000 - 65536
        assert_eq!(Ok(DecodedValue::I16(-25_536)), convert_key("yaw_deg", 400.0));
        assert_eq!(Ok(DecodedValue::I16(25_536)), convert_key("yaw_deg", -400.0));
    }

    #[rstest]
    #[case::negative(-5.0, 0)]
    #[case::overflow(5.0e12, u32::MAX)]
    #[case::rounds(1.6, 2)]
    fn elapsed_counters_clamp_silently(#[case] input: f64, #[case] expected: u32) {
        assert_eq!(Ok(DecodedValue::U32(expected)), convert_key("millis", input));
    }

    #[test]
    fn percentage_out_of_range_is_rejected_not_clamped() {
        let result = convert_key("battery_pct", "101");
        assert_matches!(
            result,
            Err(FieldError::OutOfRange {
                field: "battery_pct",
                min: 0,
                max: 100,
                ..
            })
        );
    }

    #[test]
    fn enum_out_of_declared_range_is_rejected() {
        assert_matches!(
            convert_key("gnss_fix", "6"),
            Err(FieldError::OutOfRange { max: 5, .. })
        );
    }

    #[test]
    fn fractional_integer_input_is_rejected() {
        assert_matches!(
            convert_key("packet_count", "1.5"),
            Err(FieldError::NotAnInteger {
                field: "packet_count",
                ..
            })
        );
    }

    #[test]
    fn pressure_outside_u16_is_rejected() {
        assert_matches!(
            convert_key("tank_pressure_bar", "655.36"),
            Err(FieldError::ScaledOutOfRange {
                field: "tank_pressure_bar",
                scale: 100,
                ..
            })
        );
        assert_matches!(
            convert_key("chamber_pressure_bar", -0.1),
            Err(FieldError::ScaledOutOfRange { .. })
        );
    }

    #[rstest]
    #[case::nan("NaN")]
    #[case::infinity("inf")]
    fn non_finite_input_is_rejected(#[case] input: &str) {
        assert_matches!(
            convert_key("altitude_m", input),
            Err(FieldError::NotFinite {
                field: "altitude_m",
                ..
            })
        );
    }

    #[test]
    fn float_beyond_single_precision_is_rejected() {
        assert_matches!(
            convert_key("latitude_deg", 1.0e40),
            Err(FieldError::NotFinite { .. })
        );
    }

    #[test]
    fn garbage_text_is_not_a_number() {
        assert_matches!(
            convert_key("accel_x_g", "fast"),
            Err(FieldError::NotANumber { field: "accel_x_g", .. })
        );
    }

    #[test]
    fn hex_prefix_only_applies_to_integer_fields() {
        assert_matches!(
            convert_key("altitude_m", "0x10"),
            Err(FieldError::NotANumber { .. })
        );
    }

    #[test]
    fn every_policy_produces_the_declared_width() {
        for definition in field_definitions() {
            let value = convert(definition, &InputValue::Number(1.0))
                .unwrap_or_else(|error| panic!("{}: {error}", definition.key()));
            let encoded = encode_value(value, Endianness::LittleEndian);
            assert_eq!(definition.byte_width(), encoded.len(), "{}", definition.key());
        }
    }

    #[test]
    fn field_error_names_its_field() {
        let definition = field_definition(0x03).expect("0x03 is registered");
        let error = convert(definition, &InputValue::from("abc"))
            .expect_err("non-numeric input should fail");
        assert_eq!(Some("battery_pct"), error.field());
    }
}

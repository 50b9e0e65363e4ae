use std::fmt;

use serde::Serialize;
use serde_with::{hex::Hex, serde_as};
use tracing::{instrument, trace};

use crate::protocol::{self, FieldDefinition, FieldKind};

use super::primitive::{Endianness, read_f32, read_i16, read_u16, read_u32};

/// A decoded telemetry value tagged by its wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    U8(u8),
    U16(u16),
    I16(i16),
    U32(u32),
    F32(f32),
}

impl DecodedValue {
    /// Widens the value to `f64` without loss.
    ///
    /// ```
    /// use avlink::DecodedValue;
    ///
    /// assert_eq!(-250.0, DecodedValue::I16(-250).as_f64());
    /// ```
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::U8(value) => f64::from(value),
            Self::U16(value) => f64::from(value),
            Self::I16(value) => f64::from(value),
            Self::U32(value) => f64::from(value),
            Self::F32(value) => f64::from(value),
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(value) => write!(f, "{value}"),
            Self::U16(value) => write!(f, "{value}"),
            Self::I16(value) => write!(f, "{value}"),
            Self::U32(value) => write!(f, "{value}"),
            Self::F32(value) => write!(f, "{value}"),
        }
    }
}

/// One TLV instance decoded from a telemetry payload.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedField {
    id: u8,
    name: &'static str,
    kind: FieldKind,
    byte_width: usize,
    #[serde_as(as = "Hex")]
    raw_bytes: Vec<u8>,
    value: DecodedValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<u16>,
}

impl DecodedField {
    fn new(definition: &FieldDefinition, raw_bytes: &[u8], value: DecodedValue) -> Self {
        Self {
            id: definition.id(),
            name: definition.key(),
            kind: definition.kind(),
            byte_width: definition.byte_width(),
            raw_bytes: raw_bytes.to_vec(),
            value,
            scale: definition.policy().scale(),
        }
    }

    /// ArgID byte.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Registry key of the field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wire value kind.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of value bytes consumed after the ArgID.
    #[must_use]
    pub fn byte_width(&self) -> usize {
        self.byte_width
    }

    /// Value bytes exactly as received.
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    /// Decoded wire value.
    #[must_use]
    pub fn value(&self) -> DecodedValue {
        self.value
    }

    /// Value in engineering units, undoing any wire scaling.
    ///
    /// Unscaled fields return the wire value unchanged.
    #[must_use]
    pub fn engineering_value(&self) -> f64 {
        match self.scale {
            Some(scale) => self.value.as_f64() / f64::from(scale),
            None => self.value.as_f64(),
        }
    }
}

/// Result of walking a TLV payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TlvWalk {
    fields: Vec<DecodedField>,
    consumed: usize,
}

impl TlvWalk {
    /// Fields decoded before the walk finished or stopped.
    #[must_use]
    pub fn fields(&self) -> &[DecodedField] {
        &self.fields
    }

    /// Payload bytes consumed by the decoded fields.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub(crate) fn into_fields(self) -> Vec<DecodedField> {
        self.fields
    }
}

/// Decodes a TLV payload against the field registry.
pub struct TlvDecoder;

impl TlvDecoder {
    /// Walks `payload` left to right, stopping quietly at the first unknown
    /// ArgID or truncated value.
    ///
    /// ```
    /// use avlink::{DecodedValue, Endianness, TlvDecoder};
    ///
    /// let walk = TlvDecoder::decode(&[0x01, 0x40, 0xE2, 0x01, 0x00], Endianness::LittleEndian);
    /// assert_eq!(5, walk.consumed());
    /// assert_eq!("millis", walk.fields()[0].name());
    /// assert_eq!(DecodedValue::U32(123_456), walk.fields()[0].value());
    /// ```
    #[must_use]
    #[instrument(skip(payload), level = "trace", fields(payload_len = payload.len()))]
    pub fn decode(payload: &[u8], value_endian: Endianness) -> TlvWalk {
        let mut fields = Vec::new();
        let mut offset = 0usize;

        while let Some(&arg_id) = payload.get(offset) {
            let Some(definition) = protocol::field_definition(arg_id) else {
                trace!(offset, arg_id, "unknown ArgID; stopping TLV walk");
                break;
            };

            let value_start = offset + 1;
            let value_end = value_start + definition.byte_width();
            let Some(raw) = payload.get(value_start..value_end) else {
                trace!(
                    offset,
                    arg_id,
                    needed = definition.byte_width(),
                    available = payload.len() - value_start,
                    "truncated TLV value; stopping TLV walk"
                );
                break;
            };
            let Some(value) = decode_value(definition.kind(), raw, value_endian) else {
                break;
            };

            fields.push(DecodedField::new(definition, raw, value));
            offset = value_end;
        }

        TlvWalk {
            fields,
            consumed: offset,
        }
    }
}

fn decode_value(kind: FieldKind, raw: &[u8], endian: Endianness) -> Option<DecodedValue> {
    let value = match kind {
        FieldKind::Uint8 | FieldKind::Enum8 | FieldKind::Bitfield8 => {
            DecodedValue::U8(*raw.first()?)
        }
        FieldKind::Uint16 => DecodedValue::U16(read_u16(raw.try_into().ok()?, endian)),
        FieldKind::Int16 => DecodedValue::I16(read_i16(raw.try_into().ok()?, endian)),
        FieldKind::Uint32 => DecodedValue::U32(read_u32(raw.try_into().ok()?, endian)),
        FieldKind::Float32 => DecodedValue::F32(read_f32(raw.try_into().ok()?, endian)),
    };
    Some(value)
}

use clap::ValueEnum;
use serde::Serialize;
use strum_macros::Display;

/// Byte order applied to a multi-byte wire quantity.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Display, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    /// Least significant byte first.
    #[default]
    #[strum(to_string = "little")]
    #[value(name = "le", alias = "little")]
    LittleEndian,
    /// Most significant byte first.
    #[strum(to_string = "big")]
    #[value(name = "be", alias = "big")]
    BigEndian,
}

/// Reads an unsigned 16-bit value.
///
/// ```
/// use avlink::{Endianness, codec};
///
/// assert_eq!(0x1234, codec::read_u16([0x34, 0x12], Endianness::LittleEndian));
/// assert_eq!(0x1234, codec::read_u16([0x12, 0x34], Endianness::BigEndian));
/// ```
#[must_use]
pub fn read_u16(bytes: [u8; 2], endian: Endianness) -> u16 {
    match endian {
        Endianness::LittleEndian => u16::from_le_bytes(bytes),
        Endianness::BigEndian => u16::from_be_bytes(bytes),
    }
}

/// Reads a two's-complement signed 16-bit value.
///
/// ```
/// use avlink::{Endianness, codec};
///
/// assert_eq!(-2, codec::read_i16([0xFE, 0xFF], Endianness::LittleEndian));
/// ```
#[must_use]
pub fn read_i16(bytes: [u8; 2], endian: Endianness) -> i16 {
    read_u16(bytes, endian).cast_signed()
}

/// Reads an unsigned 32-bit value.
#[must_use]
pub fn read_u32(bytes: [u8; 4], endian: Endianness) -> u32 {
    match endian {
        Endianness::LittleEndian => u32::from_le_bytes(bytes),
        Endianness::BigEndian => u32::from_be_bytes(bytes),
    }
}

/// Reinterprets four bytes as an IEEE-754 single-precision float.
///
/// ```
/// use avlink::{Endianness, codec};
///
/// assert_eq!(1.0, codec::read_f32([0x3F, 0x80, 0x00, 0x00], Endianness::BigEndian));
/// ```
#[must_use]
pub fn read_f32(bytes: [u8; 4], endian: Endianness) -> f32 {
    f32::from_bits(read_u32(bytes, endian))
}

/// Encodes an unsigned 16-bit value.
#[must_use]
pub fn write_u16(value: u16, endian: Endianness) -> [u8; 2] {
    match endian {
        Endianness::LittleEndian => value.to_le_bytes(),
        Endianness::BigEndian => value.to_be_bytes(),
    }
}

/// Encodes a signed 16-bit value in two's complement.
#[must_use]
pub fn write_i16(value: i16, endian: Endianness) -> [u8; 2] {
    write_u16(value.cast_unsigned(), endian)
}

/// Encodes an unsigned 32-bit value.
#[must_use]
pub fn write_u32(value: u32, endian: Endianness) -> [u8; 4] {
    match endian {
        Endianness::LittleEndian => value.to_le_bytes(),
        Endianness::BigEndian => value.to_be_bytes(),
    }
}

/// Encodes an IEEE-754 single-precision float bit for bit.
#[must_use]
pub fn write_f32(value: f32, endian: Endianness) -> [u8; 4] {
    write_u32(value.to_bits(), endian)
}

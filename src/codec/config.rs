use bon::Builder;
use serde::Serialize;

use crate::protocol::{FLAG_SEQUENCE_LITTLE_ENDIAN, FLAG_VALUE_BIG_ENDIAN};

use super::primitive::Endianness;

/// Byte-order settings applied to one decode or encode call.
///
/// Values and the sequence number are configured independently; the
/// defaults match a header whose indicator flags are both clear.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Builder)]
pub struct CodecConfig {
    #[builder(default = Endianness::LittleEndian)]
    value_endian: Endianness,
    #[builder(default = Endianness::BigEndian)]
    sequence_endian: Endianness,
}

impl CodecConfig {
    /// Creates a configuration from explicit byte orders.
    #[must_use]
    pub const fn new(value_endian: Endianness, sequence_endian: Endianness) -> Self {
        Self {
            value_endian,
            sequence_endian,
        }
    }

    /// Derives the configuration a header's indicator flags advertise.
    ///
    /// ```
    /// use avlink::{CodecConfig, Endianness};
    ///
    /// let config = CodecConfig::from_header_flags(0b0000_0011);
    /// assert_eq!(Endianness::BigEndian, config.value_endian());
    /// assert_eq!(Endianness::LittleEndian, config.sequence_endian());
    /// assert_eq!(CodecConfig::default(), CodecConfig::from_header_flags(0));
    /// ```
    #[must_use]
    pub const fn from_header_flags(flags: u8) -> Self {
        let value_endian = if flags & FLAG_VALUE_BIG_ENDIAN != 0 {
            Endianness::BigEndian
        } else {
            Endianness::LittleEndian
        };
        let sequence_endian = if flags & FLAG_SEQUENCE_LITTLE_ENDIAN != 0 {
            Endianness::LittleEndian
        } else {
            Endianness::BigEndian
        };
        Self::new(value_endian, sequence_endian)
    }

    /// Byte order for multi-byte TLV values.
    #[must_use]
    pub const fn value_endian(&self) -> Endianness {
        self.value_endian
    }

    /// Byte order for the 2-byte sequence number.
    #[must_use]
    pub const fn sequence_endian(&self) -> Endianness {
        self.sequence_endian
    }

    /// Header flag bits that advertise this configuration.
    ///
    /// ```
    /// use avlink::{CodecConfig, Endianness};
    ///
    /// let config = CodecConfig::builder().value_endian(Endianness::BigEndian).build();
    /// assert_eq!(0b01, config.indicator_flags());
    /// ```
    #[must_use]
    pub const fn indicator_flags(&self) -> u8 {
        let mut flags = 0;
        if matches!(self.value_endian, Endianness::BigEndian) {
            flags |= FLAG_VALUE_BIG_ENDIAN;
        }
        if matches!(self.sequence_endian, Endianness::LittleEndian) {
            flags |= FLAG_SEQUENCE_LITTLE_ENDIAN;
        }
        flags
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new(Endianness::LittleEndian, Endianness::BigEndian)
    }
}

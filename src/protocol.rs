use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// Start-of-frame marker at offset `0`.
pub const START_OF_FRAME: u8 = 0xFD;

/// End-of-frame marker expected at offset `2 + total_length`.
pub const END_OF_FRAME: u8 = 0xFE;

/// Legacy end marker found in older interface documents; accepted with a warning.
pub const LEGACY_END_OF_FRAME: u8 = 0xF1;

/// Smallest buffer that can hold SOF, length, header, sequence and CRC.
pub const MIN_FRAME_LEN: usize = 7;

/// Bytes before the region counted by the length field (SOF + length).
pub(crate) const PREAMBLE_LEN: usize = 2;

/// Offset of the header byte.
pub(crate) const HEADER_OFFSET: usize = 2;

/// Offset of the first sequence byte.
pub(crate) const SEQUENCE_OFFSET: usize = 3;

/// Offset of the first payload byte.
pub(crate) const PAYLOAD_OFFSET: usize = 5;

/// Header + sequence + CRC bytes counted by the length field around the payload.
pub(crate) const LENGTH_OVERHEAD: usize = 5;

pub(crate) const CRC_LEN: usize = 2;

/// Mask for the six flag bits in the header byte.
pub const FLAGS_MASK: u8 = 0x3F;

/// Flag bit that advertises big-endian field values.
pub const FLAG_VALUE_BIG_ENDIAN: u8 = 0x01;

/// Flag bit that advertises a little-endian sequence number.
pub const FLAG_SEQUENCE_LITTLE_ENDIAN: u8 = 0x02;

/// Frame class encoded in the top two bits of the header byte.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderType {
    /// `00`: sensor telemetry carrying a TLV payload.
    #[strum(to_string = "telemetry")]
    Telemetry,
    /// `11`: control command carrying a command byte.
    #[strum(to_string = "command")]
    Command,
    /// `01` or `10`: not defined by the protocol.
    #[strum(to_string = "unknown")]
    Unknown,
}

impl HeaderType {
    /// Classifies a header byte by its two type bits.
    ///
    /// ```
    /// use avlink::HeaderType;
    ///
    /// assert_eq!(HeaderType::Telemetry, HeaderType::from_header_byte(0x01));
    /// assert_eq!(HeaderType::Command, HeaderType::from_header_byte(0xC0));
    /// assert_eq!(HeaderType::Unknown, HeaderType::from_header_byte(0x40));
    /// ```
    #[must_use]
    pub const fn from_header_byte(header: u8) -> Self {
        match header >> 6 {
            0b00 => Self::Telemetry,
            0b11 => Self::Command,
            _ => Self::Unknown,
        }
    }

    /// Returns the two type bits, or `None` for [`HeaderType::Unknown`].
    #[must_use]
    pub const fn type_bits(self) -> Option<u8> {
        match self {
            Self::Telemetry => Some(0b00),
            Self::Command => Some(0b11),
            Self::Unknown => None,
        }
    }
}

/// Wire representation of a telemetry value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumIter, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[strum(to_string = "uint8")]
    Uint8,
    #[strum(to_string = "uint16")]
    Uint16,
    #[strum(to_string = "int16")]
    Int16,
    #[strum(to_string = "uint32")]
    Uint32,
    #[strum(to_string = "float32")]
    Float32,
    #[strum(to_string = "enum8")]
    Enum8,
    #[strum(to_string = "bitfield8")]
    Bitfield8,
}

impl FieldKind {
    /// Number of value bytes this kind occupies on the wire.
    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            Self::Uint8 | Self::Enum8 | Self::Bitfield8 => 1,
            Self::Uint16 | Self::Int16 => 2,
            Self::Uint32 | Self::Float32 => 4,
        }
    }
}

/// How user-facing input is validated and converted before encoding.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum InputPolicy {
    /// Any finite number, stored as IEEE-754 single precision.
    Float,
    /// An integer within `min..=max`; anything else is a field error.
    Range { min: i64, max: i64 },
    /// A number rounded to an integer and silently clamped into `0..=u32::MAX`.
    ClampU32,
    /// A signed quantity multiplied by `scale`, rounded and wrapped into `i16`.
    WrapScaledI16 { scale: u16 },
    /// An unsigned quantity multiplied by `scale`, rounded, rejected outside `u16`.
    ScaledU16 { scale: u16 },
}

impl InputPolicy {
    /// Scale between the engineering unit and the wire integer, if any.
    #[must_use]
    pub const fn scale(self) -> Option<u16> {
        match self {
            Self::WrapScaledI16 { scale } | Self::ScaledU16 { scale } => Some(scale),
            Self::Float | Self::Range { .. } | Self::ClampU32 => None,
        }
    }
}

/// One entry in the telemetry field registry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct FieldDefinition {
    id: u8,
    key: &'static str,
    kind: FieldKind,
    policy: InputPolicy,
    note: &'static str,
}

impl FieldDefinition {
    const fn new(
        id: u8,
        key: &'static str,
        kind: FieldKind,
        policy: InputPolicy,
        note: &'static str,
    ) -> Self {
        Self {
            id,
            key,
            kind,
            policy,
            note,
        }
    }

    /// ArgID byte.
    #[must_use]
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Unique registry key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Wire value kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of value bytes following the ArgID.
    #[must_use]
    pub const fn byte_width(&self) -> usize {
        self.kind.byte_width()
    }

    /// Input validation and conversion policy.
    #[must_use]
    pub const fn policy(&self) -> InputPolicy {
        self.policy
    }

    /// Free-text semantic note.
    #[must_use]
    pub const fn note(&self) -> &'static str {
        self.note
    }
}

/// One entry in the command registry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CommandDefinition {
    id: u8,
    key: &'static str,
}

impl CommandDefinition {
    /// CommandID byte.
    #[must_use]
    pub const fn id(&self) -> u8 {
        self.id
    }

    /// Command name.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }
}

const U8_FULL: InputPolicy = InputPolicy::Range { min: 0, max: 255 };
const U16_FULL: InputPolicy = InputPolicy::Range { min: 0, max: 65_535 };
const I16_FULL: InputPolicy = InputPolicy::Range {
    min: -32_768,
    max: 32_767,
};
const ANGLE_CENTIDEGREES: InputPolicy = InputPolicy::WrapScaledI16 { scale: 100 };

static FIELD_DEFINITIONS: [FieldDefinition; 25] = [
    FieldDefinition::new(
        0x01,
        "millis",
        FieldKind::Uint32,
        InputPolicy::ClampU32,
        "milliseconds since power-on",
    ),
    FieldDefinition::new(
        0x02,
        "flight_state",
        FieldKind::Enum8,
        InputPolicy::Range { min: 0, max: 9 },
        "0=idle 1=armed 2=boost 3=coast 4=apogee 5=drogue 6=main 7=landed 8=abort 9=fault",
    ),
    FieldDefinition::new(
        0x03,
        "battery_pct",
        FieldKind::Uint8,
        InputPolicy::Range { min: 0, max: 100 },
        "battery state of charge, percent",
    ),
    FieldDefinition::new(
        0x04,
        "status_flags",
        FieldKind::Bitfield8,
        U8_FULL,
        "bit0=gnss bit1=baro bit2=imu bit3=logging bit4=radio",
    ),
    FieldDefinition::new(
        0x05,
        "altitude_m",
        FieldKind::Float32,
        InputPolicy::Float,
        "barometric altitude above launch site, metres",
    ),
    FieldDefinition::new(
        0x06,
        "vertical_speed_mps",
        FieldKind::Float32,
        InputPolicy::Float,
        "vertical speed, metres per second",
    ),
    FieldDefinition::new(
        0x07,
        "accel_x_g",
        FieldKind::Float32,
        InputPolicy::Float,
        "body-frame acceleration X, g",
    ),
    FieldDefinition::new(
        0x08,
        "accel_y_g",
        FieldKind::Float32,
        InputPolicy::Float,
        "body-frame acceleration Y, g",
    ),
    FieldDefinition::new(
        0x09,
        "accel_z_g",
        FieldKind::Float32,
        InputPolicy::Float,
        "body-frame acceleration Z, g",
    ),
    FieldDefinition::new(
        0x0A,
        "gyro_x_dps",
        FieldKind::Float32,
        InputPolicy::Float,
        "body-frame rotation rate X, degrees per second",
    ),
    FieldDefinition::new(
        0x0B,
        "gyro_y_dps",
        FieldKind::Float32,
        InputPolicy::Float,
        "body-frame rotation rate Y, degrees per second",
    ),
    FieldDefinition::new(
        0x0C,
        "gyro_z_dps",
        FieldKind::Float32,
        InputPolicy::Float,
        "body-frame rotation rate Z, degrees per second",
    ),
    FieldDefinition::new(
        0x0D,
        "roll_deg",
        FieldKind::Int16,
        ANGLE_CENTIDEGREES,
        "roll angle, degrees x100",
    ),
    FieldDefinition::new(
        0x0E,
        "pitch_deg",
        FieldKind::Int16,
        ANGLE_CENTIDEGREES,
        "pitch angle, degrees x100",
    ),
    FieldDefinition::new(
        0x0F,
        "yaw_deg",
        FieldKind::Int16,
        ANGLE_CENTIDEGREES,
        "yaw angle, degrees x100",
    ),
    FieldDefinition::new(
        0x10,
        "board_temp_c",
        FieldKind::Int16,
        I16_FULL,
        "avionics board temperature, degrees Celsius",
    ),
    FieldDefinition::new(
        0x11,
        "latitude_deg",
        FieldKind::Float32,
        InputPolicy::Float,
        "GNSS latitude, decimal degrees",
    ),
    FieldDefinition::new(
        0x12,
        "longitude_deg",
        FieldKind::Float32,
        InputPolicy::Float,
        "GNSS longitude, decimal degrees",
    ),
    FieldDefinition::new(
        0x13,
        "rssi_dbm",
        FieldKind::Int16,
        I16_FULL,
        "uplink received signal strength, dBm",
    ),
    FieldDefinition::new(
        0x14,
        "pyro_status",
        FieldKind::Bitfield8,
        U8_FULL,
        "bit0..3=channel continuity bit4..7=channel fired",
    ),
    FieldDefinition::new(
        0x15,
        "packet_count",
        FieldKind::Uint16,
        U16_FULL,
        "frames transmitted since boot, wraps",
    ),
    FieldDefinition::new(
        0x16,
        "mission_time_s",
        FieldKind::Uint32,
        InputPolicy::ClampU32,
        "seconds since arming",
    ),
    FieldDefinition::new(
        0x17,
        "gnss_fix",
        FieldKind::Enum8,
        InputPolicy::Range { min: 0, max: 5 },
        "0=none 1=dead-reckoning 2=2d 3=3d 4=gnss+dr 5=time-only",
    ),
    FieldDefinition::new(
        0x18,
        "tank_pressure_bar",
        FieldKind::Uint16,
        InputPolicy::ScaledU16 { scale: 100 },
        "oxidiser tank pressure, bar x100",
    ),
    FieldDefinition::new(
        0x19,
        "chamber_pressure_bar",
        FieldKind::Uint16,
        InputPolicy::ScaledU16 { scale: 10 },
        "combustion chamber pressure, bar x10",
    ),
];

static COMMAND_DEFINITIONS: [CommandDefinition; 11] = [
    CommandDefinition { id: 0x10, key: "ARM" },
    CommandDefinition {
        id: 0x11,
        key: "DISARM",
    },
    CommandDefinition {
        id: 0x20,
        key: "CALIBRATE",
    },
    CommandDefinition {
        id: 0x30,
        key: "PING",
    },
    CommandDefinition {
        id: 0x40,
        key: "RESET",
    },
    CommandDefinition {
        id: 0x50,
        key: "START_LOGGING",
    },
    CommandDefinition {
        id: 0x51,
        key: "STOP_LOGGING",
    },
    CommandDefinition {
        id: 0x70,
        key: "LAUNCH",
    },
    CommandDefinition {
        id: 0x7F,
        key: "ABORT",
    },
    CommandDefinition {
        id: 0x80,
        key: "DEPLOY_DROGUE",
    },
    CommandDefinition {
        id: 0x81,
        key: "DEPLOY_MAIN",
    },
];

/// Field definitions keyed by ArgID.
static FIELDS_BY_ID: LazyLock<HashMap<u8, &'static FieldDefinition>> = LazyLock::new(|| {
    FIELD_DEFINITIONS
        .iter()
        .map(|definition| (definition.id, definition))
        .collect()
});

/// Field definitions keyed by registry key.
static FIELDS_BY_KEY: LazyLock<HashMap<&'static str, &'static FieldDefinition>> =
    LazyLock::new(|| {
        FIELD_DEFINITIONS
            .iter()
            .map(|definition| (definition.key, definition))
            .collect()
    });

static COMMANDS_BY_ID: LazyLock<HashMap<u8, &'static CommandDefinition>> = LazyLock::new(|| {
    COMMAND_DEFINITIONS
        .iter()
        .map(|definition| (definition.id, definition))
        .collect()
});

/// Looks up a telemetry field by ArgID.
///
/// ```
/// let millis = avlink::field_definition(0x01).expect("0x01 is registered");
/// assert_eq!("millis", millis.key());
/// assert_eq!(4, millis.byte_width());
/// ```
#[must_use]
pub fn field_definition(id: u8) -> Option<&'static FieldDefinition> {
    FIELDS_BY_ID.get(&id).copied()
}

/// Looks up a telemetry field by registry key.
#[must_use]
pub fn field_definition_by_key(key: &str) -> Option<&'static FieldDefinition> {
    FIELDS_BY_KEY.get(key).copied()
}

/// Returns all telemetry fields in ArgID order.
#[must_use]
pub fn field_definitions() -> &'static [FieldDefinition] {
    &FIELD_DEFINITIONS
}

/// Looks up a command by CommandID.
///
/// ```
/// let launch = avlink::command_definition(0x70).expect("0x70 is registered");
/// assert_eq!("LAUNCH", launch.key());
/// ```
#[must_use]
pub fn command_definition(id: u8) -> Option<&'static CommandDefinition> {
    COMMANDS_BY_ID.get(&id).copied()
}

/// Returns all commands in CommandID order.
#[must_use]
pub fn command_definitions() -> &'static [CommandDefinition] {
    &COMMAND_DEFINITIONS
}

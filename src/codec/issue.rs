use thiserror::Error;

/// An anomaly observed while parsing a frame.
///
/// The parser files each issue as either an error or a warning; the
/// `Display` text is what callers see in those lists.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FrameIssue {
    /// Fewer bytes than the smallest possible envelope.
    #[error("frame too short: need at least {minimum} bytes, got {actual}")]
    TooShort { minimum: usize, actual: usize },
    #[error("bad start marker 0x{actual:02X} (expected 0xFD)")]
    BadStartMarker { actual: u8 },
    /// The length field declares more bytes than the buffer holds.
    #[error("frame truncated: length field requires {required} bytes, got {actual}")]
    Truncated { required: usize, actual: usize },
    /// The length field cannot cover header, sequence and CRC.
    #[error("length field {declared} is below the minimum of {minimum}")]
    LengthTooSmall { declared: u8, minimum: usize },
    #[error("CRC mismatch: received 0x{received:04X}, computed 0x{computed:04X}")]
    CrcMismatch { received: u16, computed: u16 },
    #[error("invalid end marker 0x{actual:02X} (expected 0xFE)")]
    BadEndMarker { actual: u8 },
    /// Older interface documents list `0xF1` as the end marker.
    #[error("end marker 0xF1 is the legacy value; expected 0xFE")]
    LegacyEndMarker,
    /// The TLV walk ended before consuming the whole payload.
    #[error(
        "TLV decoding stopped at payload offset {payload_offset} (frame offset {frame_offset}) on byte 0x{byte:02X}; {remaining} byte(s) not decoded"
    )]
    TlvStopped {
        payload_offset: usize,
        frame_offset: usize,
        byte: u8,
        remaining: usize,
    },
    #[error("no command ID byte")]
    MissingCommandId,
    #[error("{count} extra byte(s) after the command ID")]
    ExtraCommandBytes { count: usize },
    /// Header type bits `01`/`10` have no defined payload layout.
    ///
    /// Filed as a warning: the envelope still verifies and `ok` is unaffected,
    /// but the body is [`FrameBody::Undecoded`](super::FrameBody::Undecoded).
    #[error("header type bits 0b{bits:02b} are undefined; payload left undecoded")]
    UndefinedHeaderType { bits: u8 },
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn crc_mismatch_reports_both_values_in_hex() {
        let issue = FrameIssue::CrcMismatch {
            received: 0x1234,
            computed: 0xABCD,
        };
        assert_snapshot!(issue.to_string(), @"CRC mismatch: received 0x1234, computed 0xABCD");
    }

    #[test]
    fn tlv_stop_names_offset_and_byte() {
        let issue = FrameIssue::TlvStopped {
            payload_offset: 2,
            frame_offset: 7,
            byte: 0xEE,
            remaining: 3,
        };
        assert_snapshot!(
            issue.to_string(),
            @"TLV decoding stopped at payload offset 2 (frame offset 7) on byte 0xEE; 3 byte(s) not decoded"
        );
    }

    #[test]
    fn undefined_header_type_names_the_bits() {
        let issue = FrameIssue::UndefinedHeaderType { bits: 0b10 };
        assert_snapshot!(
            issue.to_string(),
            @"header type bits 0b10 are undefined; payload left undecoded"
        );
    }

    #[test]
    fn truncation_reports_required_and_actual() {
        let issue = FrameIssue::Truncated {
            required: 12,
            actual: 9,
        };
        assert_snapshot!(
            issue.to_string(),
            @"frame truncated: length field requires 12 bytes, got 9"
        );
    }
}

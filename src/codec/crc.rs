const CRC16_INIT: u16 = 0xFFFF;
const CRC16_POLY_REFLECTED: u16 = 0xA001;

/// Computes the Modbus-variant CRC-16 of `bytes`.
///
/// ```
/// assert_eq!(0x4B37, avlink::codec::crc16(b"123456789"));
/// assert_eq!(0xFFFF, avlink::codec::crc16(&[]));
/// ```
#[must_use]
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;
    for &byte in bytes {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ CRC16_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::check_string(b"123456789".as_slice(), 0x4B37)]
    #[case::modbus_read_request([0x01, 0x03, 0x00, 0x00, 0x00, 0x0A].as_slice(), 0xCDC5)]
    #[case::empty([].as_slice(), 0xFFFF)]
    fn crc16_matches_reference_vectors(#[case] input: &[u8], #[case] expected: u16) {
        assert_eq!(expected, crc16(input));
    }

    #[test]
    fn crc16_detects_single_bit_flips() {
        let original = [0x00, 0x00, 0x01, 0x01, 0x40, 0xE2, 0x01, 0x00];
        let reference = crc16(&original);
        for index in 0..original.len() {
            for bit in 0..8 {
                let mut flipped = original;
                flipped[index] ^= 1 << bit;
                assert_ne!(reference, crc16(&flipped), "byte {index} bit {bit}");
            }
        }
    }
}

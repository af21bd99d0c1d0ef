//! Payload parsing utilities for the meter protocol.
//!
//! Every reply carries exactly four payload bytes; these functions give
//! them meaning. Multi-byte integers are little-endian.

use crate::protocol::frame::Payload;
use crate::types::{MeasurementType, ProjectCode, SerialNumber};

/// Reads a little-endian u16 from bytes 0..2.
const fn le_u16(p: &Payload) -> u16 {
    u16::from_le_bytes([p[0], p[1]])
}

/// Builds the request payload addressing a record slot.
///
/// Format: `[index:2LE] [0] [0]`
#[must_use]
pub const fn encode_index_payload(index: u16) -> Payload {
    let [lo, hi] = index.to_le_bytes();
    [lo, hi, 0, 0]
}

/// Parses the number of stored readings.
#[must_use]
pub const fn parse_stored_count(p: &Payload) -> u16 {
    le_u16(p)
}

/// Parses the project code.
#[must_use]
pub const fn parse_project_code(p: &Payload) -> ProjectCode {
    ProjectCode(le_u16(p))
}

/// Parses the value half of a stored record.
///
/// Format: `[value:2LE] [?] [tt?? ????]` where `tt` is the measurement type.
#[must_use]
pub const fn parse_record_value(p: &Payload) -> (u16, MeasurementType) {
    (le_u16(p), MeasurementType::from_bits(p[3] >> 6))
}

/// Parses the serial number from its high and low halves.
#[must_use]
pub fn parse_serial_number(high: &Payload, low: &Payload) -> SerialNumber {
    SerialNumber::from_halves(high, low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_index_payload() {
        assert_eq!(encode_index_payload(0), [0, 0, 0, 0]);
        assert_eq!(encode_index_payload(0x0102), [0x02, 0x01, 0, 0]);
        assert_eq!(encode_index_payload(u16::MAX), [0xFF, 0xFF, 0, 0]);
    }

    #[test]
    fn test_parse_stored_count() {
        assert_eq!(parse_stored_count(&[0x2C, 0x01, 0xAA, 0xBB]), 300);
    }

    #[test]
    fn test_parse_record_value() {
        assert_eq!(
            parse_record_value(&[0x7B, 0x00, 0x00, 0x40]),
            (123, MeasurementType::BeforeMeal)
        );
        assert_eq!(
            parse_record_value(&[0x2C, 0x01, 0xFF, 0x80 | 0x3F]),
            (300, MeasurementType::AfterMeal)
        );
        assert_eq!(
            parse_record_value(&[0x55, 0x00, 0x00, 0x00]),
            (85, MeasurementType::Normal)
        );
    }

    #[test]
    fn test_parse_serial_number() {
        let serial = parse_serial_number(&[0x12, 0x34, 0x56, 0x78], &[0x9A, 0xBC, 0xDE, 0xF0]);
        assert_eq!(serial.as_str(), "78563412f0debc9a");
    }

    #[test]
    fn test_parse_project_code() {
        assert_eq!(parse_project_code(&[0x79, 0x42, 0, 0]), ProjectCode(0x4279));
    }
}

//! Device information types.

use std::fmt;

use chrono::NaiveDateTime;

use crate::protocol::Payload;
use crate::types::reading::Reading;

/// Meter serial number, rendered as lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Builds the serial number from the high and low halves as received.
    ///
    /// Each half is sent least significant byte first.
    #[must_use]
    pub fn from_halves(high: &Payload, low: &Payload) -> Self {
        let reversed = |p: &Payload| [p[3], p[2], p[1], p[0]];
        Self(format!(
            "{}{}",
            hex::encode(reversed(high)),
            hex::encode(reversed(low))
        ))
    }

    /// Returns the serial number string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading four digits, which identify the meter model.
    #[must_use]
    pub fn model_prefix(&self) -> &str {
        &self.0[..self.0.len().min(4)]
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Model code reported by the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectCode(pub u16);

impl ProjectCode {
    /// Model name in the `TD-XXXX` form printed on the device.
    #[must_use]
    pub fn model_name(self) -> String {
        format!("TD-{:04X}", self.0)
    }
}

/// Measurement range settings, kept as the raw reply payload.
///
/// The field layout varies between meter models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSettings {
    /// Raw payload.
    pub raw: Payload,
}

/// Everything read from the meter in one session.
#[derive(Debug, Clone)]
pub struct MeterSnapshot {
    /// Serial number.
    pub serial: SerialNumber,
    /// Meter clock at the time of the read.
    pub clock: NaiveDateTime,
    /// Range settings.
    pub range: RangeSettings,
    /// Number of slots reported by the meter.
    pub stored_count: u16,
    /// Present readings in ascending index order.
    pub readings: Vec<Reading>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_number_from_halves() {
        let serial = SerialNumber::from_halves(&[0x12, 0x34, 0x56, 0x78], &[0x9A, 0xBC, 0xDE, 0xF0]);
        assert_eq!(serial.as_str(), "78563412f0debc9a");
        assert_eq!(serial.model_prefix(), "7856");
    }

    #[test]
    fn test_project_code_model_name() {
        assert_eq!(ProjectCode(0x4279).model_name(), "TD-4279");
    }
}

//! Command opcodes for the meter protocol.
//!
//! Every exchange is a single 8-byte frame in each direction. The opcode in
//! byte 1 selects the operation; the reply echoes it back.

use std::fmt;

/// Command byte of the unsolicited frame the meter sends after powering on.
pub const WAKEUP_CODE: u8 = 0x54;

/// Command opcodes sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandOpcode {
    /// Read the clock display settings.
    GetTimeSetting = 0x21,
    /// Read the system clock.
    GetSystemClock = 0x23,
    /// Read the project (model) code.
    ProjectCode = 0x24,
    /// Read the timestamp half of a stored record.
    StorageDataIndex1 = 0x25,
    /// Read the value half of a stored record.
    StorageDataIndex2 = 0x26,
    /// Read the low four bytes of the serial number.
    SerialNumberLow = 0x27,
    /// Read the high four bytes of the serial number.
    SerialNumberHigh = 0x28,
    /// Read the number of stored readings.
    StoredCount = 0x2B,
    /// Read the measurement range settings.
    GetRange = 0x2F,
    /// Write the clock display settings.
    SetTimeSetting = 0x31,
    /// Write the system clock.
    SetSystemClock = 0x33,
    /// Write the measurement range settings.
    SetRange = 0x3F,
    /// Put the meter to sleep.
    Sleep = 0x50,
    /// Erase all stored readings.
    ClearMemory = 0x52,
}

impl CommandOpcode {
    /// All opcodes, in ascending order.
    pub const ALL: [Self; 14] = [
        Self::GetTimeSetting,
        Self::GetSystemClock,
        Self::ProjectCode,
        Self::StorageDataIndex1,
        Self::StorageDataIndex2,
        Self::SerialNumberLow,
        Self::SerialNumberHigh,
        Self::StoredCount,
        Self::GetRange,
        Self::SetTimeSetting,
        Self::SetSystemClock,
        Self::SetRange,
        Self::Sleep,
        Self::ClearMemory,
    ];

    /// Returns the opcode for a raw command byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| *cmd as u8 == byte)
    }
}

impl From<CommandOpcode> for u8 {
    fn from(cmd: CommandOpcode) -> Self {
        cmd as Self
    }
}

impl fmt::Display for CommandOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:#04x})", self, *self as u8)
    }
}

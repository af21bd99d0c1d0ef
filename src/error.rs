//! Error types for the glucohid library.

use thiserror::Error;

use crate::protocol::CommandOpcode;

/// The main error type for glucohid operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The device never answered the command within the poll budget.
    #[error("no valid response for command {command}")]
    NoResponse { command: CommandOpcode },

    /// Writing a command frame to the transport failed.
    #[error("failed to write command {command}: {source}")]
    WriteFailed {
        command: CommandOpcode,
        #[source]
        source: Box<Error>,
    },

    /// The device kept waking up and never answered the command.
    #[error("command {command} preempted by {wakeups} wake-up frames")]
    WakeupLimit { command: CommandOpcode, wakeups: u32 },

    /// Error reported by the HID backend.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,

    /// A date-time cannot be represented in the device clock format.
    #[error("invalid date-time: {reason}")]
    InvalidDateTime { reason: String },

    /// Outbound data does not fit in a single HID report.
    #[error("report too large: {size} bytes exceeds maximum {max}")]
    ReportTooLarge { size: usize, max: usize },
}

/// Reasons an inbound frame is rejected.
///
/// These never escape the command engine: a rejected frame is dropped and
/// scanning continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than a whole frame.
    #[error("frame too short: need 8 bytes, got {0}")]
    TooShort(usize),

    /// First byte is not the start marker.
    #[error("bad start byte: {0:#04x}")]
    BadStart(u8),

    /// Command byte differs from the awaited command.
    #[error("unexpected command {got:#04x}, expected {expected:#04x}")]
    UnexpectedCommand { expected: u8, got: u8 },

    /// Byte 6 is not the acknowledge marker.
    #[error("bad terminator: {0:#04x}")]
    BadTerminator(u8),

    /// Checksum byte does not match the sum of the first seven bytes.
    #[error("checksum mismatch: computed {computed:#04x}, frame has {received:#04x}")]
    ChecksumMismatch { computed: u8, received: u8 },
}

/// Result type alias for glucohid operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Frame encoding and decoding for the meter protocol.
//!
//! Every command and every reply is exactly eight bytes:
//! ```text
//! ┌───────┬─────────┬───────────┬────────────┬──────────┐
//! │ 0x51  │ command │  payload  │ 0xA3/0xA5  │ checksum │
//! │ 1 byte│ 1 byte  │  4 bytes  │   1 byte   │  1 byte  │
//! └───────┴─────────┴───────────┴────────────┴──────────┘
//! ```
//! Commands end with the stop marker `0xA3`, replies with the acknowledge
//! marker `0xA5`. The checksum is the low byte of the sum of bytes 0..7.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::protocol::CommandOpcode;

/// Frame start byte.
pub const FRAME_START: u8 = 0x51;

/// Terminator of host-to-device frames.
pub const FRAME_STOP: u8 = 0xA3;

/// Terminator of device-to-host frames.
pub const FRAME_ACK: u8 = 0xA5;

/// Size of every frame.
pub const FRAME_SIZE: usize = 8;

/// Size of the payload carried by every frame.
pub const PAYLOAD_SIZE: usize = 4;

/// Offset of the command byte within a frame.
pub const COMMAND_OFFSET: usize = 1;

/// The four payload bytes of a frame.
pub type Payload = [u8; PAYLOAD_SIZE];

/// Low byte of the sum of the first seven bytes.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .take(FRAME_SIZE - 1)
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
}

fn build(command: u8, payload: Payload, terminator: u8) -> Bytes {
    let mut buf = BytesMut::with_capacity(FRAME_SIZE);
    buf.put_u8(FRAME_START);
    buf.put_u8(command);
    buf.put_slice(&payload);
    buf.put_u8(terminator);
    let sum = checksum(&buf);
    buf.put_u8(sum);
    buf.freeze()
}

/// Encodes a command frame.
///
/// A missing payload is sent as four zero bytes.
#[must_use]
pub fn encode(command: CommandOpcode, payload: Option<Payload>) -> Bytes {
    build(command.into(), payload.unwrap_or_default(), FRAME_STOP)
}

/// Encodes a frame the way the meter does, with the acknowledge terminator.
///
/// Useful for simulators and tests that play the device side.
#[must_use]
pub fn encode_ack(command: u8, payload: Payload) -> Bytes {
    build(command, payload, FRAME_ACK)
}

/// Validates an inbound frame and extracts its payload.
///
/// # Errors
///
/// Returns the first structural check that failed.
pub fn validate(expected: CommandOpcode, frame: &[u8]) -> Result<Payload, FrameError> {
    if frame.len() < FRAME_SIZE {
        return Err(FrameError::TooShort(frame.len()));
    }
    if frame[0] != FRAME_START {
        return Err(FrameError::BadStart(frame[0]));
    }
    if frame[COMMAND_OFFSET] != expected as u8 {
        return Err(FrameError::UnexpectedCommand {
            expected: expected.into(),
            got: frame[COMMAND_OFFSET],
        });
    }
    if frame[6] != FRAME_ACK {
        return Err(FrameError::BadTerminator(frame[6]));
    }
    let computed = checksum(frame);
    if computed != frame[7] {
        return Err(FrameError::ChecksumMismatch {
            computed,
            received: frame[7],
        });
    }

    let mut payload = [0u8; PAYLOAD_SIZE];
    payload.copy_from_slice(&frame[2..6]);
    Ok(payload)
}

/// Decodes a short reply frame, returning `None` if it is not a valid reply
/// to `expected`.
#[must_use]
pub fn decode_short_frame(expected: CommandOpcode, frame: &[u8]) -> Option<Payload> {
    validate(expected, frame).ok()
}

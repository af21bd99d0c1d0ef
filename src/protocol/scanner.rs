//! Resynchronising scanner over the inbound byte stream.
//!
//! The transport delivers bytes with no alignment to frame boundaries. The
//! scanner looks at the command byte of the frame-sized window at the head
//! of the buffer and either consumes a whole frame (wake-up or awaited
//! reply) or drops a single byte and tries again.

use bytes::{Buf, BytesMut};

use crate::protocol::command::WAKEUP_CODE;
use crate::protocol::frame::{self, COMMAND_OFFSET, FRAME_SIZE, Payload};
use crate::protocol::CommandOpcode;

/// Outcome of a scan step that found a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// The meter announced it just woke up.
    Wakeup,
    /// A valid reply to the awaited command.
    Response(Payload),
}

/// Append-only byte queue with frame scanning.
#[derive(Debug, Default)]
pub struct FrameScanner {
    buffer: BytesMut,
    discarded: u64,
    malformed: u64,
}

impl FrameScanner {
    /// Creates an empty scanner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            discarded: 0,
            malformed: 0,
        }
    }

    /// Appends received bytes.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Appends one received byte.
    pub fn push(&mut self, byte: u8) {
        self.buffer.extend_from_slice(&[byte]);
    }

    /// Scans for the next wake-up frame or reply to `awaited`.
    ///
    /// Returns `None` once fewer than [`FRAME_SIZE`] bytes remain buffered.
    pub fn scan(&mut self, awaited: CommandOpcode) -> Option<Scan> {
        while self.buffer.len() >= FRAME_SIZE {
            let command = self.buffer[COMMAND_OFFSET];

            if command == WAKEUP_CODE {
                tracing::trace!("RX: {}", hex::encode(&self.buffer[..FRAME_SIZE]));
                self.buffer.advance(FRAME_SIZE);
                tracing::debug!("wake-up frame received");
                return Some(Scan::Wakeup);
            }

            if command == awaited as u8 {
                let candidate = self.buffer.split_to(FRAME_SIZE);
                tracing::trace!("RX: {}", hex::encode(&candidate));
                match frame::validate(awaited, &candidate) {
                    Ok(payload) => return Some(Scan::Response(payload)),
                    Err(e) => {
                        self.malformed += 1;
                        tracing::warn!("dropping malformed {} reply: {}", awaited, e);
                        continue;
                    }
                }
            }

            self.buffer.advance(1);
            self.discarded += 1;
        }

        None
    }

    /// Returns the number of bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Total bytes dropped one at a time while resynchronising.
    #[must_use]
    pub const fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Total frame-aligned replies dropped for failing validation.
    #[must_use]
    pub const fn malformed(&self) -> u64 {
        self.malformed
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

//! Transport layer for meter communication.
//!
//! The driver needs two things from a transport: a way to write command
//! bytes, and a feed of inbound bytes. Writes go through the [`Transport`]
//! trait. Inbound bytes are pushed by the transport's receive callback into
//! a [`ByteFeed`] and drained by the command engine from the matching
//! [`ByteQueue`].

pub mod hid;
#[cfg(test)]
pub(crate) mod mock;

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::protocol::FrameScanner;

/// Trait for transport implementations.
pub trait Transport: Send {
    /// Prepares the link for command traffic. Called once per session.
    fn open(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Sends raw bytes to the device.
    fn write(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>>;
}

/// Producer side of the inbound byte queue.
///
/// Cloned into whatever callback receives data from the device.
#[derive(Debug, Clone)]
pub struct ByteFeed {
    tx: mpsc::UnboundedSender<u8>,
}

impl ByteFeed {
    /// Appends one received byte.
    ///
    /// Returns false once the driver side has been dropped.
    #[must_use]
    pub fn push(&self, byte: u8) -> bool {
        self.tx.send(byte).is_ok()
    }

    /// Appends received bytes in order.
    #[must_use]
    pub fn extend(&self, data: &[u8]) -> bool {
        data.iter().all(|&b| self.push(b))
    }

    /// Handles an inbound HID report.
    ///
    /// The bridge delivers one UART byte per report, in the first position.
    /// Empty reports are ignored.
    #[must_use]
    pub fn push_report(&self, report: &[u8]) -> bool {
        match report.first() {
            Some(&byte) => self.push(byte),
            None => true,
        }
    }
}

/// Consumer side of the inbound byte queue, owned by the command engine.
#[derive(Debug)]
pub struct ByteQueue {
    rx: mpsc::UnboundedReceiver<u8>,
}

impl ByteQueue {
    /// Moves every byte received so far into the scanner.
    ///
    /// Returns the number of bytes moved.
    pub fn drain_into(&mut self, scanner: &mut FrameScanner) -> usize {
        let mut moved = 0;
        while let Ok(byte) = self.rx.try_recv() {
            scanner.push(byte);
            moved += 1;
        }
        moved
    }
}

/// Creates a connected feed/queue pair.
#[must_use]
pub fn byte_channel() -> (ByteFeed, ByteQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ByteFeed { tx }, ByteQueue { rx })
}

pub use hid::{HidConfig, HidDevice, HidUartTransport};

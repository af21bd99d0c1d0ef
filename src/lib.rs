//! # glucohid
//!
//! A Rust driver for glucose meters that tunnel a serial protocol through a
//! USB HID UART bridge.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Resynchronising frame scanner that tolerates misaligned input
//! - Transparent resend when the meter announces it woke up
//! - Decoders for serial number, clock and stored readings
//!
//! ## Quick Start
//!
//! ```no_run
//! use bytes::Bytes;
//! use futures::future::BoxFuture;
//! use glucohid::{HidDevice, Meter};
//!
//! struct MyHidDevice;
//!
//! impl HidDevice for MyHidDevice {
//!     fn send_report(&mut self, _id: u8, _data: Bytes) -> BoxFuture<'_, glucohid::Result<()>> {
//!         Box::pin(async { Ok(()) })
//!     }
//!
//!     fn send_feature_report(&mut self, _id: u8, _data: Bytes) -> BoxFuture<'_, glucohid::Result<()>> {
//!         Box::pin(async { Ok(()) })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), glucohid::Error> {
//!     // Hand `feed` to the HID input report callback.
//!     let (mut meter, feed) = Meter::hid(MyHidDevice);
//!     # drop(feed);
//!
//!     let snapshot = meter.sync().await?;
//!     println!("Serial: {}", snapshot.serial);
//!     for reading in &snapshot.readings {
//!         println!("{} {} mg/dL", reading.timestamp, reading.value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`protocol`] - Frame codec, byte stream scanner, payload decoders
//! - [`transport`] - Transport trait, inbound byte queue, HID bridge
//! - [`commands`] - Request/response engine and device commands
//! - [`types`] - Readings and device information
//! - [`client`] - High-level [`Meter`] session

pub mod client;
pub mod commands;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::Meter;
pub use commands::{CommandConfig, CommandHandler};
pub use error::{Error, FrameError, Result};
pub use protocol::{CommandOpcode, FrameScanner, Payload, Scan};
pub use transport::{
    ByteFeed, ByteQueue, HidConfig, HidDevice, HidUartTransport, Transport, byte_channel,
};
pub use types::{
    MeasurementType, MeterSnapshot, ProjectCode, RangeSettings, Reading, SerialNumber,
};

//! Command handlers for meter operations.
//!
//! This module provides the request/response engine and the high-level
//! commands built on it. Exactly one command is in flight at a time, which
//! `&mut self` on every operation enforces.

use std::time::Duration;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::protocol::{
    CommandOpcode, FrameScanner, Payload, Scan, decode_record_timestamp, decode_system_clock,
    encode_frame, encode_index_payload, encode_system_clock, is_empty_record, parse_project_code,
    parse_record_value, parse_serial_number, parse_stored_count,
};
use crate::transport::{ByteQueue, Transport};
use crate::types::{ProjectCode, RangeSettings, Reading, SerialNumber};

/// Default number of polls before a command gives up.
pub const DEFAULT_POLL_RETRIES: u32 = 200;

/// Default delay between polls that found no frame.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default delay between a wake-up frame and the resend.
pub const DEFAULT_WAKEUP_SETTLE: Duration = Duration::from_millis(20);

/// Default number of wake-up frames tolerated per command.
pub const DEFAULT_MAX_WAKEUPS: u32 = 8;

/// Timing and retry configuration for the command engine.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// Polls per attempt before failing with [`Error::NoResponse`].
    pub poll_retries: u32,
    /// Sleep between empty polls.
    pub poll_interval: Duration,
    /// Sleep after a wake-up frame before resending.
    pub wakeup_settle: Duration,
    /// Wake-up frames tolerated per command; `None` for no limit.
    pub max_wakeups: Option<u32>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            poll_retries: DEFAULT_POLL_RETRIES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wakeup_settle: DEFAULT_WAKEUP_SETTLE,
            max_wakeups: Some(DEFAULT_MAX_WAKEUPS),
        }
    }
}

impl CommandConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll budget per attempt.
    #[must_use]
    pub const fn poll_retries(mut self, retries: u32) -> Self {
        self.poll_retries = retries;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the wake-up settle delay.
    #[must_use]
    pub const fn wakeup_settle(mut self, settle: Duration) -> Self {
        self.wakeup_settle = settle;
        self
    }

    /// Sets the wake-up limit.
    #[must_use]
    pub const fn max_wakeups(mut self, max: Option<u32>) -> Self {
        self.max_wakeups = max;
        self
    }

    /// Longest time a single attempt waits for its reply.
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        self.poll_interval * self.poll_retries
    }
}

/// Command handler for meter operations.
pub struct CommandHandler<T> {
    transport: T,
    queue: ByteQueue,
    scanner: FrameScanner,
    config: CommandConfig,
}

impl<T: Transport> CommandHandler<T> {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(transport: T, queue: ByteQueue) -> Self {
        Self::with_config(transport, queue, CommandConfig::default())
    }

    /// Creates a new command handler with custom timing.
    #[must_use]
    pub fn with_config(transport: T, queue: ByteQueue, config: CommandConfig) -> Self {
        Self {
            transport,
            queue,
            scanner: FrameScanner::new(),
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &CommandConfig {
        &self.config
    }

    /// Replaces the engine configuration.
    pub fn set_config(&mut self, config: CommandConfig) {
        self.config = config;
    }

    /// Returns the frame scanner.
    #[must_use]
    pub const fn scanner(&self) -> &FrameScanner {
        &self.scanner
    }

    /// Returns the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    async fn send(&mut self, command: CommandOpcode, payload: Option<Payload>) -> Result<()> {
        let frame = encode_frame(command, payload);
        tracing::trace!("TX {}: {}", command, hex::encode(&frame));
        self.transport
            .write(frame)
            .await
            .map_err(|e| Error::WriteFailed {
                command,
                source: Box::new(e),
            })
    }

    /// Polls for a wake-up frame or a reply to `command`.
    async fn receive(&mut self, command: CommandOpcode) -> Result<Scan> {
        for _ in 0..self.config.poll_retries {
            self.queue.drain_into(&mut self.scanner);
            if let Some(scan) = self.scanner.scan(command) {
                return Ok(scan);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }

        tracing::debug!(
            "no reply to {} after {} polls, {} bytes left buffered",
            command,
            self.config.poll_retries,
            self.scanner.buffered()
        );
        Err(Error::NoResponse { command })
    }

    /// Sends a command and waits for its reply payload.
    ///
    /// A wake-up frame means the meter could not have seen the command, so
    /// the same frame is sent again after a short settle delay.
    pub async fn execute(
        &mut self,
        command: CommandOpcode,
        payload: Option<Payload>,
    ) -> Result<Payload> {
        let mut wakeups = 0u32;

        loop {
            self.send(command, payload).await?;

            match self.receive(command).await? {
                Scan::Response(reply) => return Ok(reply),
                Scan::Wakeup => {
                    wakeups += 1;
                    if self.config.max_wakeups.is_some_and(|max| wakeups > max) {
                        return Err(Error::WakeupLimit { command, wakeups });
                    }
                    tracing::debug!("device woke up, retrying {}", command);
                    tokio::time::sleep(self.config.wakeup_settle).await;
                }
            }
        }
    }

    // ==================== Device Commands ====================

    /// Reads the serial number (high half first).
    pub async fn get_serial_number(&mut self) -> Result<SerialNumber> {
        let high = self.execute(CommandOpcode::SerialNumberHigh, None).await?;
        let low = self.execute(CommandOpcode::SerialNumberLow, None).await?;
        Ok(parse_serial_number(&high, &low))
    }

    /// Reads the model code.
    pub async fn get_project_code(&mut self) -> Result<ProjectCode> {
        let reply = self.execute(CommandOpcode::ProjectCode, None).await?;
        Ok(parse_project_code(&reply))
    }

    /// Reads the meter clock.
    pub async fn get_clock(&mut self) -> Result<NaiveDateTime> {
        let reply = self.execute(CommandOpcode::GetSystemClock, None).await?;
        decode_system_clock(&reply)
    }

    /// Sets the meter clock. Seconds are dropped.
    pub async fn set_clock(&mut self, dt: &NaiveDateTime) -> Result<()> {
        let payload = encode_system_clock(dt)?;
        self.execute(CommandOpcode::SetSystemClock, Some(payload))
            .await?;
        Ok(())
    }

    /// Reads the measurement range settings.
    pub async fn get_range_settings(&mut self) -> Result<RangeSettings> {
        let raw = self.execute(CommandOpcode::GetRange, None).await?;
        Ok(RangeSettings { raw })
    }

    /// Puts the meter to sleep.
    pub async fn sleep(&mut self) -> Result<()> {
        self.execute(CommandOpcode::Sleep, None).await?;
        Ok(())
    }

    /// Erases every stored reading.
    pub async fn clear_memory(&mut self) -> Result<()> {
        tracing::info!("clearing meter memory");
        self.execute(CommandOpcode::ClearMemory, None).await?;
        Ok(())
    }

    // ==================== Stored Readings ====================

    /// Reads the number of stored reading slots.
    pub async fn get_stored_count(&mut self) -> Result<u16> {
        let reply = self.execute(CommandOpcode::StoredCount, None).await?;
        Ok(parse_stored_count(&reply))
    }

    /// Reads one stored reading.
    ///
    /// Returns `Ok(None)` for an empty slot without issuing the second
    /// request.
    pub async fn get_record(&mut self, index: u16) -> Result<Option<Reading>> {
        tracing::debug!("reading record index {}", index);
        let request = encode_index_payload(index);

        let stamp = self
            .execute(CommandOpcode::StorageDataIndex1, Some(request))
            .await?;
        if is_empty_record(&stamp) {
            tracing::debug!("record index {} is empty", index);
            return Ok(None);
        }
        let timestamp = decode_record_timestamp(&stamp)?;

        let value = self
            .execute(CommandOpcode::StorageDataIndex2, Some(request))
            .await?;
        let (value, measurement_type) = parse_record_value(&value);

        Ok(Some(Reading {
            index,
            timestamp,
            value,
            measurement_type,
        }))
    }

    /// Reads slots `0..count` one after another, keeping the present ones.
    pub async fn get_readings(&mut self, count: u16) -> Result<Vec<Reading>> {
        let mut readings = Vec::with_capacity(usize::from(count));
        for index in 0..count {
            if let Some(reading) = self.get_record(index).await? {
                readings.push(reading);
            }
        }
        tracing::info!("read {} of {} stored records", readings.len(), count);
        Ok(readings)
    }
}

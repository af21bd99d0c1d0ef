//! Main [`Meter`] client implementation.
//!
//! This module provides the high-level [`Meter`] session that combines the
//! transport, the inbound byte queue and the command engine.

use chrono::NaiveDateTime;

use crate::commands::{CommandConfig, CommandHandler};
use crate::error::{Error, Result};
use crate::protocol::{CommandOpcode, Payload};
use crate::transport::{
    ByteFeed, ByteQueue, HidConfig, HidDevice, HidUartTransport, Transport, byte_channel,
};
use crate::types::{MeterSnapshot, ProjectCode, RangeSettings, Reading, SerialNumber};

/// Session with one glucose meter.
pub struct Meter<T> {
    commands: CommandHandler<T>,
    connected: bool,
}

impl<D: HidDevice> Meter<HidUartTransport<D>> {
    /// Creates a session over a HID UART bridge.
    ///
    /// The returned [`ByteFeed`] must receive every inbound HID report via
    /// [`ByteFeed::push_report`].
    #[must_use]
    pub fn hid(device: D) -> (Self, ByteFeed) {
        Self::with_hid_config(device, HidConfig::default())
    }

    /// Creates a session over a HID UART bridge with custom configuration.
    #[must_use]
    pub fn with_hid_config(device: D, config: HidConfig) -> (Self, ByteFeed) {
        Self::new(HidUartTransport::new(device, config))
    }
}

impl<T: Transport> Meter<T> {
    /// Creates a session over any transport.
    #[must_use]
    pub fn new(transport: T) -> (Self, ByteFeed) {
        Self::with_config(transport, CommandConfig::default())
    }

    /// Creates a session with custom engine timing.
    #[must_use]
    pub fn with_config(transport: T, config: CommandConfig) -> (Self, ByteFeed) {
        let (feed, queue) = byte_channel();
        (Self::from_parts(transport, queue, config), feed)
    }

    /// Creates a session from a queue whose feed is already wired into the
    /// transport's receive path.
    #[must_use]
    pub fn from_parts(transport: T, queue: ByteQueue, config: CommandConfig) -> Self {
        Self {
            commands: CommandHandler::with_config(transport, queue, config),
            connected: false,
        }
    }

    /// Opens the transport. Must be called before any other command.
    pub async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }
        self.commands.transport_mut().open().await?;
        self.connected = true;
        tracing::info!("meter session open");
        Ok(())
    }

    /// Returns true after a successful [`Meter::connect`].
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    fn commands(&mut self) -> Result<&mut CommandHandler<T>> {
        if self.connected {
            Ok(&mut self.commands)
        } else {
            Err(Error::NotConnected)
        }
    }

    /// Sends a raw command and returns the reply payload.
    pub async fn execute(
        &mut self,
        command: CommandOpcode,
        payload: Option<Payload>,
    ) -> Result<Payload> {
        self.commands()?.execute(command, payload).await
    }

    /// Reads the serial number.
    pub async fn serial_number(&mut self) -> Result<SerialNumber> {
        self.commands()?.get_serial_number().await
    }

    /// Reads the model code.
    pub async fn project_code(&mut self) -> Result<ProjectCode> {
        self.commands()?.get_project_code().await
    }

    /// Reads the meter clock.
    pub async fn clock(&mut self) -> Result<NaiveDateTime> {
        self.commands()?.get_clock().await
    }

    /// Sets the meter clock.
    pub async fn set_clock(&mut self, dt: &NaiveDateTime) -> Result<()> {
        self.commands()?.set_clock(dt).await
    }

    /// Reads the range settings.
    pub async fn range_settings(&mut self) -> Result<RangeSettings> {
        self.commands()?.get_range_settings().await
    }

    /// Reads the number of stored reading slots.
    pub async fn stored_count(&mut self) -> Result<u16> {
        self.commands()?.get_stored_count().await
    }

    /// Reads one stored reading, `None` for an empty slot.
    pub async fn reading(&mut self, index: u16) -> Result<Option<Reading>> {
        self.commands()?.get_record(index).await
    }

    /// Reads every present reading in ascending index order.
    pub async fn readings(&mut self) -> Result<Vec<Reading>> {
        let commands = self.commands()?;
        let count = commands.get_stored_count().await?;
        commands.get_readings(count).await
    }

    /// Puts the meter to sleep.
    pub async fn sleep(&mut self) -> Result<()> {
        self.commands()?.sleep().await
    }

    /// Erases every stored reading.
    pub async fn clear_memory(&mut self) -> Result<()> {
        self.commands()?.clear_memory().await
    }

    /// Connects if needed and reads identity, clock, settings and archive.
    pub async fn sync(&mut self) -> Result<MeterSnapshot> {
        self.connect().await?;
        let commands = self.commands()?;

        tracing::debug!("reading serial number");
        let serial = commands.get_serial_number().await?;
        tracing::debug!("reading device time");
        let clock = commands.get_clock().await?;
        tracing::debug!("reading measurement range settings");
        let range = commands.get_range_settings().await?;
        tracing::debug!("reading stored data count");
        let stored_count = commands.get_stored_count().await?;
        let readings = commands.get_readings(stored_count).await?;

        tracing::info!(
            "synced meter {} ({} readings)",
            serial,
            readings.len()
        );

        Ok(MeterSnapshot {
            serial,
            clock,
            range,
            stored_count,
            readings,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use chrono::NaiveDate;

    use super::*;
    use crate::protocol::{FRAME_ACK, decode_short_frame, encode_ack, encode_system_clock};
    use crate::transport::mock::MockTransport;
    use crate::types::MeasurementType;

    fn when(d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    /// Plays a meter holding three slots, the middle one empty.
    fn meter_responder(request: &[u8]) -> Vec<u8> {
        let cmd = request[1];
        let index = u16::from_le_bytes([request[2], request[3]]);
        let clock = encode_system_clock(&when(15, 14, 37)).unwrap();

        let payload = match CommandOpcode::from_byte(cmd) {
            Some(CommandOpcode::SerialNumberHigh) => [0x12, 0x34, 0x56, 0x78],
            Some(CommandOpcode::SerialNumberLow) => [0x9A, 0xBC, 0xDE, 0xF0],
            Some(CommandOpcode::GetSystemClock) => clock,
            Some(CommandOpcode::GetRange) => [0x46, 0x00, 0xB4, 0x00],
            Some(CommandOpcode::StoredCount) => [3, 0, 0, 0],
            Some(CommandOpcode::StorageDataIndex1) if index == 1 => [0, 0, 0, 0],
            Some(CommandOpcode::StorageDataIndex1) => {
                encode_system_clock(&when(10 + u32::from(index), 8, 0)).unwrap()
            }
            Some(CommandOpcode::StorageDataIndex2) => {
                [100 + index as u8, 0, 0, (index as u8 & 0x03) << 6]
            }
            _ => return Vec::new(),
        };
        encode_ack(cmd, payload).to_vec()
    }

    type Writes = Arc<Mutex<Vec<Bytes>>>;
    type Opens = Arc<Mutex<usize>>;

    fn session() -> (Meter<MockTransport>, Writes, Opens) {
        let (feed, queue) = byte_channel();
        let transport = MockTransport::new(feed, meter_responder);
        let writes = transport.writes();
        let opens = transport.opens();
        let meter = Meter::from_parts(transport, queue, CommandConfig::default());
        (meter, writes, opens)
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_require_connect() {
        let (mut meter, writes, _) = session();

        assert!(!meter.is_connected());
        assert!(matches!(meter.stored_count().await, Err(Error::NotConnected)));
        assert!(writes.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_opens_transport_once() {
        let (mut meter, _, opens) = session();

        meter.connect().await.unwrap();
        meter.connect().await.unwrap();

        assert!(meter.is_connected());
        assert_eq!(*opens.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_skips_empty_slot() {
        let (mut meter, _, opens) = session();

        let snapshot = meter.sync().await.unwrap();

        assert_eq!(*opens.lock().unwrap(), 1);
        assert_eq!(snapshot.serial.as_str(), "78563412f0debc9a");
        assert_eq!(snapshot.clock, when(15, 14, 37));
        assert_eq!(snapshot.range.raw, [0x46, 0x00, 0xB4, 0x00]);
        assert_eq!(snapshot.stored_count, 3);

        let indices: Vec<u16> = snapshot.readings.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);

        let first = &snapshot.readings[0];
        assert_eq!(first.value, 100);
        assert_eq!(first.measurement_type, MeasurementType::Normal);
        assert_eq!(first.timestamp, when(10, 8, 0));

        let last = &snapshot.readings[1];
        assert_eq!(last.value, 102);
        assert_eq!(last.measurement_type, MeasurementType::AfterMeal);
        assert_eq!(last.timestamp, when(12, 8, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_readings_issue_one_request_for_empty_slot() {
        let (mut meter, writes, _) = session();
        meter.connect().await.unwrap();

        let readings = meter.readings().await.unwrap();

        assert_eq!(readings.len(), 2);
        let commands: Vec<u8> = writes.lock().unwrap().iter().map(|w| w[1]).collect();
        assert_eq!(commands, vec![0x2B, 0x25, 0x26, 0x25, 0x25, 0x26]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hid_session_wraps_frames_in_reports() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use futures::future::BoxFuture;

        struct CountingDevice(Arc<AtomicUsize>);

        impl HidDevice for CountingDevice {
            fn send_report(&mut self, report_id: u8, data: Bytes) -> BoxFuture<'_, Result<()>> {
                assert_eq!(usize::from(report_id), data.len());
                self.0.fetch_add(1, Ordering::SeqCst);
                Box::pin(async { Ok(()) })
            }

            fn send_feature_report(&mut self, _: u8, _: Bytes) -> BoxFuture<'_, Result<()>> {
                Box::pin(async { Ok(()) })
            }
        }

        let reports = Arc::new(AtomicUsize::new(0));
        let (mut meter, feed) = Meter::hid(CountingDevice(Arc::clone(&reports)));
        meter.connect().await.unwrap();

        for byte in encode_ack(CommandOpcode::ProjectCode.into(), [0x79, 0x42, 0, 0]) {
            assert!(feed.push_report(&[byte, 0x00]));
        }
        let code = meter.project_code().await.unwrap();

        assert_eq!(code.model_name(), "TD-4279");
        assert_eq!(reports.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_responder_replies_are_valid_frames() {
        let request = crate::protocol::encode_frame(CommandOpcode::StoredCount, None);
        let reply = meter_responder(&request);
        assert_eq!(reply[6], FRAME_ACK);
        assert_eq!(
            decode_short_frame(CommandOpcode::StoredCount, &reply),
            Some([3, 0, 0, 0])
        );
    }
}

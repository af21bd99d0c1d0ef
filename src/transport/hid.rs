//! HID-to-UART bridge transport.
//!
//! The meter sits behind a USB HID bridge chip that carries UART bytes in
//! HID reports. Output reports use the payload length as the report id.
//! The UART must be switched on with a feature report before any traffic.

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::transport::Transport;

/// USB vendor id of the bridge chip.
pub const DEFAULT_VENDOR_ID: u16 = 0x10C4;

/// USB product id of the bridge chip.
pub const DEFAULT_PRODUCT_ID: u16 = 0xEA80;

/// Feature report id that configures the UART.
pub const UART_ENABLE_REPORT: u8 = 0x41;

/// Largest UART payload that fits in one output report.
pub const MAX_REPORT_PAYLOAD: usize = 63;

/// Raw HID device operations, implemented by the HID backend in use.
pub trait HidDevice: Send {
    /// Sends an output report.
    fn send_report(&mut self, report_id: u8, data: Bytes) -> BoxFuture<'_, Result<()>>;

    /// Sends a feature report.
    fn send_feature_report(&mut self, report_id: u8, data: Bytes) -> BoxFuture<'_, Result<()>>;
}

/// Configuration for the HID bridge.
#[derive(Debug, Clone)]
pub struct HidConfig {
    /// USB vendor id to look for.
    pub vendor_id: u16,
    /// USB product id to look for.
    pub product_id: u16,
    /// Feature report id that enables the UART.
    pub uart_enable_report: u8,
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            uart_enable_report: UART_ENABLE_REPORT,
        }
    }
}

impl HidConfig {
    /// Creates a configuration with the default bridge ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the USB vendor and product ids.
    #[must_use]
    pub const fn ids(mut self, vendor_id: u16, product_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
        self
    }

    /// Sets the UART enable feature report id.
    #[must_use]
    pub const fn uart_enable_report(mut self, report_id: u8) -> Self {
        self.uart_enable_report = report_id;
        self
    }
}

/// Transport that tunnels UART bytes through HID reports.
pub struct HidUartTransport<D> {
    config: HidConfig,
    device: D,
    uart_enabled: bool,
}

impl<D: HidDevice> HidUartTransport<D> {
    /// Wraps an opened HID device.
    #[must_use]
    pub fn new(device: D, config: HidConfig) -> Self {
        Self {
            config,
            device,
            uart_enabled: false,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HidConfig {
        &self.config
    }

    /// Returns true once the UART enable report has been sent.
    #[must_use]
    pub const fn is_uart_enabled(&self) -> bool {
        self.uart_enabled
    }

    /// Returns the underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: HidDevice> Transport for HidUartTransport<D> {
    fn open(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.uart_enabled {
                return Ok(());
            }

            tracing::info!(
                "enabling UART via feature report {:#04x}",
                self.config.uart_enable_report
            );
            self.device
                .send_feature_report(self.config.uart_enable_report, Bytes::from_static(&[0x01]))
                .await?;
            self.uart_enabled = true;
            Ok(())
        })
    }

    fn write(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if data.len() > MAX_REPORT_PAYLOAD {
                return Err(Error::ReportTooLarge {
                    size: data.len(),
                    max: MAX_REPORT_PAYLOAD,
                });
            }

            tracing::trace!("TX: {}", hex::encode(&data));
            self.device.send_report(data.len() as u8, data).await
        })
    }
}

//! Data types for meter entities.
//!
//! - Device identity and settings
//! - Stored readings

pub mod device;
pub mod reading;

pub use device::{MeterSnapshot, ProjectCode, RangeSettings, SerialNumber};
pub use reading::{MeasurementType, Reading};

//! Stored glucose readings.

use std::fmt;

use chrono::NaiveDateTime;

/// Meal context recorded with a reading (top two bits of the value reply).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MeasurementType {
    /// General measurement.
    #[default]
    Normal,
    /// Taken before a meal.
    BeforeMeal,
    /// Taken after a meal.
    AfterMeal,
}

impl MeasurementType {
    /// Parses the 2-bit measurement tag.
    ///
    /// The reserved value `0b11` is read as [`MeasurementType::Normal`].
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => Self::BeforeMeal,
            2 => Self::AfterMeal,
            _ => Self::Normal,
        }
    }

    /// Encodes the tag into its 2-bit form.
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::BeforeMeal => 1,
            Self::AfterMeal => 2,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::BeforeMeal => "Before meal",
            Self::AfterMeal => "After meal",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A reading stored on the meter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Zero-based slot in the meter's memory.
    pub index: u16,
    /// When the measurement was taken (minute resolution).
    pub timestamp: NaiveDateTime,
    /// Glucose value in mg/dL.
    pub value: u16,
    /// Meal context.
    pub measurement_type: MeasurementType,
}

//! Bit-packed date-time codecs.
//!
//! The meter uses two four-byte date-time layouts. They share the day,
//! month and year fields but differ in bytes 2 and 3:
//!
//! ```text
//! byte 0: mmmd dddd   day (5 bits), month bits 0..2
//! byte 1: yyyy yyym   month bit 3, year - 2000 (7 bits)
//!
//! record timestamp       byte 2: f?mm mmmm   f = empty slot, minute (6 bits)
//!                        byte 3: hhhh hhhh   hour (whole byte)
//! system clock           byte 2: ??mm mmmm   minute (6 bits)
//!                        byte 3: ???h hhhh   hour (5 bits)
//! ```
//!
//! The two decoders are deliberately separate functions. Fields outside
//! their calendar range roll over into the next unit (hour 25 is 01:00 the
//! following day, day 0 is the last day of the previous month).

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Error, Result};
use crate::protocol::frame::Payload;

/// First year representable by the two-digit year field.
pub const BASE_YEAR: i32 = 2000;

/// Last year representable by the 7-bit year field.
pub const MAX_YEAR: i32 = BASE_YEAR + 0x7F;

/// Bit in byte 2 of a record timestamp marking an empty slot.
pub const RECORD_EMPTY_FLAG: u8 = 0x80;

struct Fields {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

fn date_fields(p: &Payload) -> (i32, u32, u32) {
    let year = BASE_YEAR + i32::from(p[1] >> 1);
    let month = u32::from(((p[1] & 0x01) << 3) | ((p[0] >> 5) & 0x07));
    let day = u32::from(p[0] & 0x1F);
    (year, month, day)
}

fn build(fields: &Fields, p: &Payload) -> Result<NaiveDateTime> {
    let invalid = || Error::InvalidDateTime {
        reason: format!("payload {} is out of range", hex::encode(p)),
    };

    let jan1 = NaiveDate::from_ymd_opt(fields.year, 1, 1).ok_or_else(invalid)?;
    let first = if fields.month == 0 {
        jan1.checked_sub_months(Months::new(1))
    } else {
        jan1.checked_add_months(Months::new(fields.month - 1))
    }
    .ok_or_else(invalid)?;

    let offset = Duration::days(i64::from(fields.day) - 1)
        + Duration::hours(i64::from(fields.hour))
        + Duration::minutes(i64::from(fields.minute));

    first
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.checked_add_signed(offset))
        .ok_or_else(invalid)
}

/// Returns true if a record timestamp payload denotes an empty slot.
#[must_use]
pub fn is_empty_record(p: &Payload) -> bool {
    *p == [0; 4] || p[2] & RECORD_EMPTY_FLAG != 0
}

/// Decodes the timestamp half of a stored record.
pub fn decode_record_timestamp(p: &Payload) -> Result<NaiveDateTime> {
    let (year, month, day) = date_fields(p);
    let fields = Fields {
        year,
        month,
        day,
        hour: u32::from(p[3]),
        minute: u32::from(p[2] & 0x3F),
    };
    build(&fields, p)
}

/// Decodes the system clock payload.
pub fn decode_system_clock(p: &Payload) -> Result<NaiveDateTime> {
    let (year, month, day) = date_fields(p);
    let fields = Fields {
        year,
        month,
        day,
        hour: u32::from(p[3] & 0x1F),
        minute: u32::from(p[2] & 0x3F),
    };
    build(&fields, p)
}

/// Encodes a date-time into the system clock payload, dropping seconds.
pub fn encode_system_clock(dt: &NaiveDateTime) -> Result<Payload> {
    let year = dt.year();
    let years = u8::try_from(year - BASE_YEAR)
        .ok()
        .filter(|years| *years <= 0x7F)
        .ok_or_else(|| Error::InvalidDateTime {
            reason: format!("year {year} outside {BASE_YEAR}..={MAX_YEAR}"),
        })?;

    let month = dt.month() as u8;
    let day = dt.day() as u8;

    Ok([
        ((month & 0x07) << 5) | (day & 0x1F),
        ((years & 0x7F) << 1) | ((month >> 3) & 0x01),
        dt.minute() as u8 & 0x3F,
        dt.hour() as u8 & 0x1F,
    ])
}

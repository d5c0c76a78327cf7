//! Mount clock
//!
//! The 8-byte time record of the NexStar `h`/`H` commands.
//!
//! ```text
//! ┌──────┬─────┬─────┬───────┬─────┬──────┬─────────┬─────┐
//! │ hour │ min │ sec │ month │ day │ yy   │ tz (i8) │ dst │
//! └──────┴─────┴─────┴───────┴─────┴──────┴─────────┴─────┘
//! ```
//!
//! `yy` counts from 2000. UTC = local − (tz + dst) hours.

use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveDate, Offset, TimeZone, Timelike, Utc};

use crate::error::{MountError, Result};

/// Bytes in a time record
pub const CLOCK_BYTES: usize = 8;

/// Largest accepted difference between a client's clock and ours
pub const CLOCK_SKEW_TOLERANCE: Duration = Duration::from_secs(10);

/// Local wall-clock time with its UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub month: u8,
    pub day: u8,

    /// Years since 2000
    pub year: u8,

    /// Hours east of UTC
    pub tz_offset: i8,

    /// 1 when daylight saving is in effect
    pub dst: u8,
}

impl ClockReading {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < CLOCK_BYTES {
            return Err(MountError::Decode(format!(
                "Time: expected {} bytes, got {}",
                CLOCK_BYTES,
                bytes.len()
            )));
        }

        Ok(Self {
            hour: bytes[0],
            minute: bytes[1],
            second: bytes[2],
            month: bytes[3],
            day: bytes[4],
            year: bytes[5],
            tz_offset: bytes[6] as i8,
            dst: bytes[7],
        })
    }

    pub fn to_bytes(&self) -> [u8; CLOCK_BYTES] {
        [
            self.hour,
            self.minute,
            self.second,
            self.month,
            self.day,
            self.year,
            self.tz_offset as u8,
            self.dst,
        ]
    }

    /// Reading of a zoned timestamp; DST is folded into the offset
    pub fn from_datetime<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        let offset_secs = time.offset().fix().local_minus_utc();

        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
            month: time.month() as u8,
            day: time.day() as u8,
            year: time.year().rem_euclid(100) as u8,
            tz_offset: (offset_secs / 3600) as i8,
            dst: 0,
        }
    }

    /// The system clock, local time
    pub fn now_local() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Absolute instant of this reading
    pub fn to_utc(&self) -> Result<DateTime<Utc>> {
        let local = NaiveDate::from_ymd_opt(
            2000 + self.year as i32,
            self.month as u32,
            self.day as u32,
        )
        .and_then(|date| {
            date.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32)
        })
        .ok_or_else(|| MountError::Decode(format!("Time: invalid date/time {:?}", self)))?;

        let shift = chrono::Duration::hours(self.tz_offset as i64 + self.dst as i64);
        Ok(Utc.from_utc_datetime(&(local - shift)))
    }

    /// Signed difference to `now` (positive when this reading is ahead)
    pub fn skew(&self, now: DateTime<Utc>) -> Result<chrono::Duration> {
        Ok(self.to_utc()? - now)
    }

    /// Close enough to `now` to be accepted
    pub fn agrees_with(&self, now: DateTime<Utc>) -> Result<bool> {
        let skew_ms = self.skew(now)?.num_milliseconds().unsigned_abs();
        Ok(u128::from(skew_ms) < CLOCK_SKEW_TOLERANCE.as_millis())
    }
}

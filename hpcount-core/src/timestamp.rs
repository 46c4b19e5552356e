//! Date and clock fields as the device encodes them
//!
//! Calendar values travel as single bytes with the year stored as an offset
//! from 2000. The raw bytes are kept as-is so a frame re-encodes exactly;
//! conversion to `chrono` types happens on demand.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{
    constants::YEAR_BASE,
    error::{Error, Result},
};

/// Year offset, month, day, hour, minute, second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireTime {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WireTime {
    /// Encoded size in bytes
    pub const SIZE: usize = 6;

    /// Read six bytes starting at the front of `data`
    ///
    /// Callers pass a slice already checked to hold the frame.
    pub(crate) fn read(data: &[u8]) -> Self {
        Self {
            year: data[0],
            month: data[1],
            day: data[2],
            hour: data[3],
            minute: data[4],
            second: data[5],
        }
    }

    /// Wire bytes
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        [self.year, self.month, self.day, self.hour, self.minute, self.second]
    }

    /// Convert to a calendar date and time
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTimestamp`] when the bytes do not name a real date or
    /// time of day (devices report month 0 before their clock is set).
    pub fn to_naive(self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            YEAR_BASE + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|date| {
            date.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
        .ok_or_else(|| Error::InvalidTimestamp(format!("{} is not a valid date", self)))
    }

    /// Encode a calendar date and time
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTimestamp`] when the year is outside 2000..=2255.
    pub fn from_naive(time: &NaiveDateTime) -> Result<Self> {
        let year = u8::try_from(time.year() - YEAR_BASE).map_err(|_| {
            Error::InvalidTimestamp(format!("year {} cannot be encoded", time.year()))
        })?;

        // chrono keeps every other component within a byte
        Ok(Self {
            year,
            month: time.month() as u8,
            day: time.day() as u8,
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
        })
    }
}

impl fmt::Display for WireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            YEAR_BASE + i32::from(self.year),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// Hour and minute pair (upload slots, business hours)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Clock {
    pub hour: u8,
    pub minute: u8,
}

impl Clock {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Compare with `time` on hour and minute only
    pub fn matches(self, time: &NaiveTime) -> bool {
        u32::from(self.hour) == time.hour() && u32::from(self.minute) == time.minute()
    }

    /// Convert to a time of day
    pub fn to_naive(self) -> Result<NaiveTime> {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{} is not a valid clock", self)))
    }
}

impl From<&NaiveTime> for Clock {
    fn from(time: &NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

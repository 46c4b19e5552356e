//! Device configuration

use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};
use crate::modes::{DisplayType, NetworkType, Speed, VerifyMode};

/// Settings a server can push to the device
///
/// Independent of the wire layout: clocks are `NaiveTime` and the system
/// time is a full `NaiveDateTime`. Seconds on the clock fields are ignored
/// when compared against a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub verify_mode: VerifyMode,

    pub speed: Speed,

    /// Recording cycle in minutes
    pub recording_cycle: u8,

    /// Upload cycle in minutes
    pub upload_cycle: u8,

    /// Non-zero enables uploading at `upload_clock`
    pub fixed_time_upload: u8,

    /// First fixed upload slot
    pub upload_clock: NaiveTime,

    pub network_type: NetworkType,

    pub display_type: DisplayType,

    /// Device wall clock
    pub system_time: NaiveDateTime,

    /// Start of business hours
    pub open_clock: NaiveTime,

    /// End of business hours
    pub close_clock: NaiveTime,
}

impl Configuration {
    /// Earliest year the device clock can hold (year offset 0)
    pub const MIN_YEAR: i32 = 2000;

    /// Latest year the device clock can hold (year offset 255)
    pub const MAX_YEAR: i32 = 2255;

    /// Create a configuration with the factory defaults and the given clock
    ///
    /// Defaults: no verification, low speed, zero cycles, online, total
    /// display, open all day (00:00 - 23:59).
    pub fn new(system_time: NaiveDateTime) -> Self {
        Self {
            verify_mode: VerifyMode::Exclude,
            speed: Speed::Low,
            recording_cycle: 0,
            upload_cycle: 0,
            fixed_time_upload: 0,
            upload_clock: NaiveTime::MIN,
            network_type: NetworkType::Online,
            display_type: DisplayType::Total,
            system_time,
            open_clock: NaiveTime::MIN,
            close_clock: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Set business hours
    pub fn with_business_hours(mut self, open: NaiveTime, close: NaiveTime) -> Self {
        self.open_clock = open;
        self.close_clock = close;
        self
    }

    /// Set recording and upload cycles (minutes)
    pub fn with_cycles(mut self, recording: u8, upload: u8) -> Self {
        self.recording_cycle = recording;
        self.upload_cycle = upload;
        self
    }

    /// Set the display type
    pub fn with_display(mut self, display: DisplayType) -> Self {
        self.display_type = display;
        self
    }

    /// Check that every field fits the device's encoding
    pub fn validate(&self) -> Result<()> {
        let year = self.system_time.year();
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(Error::Validation(format!(
                "system time year {} outside {}..={}",
                year,
                Self::MIN_YEAR,
                Self::MAX_YEAR
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Configuration[time: {}, hours: {}-{}, verify: {}, speed: {}, network: {}, display: {}]",
            self.system_time.format("%Y-%m-%d %H:%M:%S"),
            self.open_clock.format("%H:%M"),
            self.close_clock.format("%H:%M"),
            self.verify_mode,
            self.speed,
            self.network_type,
            self.display_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(year: i32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, 3, 5)
            .unwrap()
            .and_hms_opt(17, 17, 38)
            .unwrap()
    }

    #[test]
    fn test_new_defaults() {
        let config = Configuration::new(at(2026));
        assert_eq!(config.verify_mode, VerifyMode::Exclude);
        assert_eq!(config.display_type, DisplayType::Total);
        assert_eq!(config.close_clock, NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    }

    #[test]
    fn test_validate_year_range() {
        assert!(Configuration::new(at(2026)).validate().is_ok());
        assert!(Configuration::new(at(2255)).validate().is_ok());
        assert!(Configuration::new(at(1999)).validate().is_err());
        assert!(Configuration::new(at(2256)).validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = Configuration::new(at(2026))
            .with_cycles(10, 120)
            .with_display(DisplayType::Bilateral);
        assert_eq!(config.recording_cycle, 10);
        assert_eq!(config.upload_cycle, 120);
        assert_eq!(config.display_type, DisplayType::Bilateral);
    }

    #[test]
    fn test_display() {
        let config = Configuration::new(at(2026)).with_business_hours(
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
        );
        let text = config.to_string();
        assert!(text.contains("2026-03-05 17:17:38"));
        assert!(text.contains("10:00-20:30"));
    }
}

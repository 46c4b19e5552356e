//! Configuration diff between a setting response and the desired settings
//!
//! The response built from a request mirrors what the device currently
//! stores. Applying a [`Configuration`] overwrites only the fields that
//! differ and flips the tag to [`RespondingType::NewParameterValue`]; the
//! device then stores them and asks again, and the next exchange finds no
//! difference and stays [`RespondingType::Confirmation`].
//!
//! Equality per field:
//! - byte and mode fields: plain equality
//! - upload, open and close clocks: hour and minute
//! - system time: year, month, day, hour, minute and second
//!
//! The weekday byte is not compared. It is echoed while the device clock is
//! kept and zeroed when a new system time is pushed, so a stale weekday is
//! never paired with the new date; the device derives it from the date.

use std::fmt;

use hpcount_types::{Configuration, RespondingType};
use tracing::debug;

use crate::{
    error::Result,
    setting::SettingResponse,
    timestamp::{Clock, WireTime},
};

/// A configuration field that can differ from the device
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConfigField {
    VerifyMode,
    Speed,
    RecordingCycle,
    UploadCycle,
    FixedTimeUpload,
    UploadClock,
    NetworkType,
    DisplayType,
    SystemTime,
    OpenClock,
    CloseClock,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VerifyMode => "verify_mode",
            Self::Speed => "speed",
            Self::RecordingCycle => "recording_cycle",
            Self::UploadCycle => "upload_cycle",
            Self::FixedTimeUpload => "fixed_time_upload",
            Self::UploadClock => "upload_clock",
            Self::NetworkType => "network_type",
            Self::DisplayType => "display_type",
            Self::SystemTime => "system_time",
            Self::OpenClock => "open_clock",
            Self::CloseClock => "close_clock",
        };
        f.write_str(name)
    }
}

impl SettingResponse {
    /// Read the device's current settings back from the response
    ///
    /// The upload clock is the first upload slot.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidTimestamp`] when the device clock or one of the
    /// clocks does not hold a valid value.
    pub fn current_configuration(&self) -> Result<Configuration> {
        let fields = &self.fields;

        Ok(Configuration {
            verify_mode: fields.verify_mode,
            speed: fields.speed,
            recording_cycle: fields.recording_cycle,
            upload_cycle: fields.upload_cycle,
            fixed_time_upload: fields.fixed_time_upload,
            upload_clock: fields.upload_slots[0].to_naive()?,
            network_type: fields.network_type,
            display_type: fields.display_type,
            system_time: fields.system_time.to_naive()?,
            open_clock: fields.open_clock.to_naive()?,
            close_clock: fields.close_clock.to_naive()?,
        })
    }

    /// Overwrite every field that differs from `desired`
    ///
    /// Returns the fields that changed. The tag becomes
    /// [`RespondingType::NewParameterValue`] when any did and is left
    /// untouched otherwise.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidTimestamp`] when `desired.system_time` cannot be
    /// encoded. The response is not modified in that case.
    pub fn apply_configuration(&mut self, desired: &Configuration) -> Result<Vec<ConfigField>> {
        let system_time = WireTime::from_naive(&desired.system_time)?;

        let mut changed = Vec::new();
        let fields = &mut self.fields;

        if fields.verify_mode != desired.verify_mode {
            fields.verify_mode = desired.verify_mode;
            changed.push(ConfigField::VerifyMode);
        }

        if fields.speed != desired.speed {
            fields.speed = desired.speed;
            changed.push(ConfigField::Speed);
        }

        if fields.recording_cycle != desired.recording_cycle {
            fields.recording_cycle = desired.recording_cycle;
            changed.push(ConfigField::RecordingCycle);
        }

        if fields.upload_cycle != desired.upload_cycle {
            fields.upload_cycle = desired.upload_cycle;
            changed.push(ConfigField::UploadCycle);
        }

        if fields.fixed_time_upload != desired.fixed_time_upload {
            fields.fixed_time_upload = desired.fixed_time_upload;
            changed.push(ConfigField::FixedTimeUpload);
        }

        if !fields.upload_slots[0].matches(&desired.upload_clock) {
            fields.upload_slots[0] = Clock::from(&desired.upload_clock);
            changed.push(ConfigField::UploadClock);
        }

        if fields.network_type != desired.network_type {
            fields.network_type = desired.network_type;
            changed.push(ConfigField::NetworkType);
        }

        if fields.display_type != desired.display_type {
            fields.display_type = desired.display_type;
            changed.push(ConfigField::DisplayType);
        }

        if fields.system_time != system_time {
            fields.system_time = system_time;
            fields.week = 0;
            changed.push(ConfigField::SystemTime);
        }

        if !fields.open_clock.matches(&desired.open_clock) {
            fields.open_clock = Clock::from(&desired.open_clock);
            changed.push(ConfigField::OpenClock);
        }

        if !fields.close_clock.matches(&desired.close_clock) {
            fields.close_clock = Clock::from(&desired.close_clock);
            changed.push(ConfigField::CloseClock);
        }

        if !changed.is_empty() {
            self.responding_type = RespondingType::NewParameterValue;
        }

        debug!(
            responding_type = %self.responding_type,
            changed = ?changed,
            "Applied configuration"
        );

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, setting::SettingRequest};
    use chrono::{NaiveDate, NaiveTime};
    use hpcount_types::{DisplayType, Speed, VerifyMode};
    use pretty_assertions::assert_eq;

    const REQUEST: &str = "0D3BB382030000000000000000000000000002085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA0F010100022E010000173B80C0";

    fn response() -> SettingResponse {
        let data = hex::decode(REQUEST).unwrap();
        SettingRequest::decode(&data).unwrap().response(0x022E)
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    /// What the captured device reports, expressed as a configuration
    fn device_configuration() -> Configuration {
        response().current_configuration().unwrap()
    }

    #[test]
    fn test_current_configuration() {
        let config = device_configuration();

        assert_eq!(config.verify_mode, VerifyMode::Both);
        assert_eq!(config.display_type, DisplayType::Bilateral);
        assert_eq!(
            config.system_time,
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap().and_hms_opt(0, 2, 46).unwrap()
        );
        assert_eq!(config.upload_clock, time(0, 0, 0));
        assert_eq!(config.close_clock, time(23, 59, 0));
    }

    #[test]
    fn test_current_configuration_invalid_clock() {
        let mut response = response();
        response.fields.system_time.month = 0;

        assert!(matches!(
            response.current_configuration(),
            Err(Error::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_identical_configuration_confirms() {
        let mut response = response();
        let before = response.clone();

        let changed = response.apply_configuration(&device_configuration()).unwrap();

        assert!(changed.is_empty());
        assert_eq!(response, before);
        assert_eq!(response.responding_type, RespondingType::Confirmation);
    }

    #[test]
    fn test_changed_fields_only() {
        let mut response = response();
        let mut desired = device_configuration();
        desired.speed = Speed::High;
        desired.open_clock = time(9, 30, 0);

        let changed = response.apply_configuration(&desired).unwrap();

        assert_eq!(changed, vec![ConfigField::Speed, ConfigField::OpenClock]);
        assert_eq!(response.responding_type, RespondingType::NewParameterValue);
        assert_eq!(response.fields.speed, Speed::High);
        assert_eq!(response.fields.open_clock, Clock::new(9, 30));
        assert_eq!(response.fields.close_clock, Clock::new(23, 59));
        assert_eq!(response.fields.verify_mode, VerifyMode::Both);
    }

    #[test]
    fn test_clock_seconds_ignored() {
        let mut response = response();
        let mut desired = device_configuration();
        desired.close_clock = time(23, 59, 30);
        desired.upload_clock = time(0, 0, 59);

        assert!(response.apply_configuration(&desired).unwrap().is_empty());
    }

    #[test]
    fn test_system_time_compares_seconds() {
        let mut response = response();
        let mut desired = device_configuration();
        desired.system_time = desired.system_time + chrono::Duration::seconds(1);

        let changed = response.apply_configuration(&desired).unwrap();

        assert_eq!(changed, vec![ConfigField::SystemTime]);
        assert_eq!(response.fields.system_time.second, 47);
    }

    #[test]
    fn test_weekday_follows_system_time() {
        // Device reports weekday 1
        let mut kept = response();
        kept.apply_configuration(&device_configuration()).unwrap();
        assert_eq!(kept.fields.week, 0x01);

        let mut pushed = response();
        let mut desired = device_configuration();
        desired.system_time = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(8, 0, 0).unwrap();
        pushed.apply_configuration(&desired).unwrap();

        assert_eq!(pushed.fields.week, 0);
        let frame = pushed.encode().unwrap();
        assert_eq!(frame[3 + 46], 0);
    }

    #[test]
    fn test_unencodable_system_time_leaves_response_untouched() {
        let mut response = response();
        let before = response.clone();
        let mut desired = device_configuration();
        desired.speed = Speed::High;
        desired.system_time = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();

        assert!(response.apply_configuration(&desired).is_err());
        assert_eq!(response, before);
    }

    #[test]
    fn test_second_exchange_confirms() {
        let mut desired = device_configuration();
        desired.recording_cycle = 10;
        desired.upload_cycle = 120;
        desired.open_clock = time(10, 0, 0);
        desired.close_clock = time(20, 30, 0);
        desired.system_time = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(8, 0, 0).unwrap();

        // First exchange pushes the new values
        let mut first = response();
        assert!(!first.apply_configuration(&desired).unwrap().is_empty());
        assert_eq!(first.responding_type, RespondingType::NewParameterValue);

        // The device stores them and asks again
        let mut stored = SettingRequest::decode(&hex::decode(REQUEST).unwrap()).unwrap();
        stored.fields = first.fields;
        let next_request = SettingRequest::decode(&stored.encode().unwrap()).unwrap();

        let mut second = next_request.response(0x0230);
        assert!(second.apply_configuration(&desired).unwrap().is_empty());
        assert_eq!(second.responding_type, RespondingType::Confirmation);
    }

    #[test]
    fn test_reapplying_is_stable() {
        let mut desired = device_configuration();
        desired.display_type = DisplayType::Total;

        let mut response = response();
        response.apply_configuration(&desired).unwrap();
        let applied = response.clone();

        assert!(response.apply_configuration(&desired).unwrap().is_empty());
        assert_eq!(response, applied);
    }
}

//! Byte-valued device modes
//!
//! Every mode the device reports is a single byte. Firmware revisions add
//! values without notice, so each enum keeps an `Unrecognized` variant that
//! carries the raw byte and round-trips it unchanged.

use std::fmt;

/// Time verification mode (`Command Type` in the device manual)
///
/// ```text
/// 0x00  exclude verification of system and business hours
/// 0x01  verify system time
/// 0x02  verify business hours
/// 0x03  verify both
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VerifyMode {
    Exclude,
    System,
    Business,
    Both,
    Unrecognized(u8),
}

impl From<u8> for VerifyMode {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Exclude,
            0x01 => Self::System,
            0x02 => Self::Business,
            0x03 => Self::Both,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<VerifyMode> for u8 {
    fn from(mode: VerifyMode) -> u8 {
        match mode {
            VerifyMode::Exclude => 0x00,
            VerifyMode::System => 0x01,
            VerifyMode::Business => 0x02,
            VerifyMode::Both => 0x03,
            VerifyMode::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => f.write_str("Exclude"),
            Self::System => f.write_str("System"),
            Self::Business => f.write_str("Business"),
            Self::Both => f.write_str("Both"),
            Self::Unrecognized(raw) => write!(f, "Unrecognized(0x{:02X})", raw),
        }
    }
}

/// Counting speed
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Speed {
    Low,
    High,
    Unrecognized(u8),
}

impl From<u8> for Speed {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Low,
            0x01 => Self::High,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> u8 {
        match speed {
            Speed::Low => 0x00,
            Speed::High => 0x01,
            Speed::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("Low"),
            Self::High => f.write_str("High"),
            Self::Unrecognized(raw) => write!(f, "Unrecognized(0x{:02X})", raw),
        }
    }
}

/// Operation mode
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NetworkType {
    /// Uploads to the server
    Online,
    /// Counts locally without uploading
    StandAlone,
    Unrecognized(u8),
}

impl From<u8> for NetworkType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Online,
            0x01 => Self::StandAlone,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<NetworkType> for u8 {
    fn from(network: NetworkType) -> u8 {
        match network {
            NetworkType::Online => 0x00,
            NetworkType::StandAlone => 0x01,
            NetworkType::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("Online"),
            Self::StandAlone => f.write_str("StandAlone"),
            Self::Unrecognized(raw) => write!(f, "Unrecognized(0x{:02X})", raw),
        }
    }
}

/// What the receiver's screen shows
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DisplayType {
    /// Counting is not displayed
    Hidden,
    /// Total amount
    Total,
    /// In and out separately
    Bilateral,
    Unrecognized(u8),
}

impl From<u8> for DisplayType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Hidden,
            0x01 => Self::Total,
            0x02 => Self::Bilateral,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<DisplayType> for u8 {
    fn from(display: DisplayType) -> u8 {
        match display {
            DisplayType::Hidden => 0x00,
            DisplayType::Total => 0x01,
            DisplayType::Bilateral => 0x02,
            DisplayType::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => f.write_str("Hidden"),
            Self::Total => f.write_str("Total"),
            Self::Bilateral => f.write_str("Bilateral"),
            Self::Unrecognized(raw) => write!(f, "Unrecognized(0x{:02X})", raw),
        }
    }
}

/// Tag leading every setting response
///
/// `NewParameterValue` tells the device to store the fields and ask again;
/// `Confirmation` means nothing needs to change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RespondingType {
    NewParameterValue,
    Confirmation,
    Unrecognized(u8),
}

impl From<u8> for RespondingType {
    fn from(value: u8) -> Self {
        match value {
            0x04 => Self::NewParameterValue,
            0x05 => Self::Confirmation,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<RespondingType> for u8 {
    fn from(kind: RespondingType) -> u8 {
        match kind {
            RespondingType::NewParameterValue => 0x04,
            RespondingType::Confirmation => 0x05,
            RespondingType::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for RespondingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewParameterValue => f.write_str("NewParameterValue"),
            Self::Confirmation => f.write_str("Confirmation"),
            Self::Unrecognized(raw) => write!(f, "Unrecognized(0x{:02X})", raw),
        }
    }
}

/// Whether a cache upload was accepted
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AnswerType {
    Failed,
    Ok,
    Unrecognized(u8),
}

impl From<u8> for AnswerType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::Failed,
            0x01 => Self::Ok,
            other => Self::Unrecognized(other),
        }
    }
}

impl From<AnswerType> for u8 {
    fn from(answer: AnswerType) -> u8 {
        match answer {
            AnswerType::Failed => 0x00,
            AnswerType::Ok => 0x01,
            AnswerType::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed => f.write_str("Failed"),
            Self::Ok => f.write_str("Ok"),
            Self::Unrecognized(raw) => write!(f, "Unrecognized(0x{:02X})", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_round_trip() {
        for raw in 0x00..=0x03u8 {
            assert_eq!(u8::from(VerifyMode::from(raw)), raw);
        }
        assert_eq!(Speed::from(0x01), Speed::High);
        assert_eq!(DisplayType::from(0x02), DisplayType::Bilateral);
        assert_eq!(RespondingType::from(0x04), RespondingType::NewParameterValue);
        assert_eq!(u8::from(RespondingType::Confirmation), 0x05);
        assert_eq!(u8::from(AnswerType::Ok), 0x01);
    }

    #[test]
    fn test_unrecognized_keeps_raw_byte() {
        let mode = VerifyMode::from(0x17);
        assert_eq!(mode, VerifyMode::Unrecognized(0x17));
        assert_eq!(u8::from(mode), 0x17);

        assert_eq!(u8::from(NetworkType::from(0xFE)), 0xFE);
        assert_eq!(u8::from(DisplayType::from(0x09)), 0x09);
    }

    #[test]
    fn test_display() {
        assert_eq!(VerifyMode::Both.to_string(), "Both");
        assert_eq!(Speed::Unrecognized(0x0A).to_string(), "Unrecognized(0x0A)");
    }
}

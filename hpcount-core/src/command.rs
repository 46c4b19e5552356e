//! HPC015 request commands

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Request commands sent by the device in the `cmd` field
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Configuration query, one 53-byte `data` block
    GetSetting,

    /// Event upload, one `status` block plus `count` 17-byte `data` blocks
    Cache,
}

impl Command {
    /// Get the command name as it appears on the wire
    pub fn name(self) -> &'static str {
        match self {
            Self::GetSetting => "getsetting",
            Self::Cache => "cache",
        }
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "getsetting" => Ok(Self::GetSetting),
            "cache" => Ok(Self::Cache),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_conversion() {
        assert_eq!("getsetting".parse::<Command>().unwrap(), Command::GetSetting);
        assert_eq!("cache".parse::<Command>().unwrap(), Command::Cache);
        assert_eq!(Command::Cache.name(), "cache");
    }

    #[test]
    fn test_unknown_command() {
        let result = "reboot".parse::<Command>();
        assert!(matches!(result, Err(Error::UnknownCommand(name)) if name == "reboot"));
    }

    #[test]
    fn test_command_is_case_sensitive() {
        assert!("GetSetting".parse::<Command>().is_err());
    }
}

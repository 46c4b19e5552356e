//! Protocol constants

/// Largest span the checksum may cover
pub const MAX_CHECKSUM_SPAN: usize = 78;

/// Checksum trailer size
pub const CHECKSUM_SIZE: usize = 2;

/// Setting request (`getsetting` data block)
pub const SETTING_REQUEST_SIZE: usize = 53;

/// Setting response
pub const SETTING_RESPONSE_SIZE: usize = 58;

/// Device status block (`status` field)
pub const DEVICE_STATUS_SIZE: usize = 14;

/// One cached event (`cache` data block)
pub const EVENT_SIZE: usize = 17;

/// Cache acknowledgement
pub const CACHE_RESPONSE_SIZE: usize = 15;

/// MAC address field width
pub const MAC_SIZE: usize = 7;

/// Number of fixed upload slots in a setting frame
pub const UPLOAD_SLOTS: usize = 4;

/// Device years are offsets from this year
pub const YEAR_BASE: i32 = 2000;

/// Envelope field names
pub mod keys {
    pub const CMD: &str = "cmd";
    pub const FLAG: &str = "flag";
    pub const DATA: &str = "data";
    pub const STATUS: &str = "status";
    pub const COUNT: &str = "count";

    /// Prefix of every response body
    pub const RESULT: &str = "result";
}

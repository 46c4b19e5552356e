//! # hpcount-core
//!
//! Wire codec for HPC015 people counters.
//!
//! This crate provides the protocol primitives:
//! - Request envelope parsing and `result=` bodies
//! - CRC-16/MODBUS checksum
//! - `getsetting` request/response frames and the configuration diff
//! - `cache` events, status block and acknowledgement
//! - Protocol constants

pub mod cache;
pub mod checksum;
pub mod command;
pub mod constants;
pub mod diff;
pub mod envelope;
pub mod error;
pub mod setting;
pub mod status;
pub mod timestamp;

pub use cache::{CacheRequest, CacheResponse, CodecConfig, Event};
pub use command::Command;
pub use diff::ConfigField;
pub use envelope::{parse_result_body, result_body, Envelope};
pub use error::{Error, Result};
pub use setting::{SettingFields, SettingRequest, SettingResponse};
pub use status::DeviceStatus;
pub use timestamp::{Clock, WireTime};

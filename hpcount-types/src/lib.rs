//! Type definitions for hpcount

pub mod configuration;
pub mod error;
pub mod modes;

pub use configuration::Configuration;
pub use error::{Error, Result};
pub use modes::{AnswerType, DisplayType, NetworkType, RespondingType, Speed, VerifyMode};

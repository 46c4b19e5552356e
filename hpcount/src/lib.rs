//! # hpcount
//!
//! Server side of the HPC015 people-counter protocol.
//!
//! ## Features
//!
//! - Decodes `getsetting` and `cache` requests with checksum validation
//! - Pushes a desired configuration, changing only what differs
//! - Deduplicating in/out counter with a periodic sweep
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::NaiveTime;
//! use hpcount::{LocalClock, OccupancyCounter, RequestHandler};
//! use hpcount_types::Configuration;
//!
//! #[tokio::main]
//! async fn main() -> hpcount::Result<()> {
//!     let counter = Arc::new(OccupancyCounter::default());
//!     let sweeper = Arc::clone(&counter).spawn_sweeper();
//!
//!     let template = Configuration::new(chrono::Local::now().naive_local()).with_business_hours(
//!         NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
//!         NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
//!     );
//!     let handler = RequestHandler::new(LocalClock::new(template), counter);
//!
//!     // Body received from the device, e.g. over HTTP
//!     let body = "cmd=cache&flag=1E28&status=...&data=...&count=1";
//!     let reply = handler.handle(body)?;
//!     println!("{}", reply);
//!
//!     sweeper.abort();
//!     Ok(())
//! }
//! ```

pub mod counter;
pub mod error;
pub mod handler;

// Re-exports
pub use counter::{CounterConfig, OccupancyCounter, Orientation, Tally};
pub use error::{Error, Result};
pub use handler::{ConfigurationSource, HandlerConfig, LocalClock, RequestHandler};

// Re-export types
pub use hpcount_core::{CacheRequest, CodecConfig, Envelope, Event, SettingRequest, SettingResponse};
pub use hpcount_types::Configuration;

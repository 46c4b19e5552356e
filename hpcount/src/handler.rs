//! Request dispatch
//!
//! Turns a raw request body into the `result=<HEX>` body the device
//! expects, pushing the desired configuration on `getsetting` and feeding
//! uploaded events to the [`OccupancyCounter`] on `cache`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use hpcount_core::{
    result_body, CacheRequest, CodecConfig, Command, Envelope, SettingRequest,
};
use hpcount_types::{AnswerType, Configuration};

use crate::counter::OccupancyCounter;
use crate::error::{Error, Result};

/// Provides the configuration devices should run with
pub trait ConfigurationSource: Send + Sync {
    /// Desired configuration, read once per request
    fn configuration(&self) -> Configuration;
}

impl ConfigurationSource for Configuration {
    fn configuration(&self) -> Configuration {
        self.clone()
    }
}

/// Fixed settings with the system time taken from the local clock
#[derive(Debug, Clone)]
pub struct LocalClock {
    template: Configuration,
}

impl LocalClock {
    pub fn new(template: Configuration) -> Self {
        Self { template }
    }
}

impl ConfigurationSource for LocalClock {
    fn configuration(&self) -> Configuration {
        let mut config = self.template.clone();
        config.system_time = Local::now().naive_local();
        config
    }
}

/// Handler configuration
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub codec: CodecConfig,

    /// Device clocks within this distance of the desired time are left alone
    ///
    /// Without it every request would push a new time and the device would
    /// ask again immediately.
    pub clock_tolerance: Duration,
}

impl HandlerConfig {
    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_clock_tolerance(mut self, tolerance: Duration) -> Self {
        self.clock_tolerance = tolerance;
        self
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            codec: CodecConfig::default(),
            clock_tolerance: Duration::from_secs(5 * 60),
        }
    }
}

/// Dispatches device requests
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use chrono::NaiveDate;
/// use hpcount::{OccupancyCounter, RequestHandler};
/// use hpcount_types::Configuration;
///
/// let now = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap().and_hms_opt(0, 3, 0).unwrap();
/// let handler = RequestHandler::new(Configuration::new(now), Arc::new(OccupancyCounter::default()));
///
/// let body = handler.handle(
///     "cmd=getsetting&flag=022E&data=0D3BB382030000000000000000000000000002085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA0F010100022E010000173B80C0",
/// ).unwrap();
/// assert!(body.starts_with("result=042E02"));
/// ```
pub struct RequestHandler<S> {
    source: S,
    counter: Arc<OccupancyCounter>,
    config: HandlerConfig,
}

impl<S: ConfigurationSource> RequestHandler<S> {
    pub fn new(source: S, counter: Arc<OccupancyCounter>) -> Self {
        Self {
            source,
            counter,
            config: HandlerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn counter(&self) -> &Arc<OccupancyCounter> {
        &self.counter
    }

    /// Handle one raw request body
    ///
    /// Returns the response body. A rejected request leaves the counter
    /// untouched; the caller should send nothing back.
    pub fn handle(&self, body: &str) -> Result<String> {
        let result = Envelope::parse(body)
            .map_err(Error::from)
            .and_then(|envelope| self.dispatch(&envelope));

        if let Err(e) = &result {
            warn!(error = %e, integrity = e.is_integrity_failure(), "Rejected request");
        }

        result
    }

    fn dispatch(&self, envelope: &Envelope) -> Result<String> {
        match envelope.command()? {
            Command::GetSetting => self.get_setting(envelope),
            Command::Cache => self.cache(envelope),
        }
    }

    fn get_setting(&self, envelope: &Envelope) -> Result<String> {
        let [block] = envelope.data.as_slice() else {
            return Err(Error::UnexpectedRequest(format!(
                "getsetting with {} data blocks",
                envelope.data.len()
            )));
        };

        let request = SettingRequest::decode(block)?;
        let mut response = request.response(envelope.flag);

        let mut desired = self.source.configuration();
        desired.validate()?;

        match response.fields.system_time.to_naive() {
            Ok(device_time) => {
                let drift = (desired.system_time - device_time).num_seconds().unsigned_abs();
                if drift <= self.config.clock_tolerance.as_secs() {
                    desired.system_time = device_time;
                }
            }
            Err(e) => debug!(error = %e, "Device clock unreadable, pushing desired time"),
        }

        let changed = response.apply_configuration(&desired)?;
        let frame = response.encode()?;

        info!(
            flag = format!("0x{:04X}", envelope.flag),
            responding_type = %response.responding_type,
            changed = changed.len(),
            "Answered getsetting"
        );

        Ok(result_body(&frame))
    }

    fn cache(&self, envelope: &Envelope) -> Result<String> {
        let request = CacheRequest::decode_with(envelope, &self.config.codec)?;

        let config = self.source.configuration();
        let frame = request
            .response(AnswerType::Ok, envelope.flag, &config)?
            .encode()?;

        let accepted = request
            .events
            .iter()
            .filter(|event| self.counter.record(**event).is_some())
            .count();

        info!(
            serial = %request.status.serial_label(),
            events = request.events.len(),
            accepted,
            occupancy = self.counter.occupancy(),
            "Answered cache"
        );

        Ok(result_body(&frame))
    }
}

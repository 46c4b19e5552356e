//! Text envelope wrapping every device request
//!
//! Requests arrive as `&`-joined `key=value` pairs with hex-encoded binary
//! values:
//!
//! ```text
//! cmd=getsetting&flag=022E&data=0D3BB382...80C0
//! cmd=cache&flag=1E28&status=010142AE...E6A7&data=15050D0D...&data=...&count=2
//! ```
//!
//! The parser only splits and hex-decodes. Frame sizes and checksums are
//! checked by the frame decoders in [`crate::setting`] and [`crate::cache`].

use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use tracing::{debug, trace};

use crate::{
    command::Command,
    constants::keys,
    error::{Error, Result},
    status::DeviceStatus,
};

/// Decoded request envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw `cmd` value
    pub command: String,

    /// Request flag, as read big-endian from the `flag` field
    pub flag: u16,

    /// One entry per `data` field, in order of appearance
    pub data: Vec<Bytes>,

    /// `status` field (cache requests only)
    pub status: Option<DeviceStatus>,

    /// Declared number of `data` blocks (cache requests only)
    pub count: Option<u16>,

    /// `result` field, present when a server reply was logged with the request
    pub result: Option<Bytes>,
}

impl Envelope {
    /// Parse a raw request body
    ///
    /// Unknown keys are ignored. Repeated `data` keys accumulate; for the
    /// other keys the last occurrence wins.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedEnvelope`] when `cmd` or every `data` is missing,
    /// a pair has no `=`, or a hex value does not decode.
    ///
    /// # Examples
    ///
    /// ```
    /// use hpcount_core::Envelope;
    ///
    /// let envelope = Envelope::parse("cmd=getsetting&flag=022E&data=0D3B").unwrap();
    /// assert_eq!(envelope.command, "getsetting");
    /// assert_eq!(envelope.flag, 0x022E);
    /// assert_eq!(envelope.data[0].as_ref(), &[0x0D, 0x3B]);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut command = None;
        let mut flag = 0;
        let mut data = Vec::with_capacity(1);
        let mut status = None;
        let mut count = None;
        let mut result = None;

        for pair in pairs(text) {
            let (key, value) = pair?;

            match key {
                keys::CMD => command = Some(value.to_string()),
                keys::FLAG => flag = parse_flag(value)?,
                keys::DATA => data.push(decode_hex(key, value)?),
                keys::STATUS => status = Some(DeviceStatus::decode(&decode_hex(key, value)?)?),
                keys::COUNT => {
                    let n = u16::from_str_radix(value, 16).map_err(|e| {
                        Error::MalformedEnvelope(format!("count {:?} is not hex: {}", value, e))
                    })?;
                    count = Some(n);
                }
                keys::RESULT => result = Some(decode_hex(key, value)?),
                other => trace!(key = other, "Ignoring unknown envelope field"),
            }
        }

        let command = command
            .filter(|cmd| !cmd.is_empty())
            .ok_or_else(|| Error::MalformedEnvelope("missing cmd".into()))?;

        if data.is_empty() {
            return Err(Error::MalformedEnvelope("missing data".into()));
        }

        let envelope = Self {
            command,
            flag,
            data,
            status,
            count,
            result,
        };

        debug!(
            command = %envelope.command,
            flag = format!("0x{:04X}", envelope.flag),
            blocks = envelope.data.len(),
            "Parsed envelope"
        );

        Ok(envelope)
    }

    /// Resolve the `cmd` value to a known command
    pub fn command(&self) -> Result<Command> {
        self.command.parse()
    }

    /// Flag as it must be echoed in a response (bytes swapped)
    pub fn response_flag(&self) -> u16 {
        self.flag.swap_bytes()
    }
}

impl fmt::Display for Envelope {
    /// Render back to the wire text form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}&{}={:04X}", keys::CMD, self.command, keys::FLAG, self.flag)?;

        if let Some(status) = &self.status {
            write!(f, "&{}={}", keys::STATUS, hex::encode_upper(status.encode()))?;
        }

        for block in &self.data {
            write!(f, "&{}={}", keys::DATA, hex::encode_upper(block))?;
        }

        if let Some(count) = self.count {
            write!(f, "&{}={:X}", keys::COUNT, count)?;
        }

        if let Some(result) = &self.result {
            write!(f, "&{}={}", keys::RESULT, hex::encode_upper(result))?;
        }

        Ok(())
    }
}

/// Wrap an encoded response frame as a response body (`result=<HEX>`)
pub fn result_body(frame: &[u8]) -> String {
    format!("{}={}", keys::RESULT, hex::encode_upper(frame))
}

/// Extract the frame from a response body (`result=<HEX>`)
///
/// Inverse of [`result_body`]. Other keys are ignored.
///
/// # Errors
///
/// [`Error::MalformedEnvelope`] when `result` is missing or not hex.
///
/// # Examples
///
/// ```
/// use hpcount_core::envelope::{parse_result_body, result_body};
///
/// let frame = parse_result_body(&result_body(&[0x05, 0x2E, 0x02])).unwrap();
/// assert_eq!(frame.as_ref(), &[0x05, 0x2E, 0x02]);
/// ```
pub fn parse_result_body(text: &str) -> Result<Bytes> {
    let mut frame = None;

    for pair in pairs(text) {
        let (key, value) = pair?;
        if key == keys::RESULT {
            frame = Some(decode_hex(key, value)?);
        }
    }

    frame.ok_or_else(|| Error::MalformedEnvelope("missing result".into()))
}

fn pairs(text: &str) -> impl Iterator<Item = Result<(&str, &str)>> {
    text.trim()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            pair.split_once('=')
                .ok_or_else(|| Error::MalformedEnvelope(format!("field without value: {:?}", pair)))
        })
}

fn parse_flag(value: &str) -> Result<u16> {
    let mut raw = [0u8; 2];
    hex::decode_to_slice(value, &mut raw)
        .map_err(|e| Error::MalformedEnvelope(format!("flag {:?} is not 4 hex digits: {}", value, e)))?;
    Ok(BigEndian::read_u16(&raw))
}

fn decode_hex(key: &str, value: &str) -> Result<Bytes> {
    hex::decode(value)
        .map(Bytes::from)
        .map_err(|e| Error::MalformedEnvelope(format!("{} is not hex: {}", key, e)))
}

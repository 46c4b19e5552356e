//! `cache` frames
//!
//! The device uploads buffered counts as one status block plus a list of
//! 17-byte events and expects a short acknowledgement carrying the server
//! time and business hours.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, BytesMut};
use chrono::NaiveDateTime;
use hpcount_types::{AnswerType, Configuration};
use tracing::{debug, trace};

use crate::{
    checksum,
    constants::{CACHE_RESPONSE_SIZE, EVENT_SIZE},
    envelope::Envelope,
    error::{Error, Result},
    status::DeviceStatus,
    timestamp::{Clock, WireTime},
};

/// Decoder options for cache requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Reject requests whose status block fails its checksum
    pub verify_status_checksum: bool,
}

impl CodecConfig {
    /// Enable or disable status checksum verification
    pub fn with_status_checksum(mut self, verify: bool) -> Self {
        self.verify_status_checksum = verify;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            verify_status_checksum: true,
        }
    }
}

/// One buffered counting record
///
/// # Layout
///
/// ```text
/// ┌────────────────┬───────┬────────────┬────────────┬──────────┐
/// │   Timestamp    │ Focus │  In count  │ Out count  │ Checksum │
/// │    6 bytes     │ 1 byte│ 4 bytes LE │ 4 bytes LE │ 2 bytes  │
/// └────────────────┴───────┴────────────┴────────────┴──────────┘
/// ```
///
/// The checksum covers bytes 0..15 and is stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: WireTime,
    pub focus: u8,
    pub count_in: u32,
    pub count_out: u32,
    pub checksum: u16,
}

impl Event {
    /// Decode one `data` block of a cache request
    ///
    /// # Errors
    ///
    /// - [`Error::WrongLength`] unless `data` is exactly 17 bytes
    /// - [`Error::ChecksumMismatch`] when bytes 15..17 disagree with the
    ///   checksum of bytes 0..15
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != EVENT_SIZE {
            return Err(Error::WrongLength {
                frame: "cache event",
                expected: EVENT_SIZE,
                actual: data.len(),
            });
        }

        let checksum = checksum::verify_trailer(data)?;

        let event = Self {
            time: WireTime::read(&data[0..6]),
            focus: data[6],
            count_in: LittleEndian::read_u32(&data[7..11]),
            count_out: LittleEndian::read_u32(&data[11..15]),
            checksum,
        };

        trace!(?event, "Decoded event");

        Ok(event)
    }

    /// Build an event with a freshly computed checksum
    pub fn new(time: WireTime, focus: u8, count_in: u32, count_out: u32) -> Result<Self> {
        let mut event = Self {
            time,
            focus,
            count_in,
            count_out,
            checksum: 0,
        };
        event.checksum = checksum::calculate(&event.body())?;
        Ok(event)
    }

    fn body(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(EVENT_SIZE);
        buf.put_slice(&self.time.to_bytes());
        buf.put_u8(self.focus);
        buf.put_u32_le(self.count_in);
        buf.put_u32_le(self.count_out);
        buf
    }

    /// Encode the event as the device sends it
    pub fn encode(&self) -> BytesMut {
        let mut buf = self.body();
        buf.put_u16(self.checksum);
        buf
    }

    /// Event time as a calendar value
    pub fn event_time(&self) -> Result<NaiveDateTime> {
        self.time.to_naive()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event[{}](in={}, out={})", self.time, self.count_in, self.count_out)
    }
}

/// Decoded event upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    pub status: DeviceStatus,
    pub events: Vec<Event>,
}

impl CacheRequest {
    /// Decode a cache envelope with default options
    pub fn decode(envelope: &Envelope) -> Result<Self> {
        Self::decode_with(envelope, &CodecConfig::default())
    }

    /// Decode a cache envelope
    ///
    /// All-or-nothing: one bad block rejects the whole upload.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedEnvelope`] when the status block is missing
    /// - [`Error::CountMismatch`] when `count` is missing or differs from
    ///   the number of `data` blocks
    /// - [`Error::ChecksumMismatch`] for a bad status block (if verified)
    /// - any error from [`Event::decode`]
    pub fn decode_with(envelope: &Envelope, config: &CodecConfig) -> Result<Self> {
        let status = envelope
            .status
            .ok_or_else(|| Error::MalformedEnvelope("cache request without status".into()))?;

        let declared = envelope.count.unwrap_or(0);
        if usize::from(declared) != envelope.data.len() {
            return Err(Error::CountMismatch {
                declared,
                actual: envelope.data.len(),
            });
        }

        if config.verify_status_checksum {
            status.verify()?;
        }

        let events = envelope
            .data
            .iter()
            .map(|block| Event::decode(block))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            serial = %status.serial_label(),
            events = events.len(),
            "Decoded cache request"
        );

        Ok(Self { status, events })
    }

    /// Build the acknowledgement for this upload
    ///
    /// The reported time is the first event's time, or the configured
    /// system time when the batch is empty. Business hours come from
    /// `config`. `flag` is the request flag as parsed from the envelope.
    pub fn response(&self, answer: AnswerType, flag: u16, config: &Configuration) -> Result<CacheResponse> {
        let system_time = match self.events.first() {
            Some(event) => event.time,
            None => WireTime::from_naive(&config.system_time)?,
        };

        Ok(CacheResponse {
            answer,
            flag: flag.swap_bytes(),
            system_time,
            open_clock: Clock::from(&config.open_clock),
            close_clock: Clock::from(&config.close_clock),
        })
    }
}

/// Acknowledgement of a cache upload
///
/// # Layout
///
/// ```text
/// offset  size  field
///  0      1     answer (0 failed, 1 ok)
///  1      2     flag (byte-swapped echo)
///  3      6     system time
///  9      2     open clock (hour, minute)
/// 11      2     close clock (hour, minute)
/// 13      2     checksum over bytes 0..13
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheResponse {
    pub answer: AnswerType,

    /// Flag exactly as written on the wire (already byte-swapped)
    pub flag: u16,

    pub system_time: WireTime,
    pub open_clock: Clock,
    pub close_clock: Clock,
}

impl CacheResponse {
    /// Encode to the 15-byte wire form
    pub fn encode(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(CACHE_RESPONSE_SIZE);
        buf.put_u8(self.answer.into());
        buf.put_u16(self.flag);
        buf.put_slice(&self.system_time.to_bytes());
        buf.put_u8(self.open_clock.hour);
        buf.put_u8(self.open_clock.minute);
        buf.put_u8(self.close_clock.hour);
        buf.put_u8(self.close_clock.minute);

        let crc = checksum::calculate(&buf)?;
        buf.put_u16(crc);

        Ok(buf)
    }

    /// Decode a 15-byte acknowledgement
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != CACHE_RESPONSE_SIZE {
            return Err(Error::WrongLength {
                frame: "cache response",
                expected: CACHE_RESPONSE_SIZE,
                actual: data.len(),
            });
        }

        checksum::verify_trailer(data)?;

        Ok(Self {
            answer: AnswerType::from(data[0]),
            flag: u16::from_be_bytes([data[1], data[2]]),
            system_time: WireTime::read(&data[3..9]),
            open_clock: Clock::new(data[9], data[10]),
            close_clock: Clock::new(data[11], data[12]),
        })
    }
}

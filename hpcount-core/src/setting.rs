//! `getsetting` frames
//!
//! The device asks for its configuration with a 53-byte request and the
//! server answers with a 58-byte response restating (and possibly changing)
//! every setting.

use std::fmt;

use bytes::{BufMut, BytesMut};
use hpcount_types::{DisplayType, NetworkType, RespondingType, Speed, VerifyMode};
use tracing::debug;

use crate::{
    checksum,
    constants::{MAC_SIZE, SETTING_REQUEST_SIZE, SETTING_RESPONSE_SIZE, UPLOAD_SLOTS},
    error::{Error, Result},
    timestamp::{Clock, WireTime},
};

/// Settings shared by request and response frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingFields {
    pub verify_mode: VerifyMode,
    pub speed: Speed,
    pub recording_cycle: u8,
    pub upload_cycle: u8,
    pub fixed_time_upload: u8,
    pub upload_slots: [Clock; UPLOAD_SLOTS],
    pub network_type: NetworkType,
    pub display_type: DisplayType,
    pub system_time: WireTime,
    pub week: u8,
    pub open_clock: Clock,
    pub close_clock: Clock,
}

/// Serial number, settings and MAC addresses in their shared 51-byte layout
///
/// ```text
/// offset  size  field
///  0      4     serial number
///  4      1     verification mode
///  5      1     speed
///  6      1     recording cycle
///  7      1     upload cycle
///  8      1     fixed-time upload
///  9      8     upload slots 1-4 (hour, minute)
/// 17      1     network type
/// 18      1     display type
/// 19      21    MAC addresses 1-3 (7 bytes each)
/// 40      6     system time (year-2000, month, day, hour, minute, second)
/// 46      1     weekday
/// 47      2     open clock (hour, minute)
/// 49      2     close clock (hour, minute)
/// ```
const LAYOUT_SIZE: usize = 51;

type Macs = [[u8; MAC_SIZE]; 3];

fn read_layout(data: &[u8]) -> ([u8; 4], Macs, SettingFields) {
    let mut serial = [0u8; 4];
    serial.copy_from_slice(&data[0..4]);

    let mut macs = [[0u8; MAC_SIZE]; 3];
    for (i, mac) in macs.iter_mut().enumerate() {
        let start = 19 + i * MAC_SIZE;
        mac.copy_from_slice(&data[start..start + MAC_SIZE]);
    }

    let mut upload_slots = [Clock::default(); UPLOAD_SLOTS];
    for (i, slot) in upload_slots.iter_mut().enumerate() {
        *slot = Clock::new(data[9 + i * 2], data[10 + i * 2]);
    }

    let fields = SettingFields {
        verify_mode: VerifyMode::from(data[4]),
        speed: Speed::from(data[5]),
        recording_cycle: data[6],
        upload_cycle: data[7],
        fixed_time_upload: data[8],
        upload_slots,
        network_type: NetworkType::from(data[17]),
        display_type: DisplayType::from(data[18]),
        system_time: WireTime::read(&data[40..46]),
        week: data[46],
        open_clock: Clock::new(data[47], data[48]),
        close_clock: Clock::new(data[49], data[50]),
    };

    (serial, macs, fields)
}

fn put_layout(buf: &mut BytesMut, serial: &[u8; 4], macs: &Macs, fields: &SettingFields) {
    buf.put_slice(serial);
    buf.put_u8(fields.verify_mode.into());
    buf.put_u8(fields.speed.into());
    buf.put_u8(fields.recording_cycle);
    buf.put_u8(fields.upload_cycle);
    buf.put_u8(fields.fixed_time_upload);
    for slot in &fields.upload_slots {
        buf.put_u8(slot.hour);
        buf.put_u8(slot.minute);
    }
    buf.put_u8(fields.network_type.into());
    buf.put_u8(fields.display_type.into());
    for mac in macs {
        buf.put_slice(mac);
    }
    buf.put_slice(&fields.system_time.to_bytes());
    buf.put_u8(fields.week);
    buf.put_u8(fields.open_clock.hour);
    buf.put_u8(fields.open_clock.minute);
    buf.put_u8(fields.close_clock.hour);
    buf.put_u8(fields.close_clock.minute);
}

/// Configuration query sent by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRequest {
    pub serial_number: [u8; 4],
    pub macs: Macs,
    pub fields: SettingFields,
    pub checksum: u16,
}

impl SettingRequest {
    /// Decode a `getsetting` data block
    ///
    /// # Errors
    ///
    /// - [`Error::WrongLength`] unless `data` is exactly 53 bytes
    /// - [`Error::ChecksumMismatch`] when bytes 51..53 disagree with the
    ///   checksum of bytes 0..51
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != SETTING_REQUEST_SIZE {
            return Err(Error::WrongLength {
                frame: "setting request",
                expected: SETTING_REQUEST_SIZE,
                actual: data.len(),
            });
        }

        let checksum = checksum::verify_trailer(data)?;
        let (serial_number, macs, fields) = read_layout(&data[..LAYOUT_SIZE]);

        let request = Self {
            serial_number,
            macs,
            fields,
            checksum,
        };

        debug!(
            serial = %hex::encode_upper(request.serial_number),
            time = %request.fields.system_time,
            "Decoded setting request"
        );

        Ok(request)
    }

    /// Encode the request (as the device would send it)
    pub fn encode(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(SETTING_REQUEST_SIZE);
        put_layout(&mut buf, &self.serial_number, &self.macs, &self.fields);
        let crc = checksum::calculate(&buf)?;
        buf.put_u16(crc);
        Ok(buf)
    }

    /// Build the confirming response to this request
    ///
    /// `flag` is the request flag as parsed from the envelope; the response
    /// carries it byte-swapped. Serial number and MAC addresses are zeroed,
    /// every setting is echoed and the tag starts as
    /// [`RespondingType::Confirmation`].
    pub fn response(&self, flag: u16) -> SettingResponse {
        SettingResponse {
            responding_type: RespondingType::Confirmation,
            flag: flag.swap_bytes(),
            serial_number: [0; 4],
            macs: [[0; MAC_SIZE]; 3],
            fields: self.fields,
            reserved: [0; 2],
        }
    }
}

/// Server answer to a configuration query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingResponse {
    pub responding_type: RespondingType,

    /// Flag exactly as written on the wire (already byte-swapped)
    pub flag: u16,

    pub serial_number: [u8; 4],
    pub macs: Macs,
    pub fields: SettingFields,
    pub reserved: [u8; 2],
}

impl SettingResponse {
    /// Encode to the 58-byte wire form with a fresh checksum
    ///
    /// # Examples
    ///
    /// ```
    /// use hpcount_core::{Envelope, SettingRequest};
    ///
    /// let envelope = Envelope::parse(
    ///     "cmd=getsetting&flag=022E&data=0D3BB382030000000000000000000000000002085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA0F010100022E010000173B80C0",
    /// ).unwrap();
    /// let request = SettingRequest::decode(&envelope.data[0]).unwrap();
    /// let frame = request.response(envelope.flag).encode().unwrap();
    ///
    /// assert_eq!(frame.len(), 58);
    /// assert_eq!(&frame[..3], &[0x05, 0x2E, 0x02]);
    /// ```
    pub fn encode(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(SETTING_RESPONSE_SIZE);
        buf.put_u8(self.responding_type.into());
        buf.put_u16(self.flag);
        put_layout(&mut buf, &self.serial_number, &self.macs, &self.fields);
        buf.put_slice(&self.reserved);

        let crc = checksum::calculate(&buf)?;
        buf.put_u16(crc);

        debug!(
            responding_type = %self.responding_type,
            checksum = format!("0x{:04X}", crc),
            "Encoded setting response"
        );

        Ok(buf)
    }

    /// Decode a 58-byte response frame
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != SETTING_RESPONSE_SIZE {
            return Err(Error::WrongLength {
                frame: "setting response",
                expected: SETTING_RESPONSE_SIZE,
                actual: data.len(),
            });
        }

        checksum::verify_trailer(data)?;
        let (serial_number, macs, fields) = read_layout(&data[3..3 + LAYOUT_SIZE]);

        Ok(Self {
            responding_type: RespondingType::from(data[0]),
            flag: u16::from_be_bytes([data[1], data[2]]),
            serial_number,
            macs,
            fields,
            reserved: [data[54], data[55]],
        })
    }
}

impl fmt::Display for SettingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SettingResponse[{}](flag=0x{:04X}, time={}, hours={}-{})",
            self.responding_type,
            self.flag,
            self.fields.system_time,
            self.fields.open_clock,
            self.fields.close_clock
        )
    }
}

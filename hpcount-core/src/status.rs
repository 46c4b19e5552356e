//! Device status block carried in the `status` field of cache requests

use std::fmt;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::{
    checksum,
    constants::{CHECKSUM_SIZE, DEVICE_STATUS_SIZE},
    error::{Error, Result},
};

/// Device status
///
/// # Layout
///
/// ```text
/// status=010142AE51520156000D0001E6A7
///
/// 0101      firmware version 1.1
/// 42AE5152  serial number, low byte first (device label 5251AE42)
/// 01        focus
/// 56        transmitter battery, 86%
/// 00        reserved
/// 0D        counter battery, 13%
/// 00        charge state
/// 01        reserved
/// E6A7      checksum over the first 12 bytes
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub version: u16,
    pub serial_number: u32,
    pub focus: u8,
    pub transmitter_battery: u8,
    pub reserved_1: u8,
    pub counter_battery: u8,
    pub charge: u8,
    pub reserved_2: u8,
    pub checksum: u16,
}

impl DeviceStatus {
    /// Bytes covered by the checksum
    pub const BODY_SIZE: usize = DEVICE_STATUS_SIZE - CHECKSUM_SIZE;

    /// Parse the block without checking its checksum
    ///
    /// Use [`DeviceStatus::verify`] before trusting the values.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != DEVICE_STATUS_SIZE {
            return Err(Error::WrongLength {
                frame: "device status",
                expected: DEVICE_STATUS_SIZE,
                actual: data.len(),
            });
        }

        let status = Self {
            version: BigEndian::read_u16(&data[0..2]),
            serial_number: LittleEndian::read_u32(&data[2..6]),
            focus: data[6],
            transmitter_battery: data[7],
            reserved_1: data[8],
            counter_battery: data[9],
            charge: data[10],
            reserved_2: data[11],
            checksum: BigEndian::read_u16(&data[12..14]),
        };

        trace!(?status, "Decoded device status");

        Ok(status)
    }

    /// Parse the hex text of a `status` field
    pub fn from_hex(text: &str) -> Result<Self> {
        let data = hex::decode(text)
            .map_err(|e| Error::MalformedEnvelope(format!("status is not hex: {}", e)))?;
        Self::decode(&data)
    }

    /// The 12 bytes covered by the checksum, in wire order
    pub fn body(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(DEVICE_STATUS_SIZE);
        buf.put_u16(self.version);
        buf.put_u32_le(self.serial_number);
        buf.put_u8(self.focus);
        buf.put_u8(self.transmitter_battery);
        buf.put_u8(self.reserved_1);
        buf.put_u8(self.counter_battery);
        buf.put_u8(self.charge);
        buf.put_u8(self.reserved_2);
        buf
    }

    /// Encode the block including the stored checksum
    pub fn encode(&self) -> BytesMut {
        let mut buf = self.body();
        buf.put_u16(self.checksum);
        buf
    }

    /// Recompute the checksum and compare it with the declared one
    pub fn verify(&self) -> Result<()> {
        let expected = checksum::calculate(&self.body())?;
        if expected != self.checksum {
            return Err(Error::ChecksumMismatch {
                expected,
                received: self.checksum,
            });
        }
        Ok(())
    }

    /// Serial number as printed on the device
    pub fn serial_label(&self) -> String {
        format!("{:08X}", self.serial_number)
    }

    /// Firmware version as `major.minor`
    pub fn firmware(&self) -> String {
        format!("{}.{}", self.version >> 8, self.version & 0xFF)
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device[SN: {}, FW: {}, TX battery: {}%, counter battery: {}%]",
            self.serial_label(),
            self.firmware(),
            self.transmitter_battery,
            self.counter_battery
        )
    }
}

//! HPC015 checksum algorithm
//!
//! A reflected CRC-16 (polynomial 0xA001, initial value 0xFFFF), the same
//! register computation as CRC-16/MODBUS. Unlike Modbus the device writes
//! the register high byte first.

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use crate::{
    constants::{CHECKSUM_SIZE, MAX_CHECKSUM_SPAN},
    error::{Error, Result},
};

/// Calculate the checksum of `data`
///
/// # Algorithm
///
/// ```text
/// 1. crc = 0xFFFF
/// 2. For each byte: crc ^= byte, then 8 times:
///      crc = crc & 1 ? (crc >> 1) ^ 0xA001 : crc >> 1
/// 3. Return crc (sent as [crc >> 8, crc & 0xFF])
/// ```
///
/// # Errors
///
/// Fails when `data` is longer than [`MAX_CHECKSUM_SPAN`]: no frame ever
/// checksums more than that.
///
/// # Examples
///
/// ```
/// use hpcount_core::checksum;
///
/// let crc = checksum::calculate(b"123456789").unwrap();
/// assert_eq!(crc, 0x4B37);
/// ```
pub fn calculate(data: &[u8]) -> Result<u16> {
    if data.len() > MAX_CHECKSUM_SPAN {
        return Err(Error::ChecksumSpanTooLong {
            size: data.len(),
            max: MAX_CHECKSUM_SPAN,
        });
    }

    let mut crc: u16 = 0xFFFF;

    for &byte in data {
        crc ^= u16::from(byte);

        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }

    trace!(
        len = data.len(),
        checksum = format!("0x{:04X}", crc),
        "Calculated checksum"
    );

    Ok(crc)
}

/// Verify checksum
pub fn verify(data: &[u8], expected: u16) -> Result<bool> {
    Ok(calculate(data)? == expected)
}

/// Check the trailing checksum of a complete frame
///
/// The last two bytes of `frame` are the declared checksum (big-endian) and
/// everything before them is covered by it. Returns the verified checksum.
pub fn verify_trailer(frame: &[u8]) -> Result<u16> {
    if frame.len() < CHECKSUM_SIZE {
        return Err(Error::WrongLength {
            frame: "checksummed frame",
            expected: CHECKSUM_SIZE,
            actual: frame.len(),
        });
    }

    let (body, trailer) = frame.split_at(frame.len() - CHECKSUM_SIZE);
    let received = BigEndian::read_u16(trailer);
    let expected = calculate(body)?;

    if expected != received {
        return Err(Error::ChecksumMismatch { expected, received });
    }

    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SETTING_BODY: &str = "0D3BB382030000000000000000000000000002085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA0F010100022E010000173B";

    #[test]
    fn test_checksum_reference_value() {
        // CRC-16/MODBUS check value
        assert_eq!(calculate(b"123456789").unwrap(), 0x4B37);
    }

    #[test]
    fn test_checksum_empty() {
        assert_eq!(calculate(&[]).unwrap(), 0xFFFF);
    }

    #[test]
    fn test_checksum_setting_request() {
        let body = hex::decode(SETTING_BODY).unwrap();
        assert_eq!(body.len(), 51);
        assert_eq!(calculate(&body).unwrap(), 0x80C0);
    }

    #[test]
    fn test_checksum_captured_frames() {
        let cases: [(&str, u16); 4] = [
            ("0D3BB382030000000000000000000000000002085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA0F0101000002010000173B", 0xECE4),
            ("0D3BB382030000000000000000000000000000085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA1506020E012B000000173B", 0x6B46),
            ("15050D0D332A000100000000000000", 0xE97E),
            ("15050D0D332C000000000001000000", 0xC65E),
        ];

        for (input, expected) in cases {
            let data = hex::decode(input).unwrap();
            assert_eq!(calculate(&data).unwrap(), expected, "checksum of {}", input);
        }
    }

    #[test]
    fn test_checksum_setting_response() {
        let mut frame = vec![0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x0A, 0x78];
        frame.extend_from_slice(&[0x00; 10]);
        frame.push(0x02);
        frame.extend_from_slice(&[0x00; 21]);
        frame.extend_from_slice(&[0x11, 0x03, 0x05, 0x11, 0x11, 0x26, 0x00, 0x0A, 0x00, 0x14, 0x1E, 0x00, 0x00]);
        assert_eq!(frame.len(), 56);

        assert_eq!(calculate(&frame).unwrap(), 0x9351);
    }

    #[test]
    fn test_checksum_span_limit() {
        assert!(calculate(&[0xAB; MAX_CHECKSUM_SPAN]).is_ok());

        let result = calculate(&[0xAB; MAX_CHECKSUM_SPAN + 1]);
        assert!(matches!(
            result,
            Err(Error::ChecksumSpanTooLong { size: 79, max: 78 })
        ));
    }

    #[test]
    fn test_checksum_order_sensitive() {
        let a = [0x01, 0x02, 0x03];
        let b = [0x04, 0x05];

        let ab = calculate(&[&a[..], &b[..]].concat()).unwrap();
        let ba = calculate(&[&b[..], &a[..]].concat()).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_checksum_verify() {
        let payload = [0xAB, 0xCD];
        let crc = calculate(&payload).unwrap();

        assert!(verify(&payload, crc).unwrap());
        assert!(!verify(&payload, crc.wrapping_add(1)).unwrap());
    }

    #[test]
    fn test_verify_trailer() {
        let mut frame = hex::decode(SETTING_BODY).unwrap();
        frame.extend_from_slice(&[0x80, 0xC0]);
        assert_eq!(verify_trailer(&frame).unwrap(), 0x80C0);

        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert!(matches!(
            verify_trailer(&frame),
            Err(Error::ChecksumMismatch { expected: 0x80C0, received: 0x803F })
        ));
    }

    #[test]
    fn test_verify_trailer_too_short() {
        assert!(matches!(verify_trailer(&[0x01]), Err(Error::WrongLength { .. })));
    }

    proptest! {
        #[test]
        fn prop_trailer_accepts_own_checksum(data in prop::collection::vec(any::<u8>(), 0..=MAX_CHECKSUM_SPAN)) {
            let crc = calculate(&data).unwrap();
            let mut frame = data.clone();
            frame.extend_from_slice(&crc.to_be_bytes());
            prop_assert_eq!(verify_trailer(&frame).unwrap(), crc);
        }

        #[test]
        fn prop_single_bit_flip_detected(
            data in prop::collection::vec(any::<u8>(), 1..=MAX_CHECKSUM_SPAN),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut flipped = data.clone();
            let i = index.index(flipped.len());
            flipped[i] ^= 1 << bit;
            prop_assert_ne!(calculate(&data).unwrap(), calculate(&flipped).unwrap());
        }
    }
}

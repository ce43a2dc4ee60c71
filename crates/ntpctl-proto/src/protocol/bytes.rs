use crate::error::ParseError;

use super::{ConstPackedSizeBytes, FromBytes, ShortFormat, TimestampFormat, ToBytes, check_len};

// Both fixed-point formats are a big-endian seconds half followed by a
// big-endian fraction half of the same width.

fn split<const N: usize>(buf: &[u8]) -> Result<([u8; N], [u8; N]), ParseError> {
    check_len(buf, 2 * N)?;
    let mut hi = [0u8; N];
    let mut lo = [0u8; N];
    hi.copy_from_slice(&buf[..N]);
    lo.copy_from_slice(&buf[N..2 * N]);
    Ok((hi, lo))
}

fn join(buf: &mut [u8], hi: &[u8], lo: &[u8]) -> Result<usize, ParseError> {
    let len = hi.len() + lo.len();
    check_len(buf, len)?;
    buf[..hi.len()].copy_from_slice(hi);
    buf[hi.len()..len].copy_from_slice(lo);
    Ok(len)
}

impl FromBytes for ShortFormat {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        let (seconds, fraction) = split::<2>(buf)?;
        let value = ShortFormat {
            seconds: u16::from_be_bytes(seconds),
            fraction: u16::from_be_bytes(fraction),
        };
        Ok((value, Self::PACKED_SIZE_BYTES))
    }
}

impl FromBytes for TimestampFormat {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        let (seconds, fraction) = split::<4>(buf)?;
        let value = TimestampFormat {
            seconds: u32::from_be_bytes(seconds),
            fraction: u32::from_be_bytes(fraction),
        };
        Ok((value, Self::PACKED_SIZE_BYTES))
    }
}

impl ToBytes for ShortFormat {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        join(buf, &self.seconds.to_be_bytes(), &self.fraction.to_be_bytes())
    }
}

impl ToBytes for TimestampFormat {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        join(buf, &self.seconds.to_be_bytes(), &self.fraction.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_short_buffer() {
        assert_eq!(
            TimestampFormat::from_bytes(&[0u8; 7]),
            Err(ParseError::BufferTooShort {
                needed: 8,
                available: 7
            })
        );
        let mut out = [0u8; 3];
        assert!(ShortFormat::default().to_bytes(&mut out).is_err());
    }

    #[test]
    fn timestamp_to_bytes_is_big_endian() {
        let ts = TimestampFormat {
            seconds: 0x0102_0304,
            fraction: 0x0506_0708,
        };
        let mut buf = [0u8; 10];
        assert_eq!(ts.to_bytes(&mut buf), Ok(8));
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8, 0, 0]);
    }

    #[test]
    fn short_format_ignores_trailing_bytes() {
        let (sf, used) = ShortFormat::from_bytes(&[0x00, 0x02, 0x80, 0x00, 0xff]).unwrap();
        assert_eq!(used, 4);
        assert_eq!(sf.as_unsigned_seconds(), 2.5);
    }
}

// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Symmetric-key authentication of state-changing requests.
//!
//! Both management protocols authenticate a request by appending the key id
//! (big-endian `u32`) and `MD5(key || request)`. Mode 6 zero-pads the request
//! to an 8-byte boundary first. Mode 7 sends a fixed-size request whose final
//! 8 bytes hold a transmit timestamp the daemon checks for replay.

use crate::error::ParseError;
use crate::protocol::md5::{DIGEST_LEN, keyed_digest};
use crate::protocol::private::AUTH_BIT;
use crate::protocol::{ConstPackedSizeBytes, TimestampFormat, ToBytes, check_len};
use crate::unix_time::Instant;

/// Length of the key id field.
pub const KEY_ID_LEN: usize = 4;

/// Length of the key id and digest appended to an authenticated request.
pub const MAC_LEN: usize = KEY_ID_LEN + DIGEST_LEN;

/// Longest key value accepted.
pub const MAX_KEY_LEN: usize = 32;

/// Added to the transmit timestamp of mode 7 requests (about 20 ms).
pub const REQUEST_DELAY: TimestampFormat = TimestampFormat {
    seconds: 0,
    fraction: 0x051E_B852,
};

/// A key id and key value used to sign requests.
#[derive(Clone, Eq, PartialEq)]
pub struct Authenticator {
    key_id: u32,
    key: Vec<u8>,
}

impl core::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Authenticator")
            .field("key_id", &self.key_id)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Authenticator {
    /// Create an authenticator. Key id 0 is reserved to mean "no key" and is
    /// rejected, as are empty keys and keys longer than [`MAX_KEY_LEN`].
    pub fn new(key_id: u32, key: impl Into<Vec<u8>>) -> Result<Self, ParseError> {
        let key = key.into();
        if key_id == 0 || key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(ParseError::InvalidKey);
        }
        Ok(Authenticator { key_id, key })
    }

    /// The key id.
    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    fn append_mac(&self, buf: &mut [u8], len: usize) -> Result<usize, ParseError> {
        check_len(buf, len + MAC_LEN)?;
        let digest = keyed_digest(&self.key, &buf[..len]);
        buf[len..len + KEY_ID_LEN].copy_from_slice(&self.key_id.to_be_bytes());
        buf[len + KEY_ID_LEN..len + MAC_LEN].copy_from_slice(&digest);
        Ok(len + MAC_LEN)
    }

    /// Sign an encoded mode 6 request of `len` bytes in place.
    ///
    /// Returns the length of the signed request.
    pub fn sign_control(&self, buf: &mut [u8], len: usize) -> Result<usize, ParseError> {
        let padded = (len + 7) & !7;
        check_len(buf, padded)?;
        buf[len..padded].fill(0);
        self.append_mac(buf, padded)
    }

    /// Sign an encoded mode 7 request of `request_size` bytes in place,
    /// stamping it with `now` plus [`REQUEST_DELAY`].
    ///
    /// Returns the length of the signed request.
    pub fn sign_private(
        &self,
        buf: &mut [u8],
        request_size: usize,
        now: Instant,
    ) -> Result<usize, ParseError> {
        let stamp_len = TimestampFormat::PACKED_SIZE_BYTES;
        if request_size < crate::protocol::private::HEADER_LEN + stamp_len {
            return Err(ParseError::BufferTooShort {
                needed: crate::protocol::private::HEADER_LEN + stamp_len,
                available: request_size,
            });
        }
        check_len(buf, request_size)?;
        buf[1] |= AUTH_BIT;
        let stamp = TimestampFormat::from(now).wrapping_add(REQUEST_DELAY);
        stamp.to_bytes(&mut buf[request_size - stamp_len..request_size])?;
        self.append_mac(buf, request_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unusable_keys() {
        assert_eq!(Authenticator::new(0, "secret"), Err(ParseError::InvalidKey));
        assert_eq!(Authenticator::new(1, ""), Err(ParseError::InvalidKey));
        assert_eq!(
            Authenticator::new(1, vec![b'k'; MAX_KEY_LEN + 1]),
            Err(ParseError::InvalidKey)
        );
        assert!(Authenticator::new(1, vec![b'k'; MAX_KEY_LEN]).is_ok());
    }

    #[test]
    fn debug_hides_key() {
        let auth = Authenticator::new(5, "hunter2").unwrap();
        let text = format!("{auth:?}");
        assert!(text.contains("key_id: 5"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn control_signature_pads_to_eight() {
        let auth = Authenticator::new(0x0102_0304, "key").unwrap();
        let mut buf = [0xEEu8; 64];
        buf[..20].fill(0x11);
        let len = auth.sign_control(&mut buf, 20).unwrap();
        assert_eq!(len, 24 + MAC_LEN);
        assert_eq!(&buf[20..24], &[0, 0, 0, 0]);
        assert_eq!(&buf[24..28], &[1, 2, 3, 4]);
        assert_eq!(&buf[28..44], &keyed_digest(b"key", &buf[..24]));
    }

    #[test]
    fn control_signature_already_aligned() {
        let auth = Authenticator::new(1, "key").unwrap();
        let mut buf = [0u8; 64];
        assert_eq!(auth.sign_control(&mut buf, 16).unwrap(), 36);
    }

    #[test]
    fn private_signature_layout() {
        let auth = Authenticator::new(7, "key").unwrap();
        let mut buf = [0u8; 256];
        buf[0] = 0x17;
        let now = Instant::new(1_704_067_200, 0);
        let len = auth.sign_private(&mut buf, 188, now).unwrap();
        assert_eq!(len, 208);
        assert_eq!(buf[1] & AUTH_BIT, AUTH_BIT);
        let (stamp, _) =
            <TimestampFormat as crate::protocol::FromBytes>::from_bytes(&buf[180..188]).unwrap();
        assert_eq!(stamp.seconds, 3_913_056_000);
        assert_eq!(stamp.fraction, 0x051E_B852);
        assert_eq!(&buf[188..192], &7u32.to_be_bytes());
        assert_eq!(&buf[192..208], &keyed_digest(b"key", &buf[..188]));
    }

    #[test]
    fn private_signature_buffer_too_short() {
        let auth = Authenticator::new(7, "key").unwrap();
        let mut buf = [0u8; 100];
        assert!(auth.sign_private(&mut buf, 188, Instant::now()).is_err());
        assert!(auth.sign_private(&mut buf, 12, Instant::now()).is_err());
    }
}

// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error types for buffer-based mode 6 and mode 7 packet parsing and serialization.
//!
//! [`ParseError`] uses no heap allocation. It implements [`std::error::Error`] and
//! can be converted to [`std::io::Error`].

use core::fmt;

/// Errors that can occur while encoding or decoding NTP daemon control packets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The buffer is too short for the expected data.
    BufferTooShort {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// An invalid or unrecognized field value was encountered.
    InvalidField {
        /// Name of the field that was invalid.
        field: &'static str,
        /// The invalid value.
        value: u32,
    },
    /// A request payload does not fit in the protocol's data area.
    PayloadTooLarge {
        /// Size of the payload supplied.
        size: usize,
        /// Largest payload the packet can carry.
        max: usize,
    },
    /// A mode 6 text value could not be interpreted.
    InvalidText {
        /// Name of the variable being parsed.
        field: &'static str,
    },
    /// Authentication was requested but the key is unusable.
    InvalidKey,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParseError::BufferTooShort { needed, available } => {
                write!(f, "buffer too short: needed {needed} bytes, got {available}")
            }
            ParseError::InvalidField { field, value } => write!(f, "invalid {field} value: {value}"),
            ParseError::PayloadTooLarge { size, max } => {
                write!(f, "payload of {size} bytes exceeds data area of {max}")
            }
            ParseError::InvalidText { field } => write!(f, "unparseable text value for {field}"),
            ParseError::InvalidKey => f.write_str("authentication key id or value is invalid"),
        }
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    fn io_kind(&self) -> std::io::ErrorKind {
        use std::io::ErrorKind;
        match self {
            ParseError::BufferTooShort { .. } => ErrorKind::UnexpectedEof,
            ParseError::InvalidField { .. } | ParseError::InvalidText { .. } => {
                ErrorKind::InvalidData
            }
            ParseError::PayloadTooLarge { .. } => ErrorKind::InvalidInput,
            ParseError::InvalidKey => ErrorKind::PermissionDenied,
        }
    }
}

impl From<ParseError> for std::io::Error {
    fn from(err: ParseError) -> std::io::Error {
        std::io::Error::new(err.io_kind(), err)
    }
}

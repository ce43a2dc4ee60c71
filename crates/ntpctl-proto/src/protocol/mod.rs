//! Wire types and constants for the ntpd management protocols.
//!
//! Provides `ReadBytes` and `WriteBytes` implementations which extend the byteorder crate
//! `WriteBytesExt` and `ReadBytesExt` traits with the ability to read and write mode 7 data
//! items, and slice-based `FromBytes` / `ToBytes` for the mode 6 and mode 7 headers.
//!
//! - [`control`]: mode 6 (`ntpq`) header, opcodes and error codes.
//! - [`private`]: mode 7 (`ntpdc`) header, request codes and data items.
//! - [`vars`]: the `name=value` text carried by mode 6 variable reads.

/// NTP port number.
pub const PORT: u16 = 123;

/// Size of the buffer that fragmented responses are reassembled into.
pub const MAX_RESPONSE_LEN: usize = 4096;

/// Largest number of peers reported to callers.
pub const MAX_PEERS: usize = 32;

mod bytes;
mod io;
mod traits;
mod types;

pub mod control;
pub mod md5;
pub mod private;
pub mod vars;

pub(crate) use self::io::{read_ipv4, read_ipv6, skip, write_zeros};
pub(crate) use self::traits::check_len;
pub use self::traits::{
    ConstPackedSizeBytes, FromBytes, ReadBytes, ReadFromBytes, ToBytes, WriteBytes, WriteToBytes,
};
pub use self::types::*;

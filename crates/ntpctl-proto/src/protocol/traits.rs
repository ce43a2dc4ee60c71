use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io;

use crate::error::ParseError;

// Mode 7 data items are fixed-layout records inside a response's data area.
// They are read from and written to any byteorder stream, so a record can be
// decoded straight from the slot slice of a reassembled response.

/// Write a mode 7 data item. Blanket-implemented for every
/// `byteorder::WriteBytesExt`.
pub trait WriteBytes {
    /// Append `item` to the stream, fields in network order.
    fn write_bytes<P: WriteToBytes>(&mut self, item: P) -> io::Result<()>;
}

/// Read a mode 7 data item. Blanket-implemented for every
/// `byteorder::ReadBytesExt`.
pub trait ReadBytes {
    /// Take the next `P` from the stream.
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P>;
}

/// A request item the client sends.
pub trait WriteToBytes {
    /// Encode the item, padding included.
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()>;
}

/// A record the daemon returns.
pub trait ReadFromBytes: Sized {
    /// Decode one record, consuming exactly its packed size.
    fn read_from_bytes<R: ReadBytesExt>(reader: R) -> io::Result<Self>;
}

/// Fixed on-wire size of a header, record or item.
pub trait ConstPackedSizeBytes {
    /// Bytes occupied on the wire.
    const PACKED_SIZE_BYTES: usize;
}

// Headers are decoded in place from the front of a received datagram.

/// Decode a value from the front of a datagram.
pub trait FromBytes: Sized {
    /// Returns the value and how many bytes of `buf` it used.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError>;
}

/// Encode a value into the front of a send buffer.
pub trait ToBytes {
    /// Returns how many bytes were written, or
    /// [`ParseError::BufferTooShort`] when `buf` cannot hold the value.
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError>;
}

pub(crate) fn check_len(buf: &[u8], needed: usize) -> Result<(), ParseError> {
    match buf.len() {
        available if available < needed => Err(ParseError::BufferTooShort { needed, available }),
        _ => Ok(()),
    }
}

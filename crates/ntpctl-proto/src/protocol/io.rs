use byteorder::{BE, ReadBytesExt, WriteBytesExt};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::{ReadBytes, ReadFromBytes, ShortFormat, TimestampFormat, WriteBytes, WriteToBytes};

// Mode 7 records are read from and written to any byteorder stream.

impl<W> WriteBytes for W
where
    W: WriteBytesExt,
{
    fn write_bytes<P: WriteToBytes>(&mut self, item: P) -> io::Result<()> {
        item.write_to_bytes(self)
    }
}

impl<R> ReadBytes for R
where
    R: ReadBytesExt,
{
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P> {
        P::read_from_bytes(self)
    }
}

// Root delay and dispersion (`s_fp`/`u_fp`) inside records.
impl ReadFromBytes for ShortFormat {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        Ok(ShortFormat {
            seconds: reader.read_u16::<BE>()?,
            fraction: reader.read_u16::<BE>()?,
        })
    }
}

// Offsets and reference times (`l_fp`) inside records.
impl ReadFromBytes for TimestampFormat {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        Ok(TimestampFormat {
            seconds: reader.read_u32::<BE>()?,
            fraction: reader.read_u32::<BE>()?,
        })
    }
}

// IPv4 addresses are stored as the raw `s_addr`, which is already network
// order.
pub(crate) fn read_ipv4<R: ReadBytesExt>(mut reader: R) -> io::Result<Ipv4Addr> {
    Ok(Ipv4Addr::from(reader.read_u32::<BE>()?))
}

pub(crate) fn read_ipv6<R: ReadBytesExt>(mut reader: R) -> io::Result<Ipv6Addr> {
    let mut octets = [0u8; 16];
    reader.read_exact(&mut octets)?;
    Ok(Ipv6Addr::from(octets))
}

/// Skip fields this client does not use.
pub(crate) fn skip<R: ReadBytesExt>(mut reader: R, count: usize) -> io::Result<()> {
    for _ in 0..count {
        reader.read_u8()?;
    }
    Ok(())
}

pub(crate) fn write_zeros<W: WriteBytesExt>(mut writer: W, count: usize) -> io::Result<()> {
    for _ in 0..count {
        writer.write_u8(0)?;
    }
    Ok(())
}

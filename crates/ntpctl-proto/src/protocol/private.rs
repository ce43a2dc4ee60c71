// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Mode 7 (private, `ntpdc`) wire format.
//!
//! A request is a fixed 8-byte header, a 176-byte data area holding
//! `nitems` items of `itemsize` bytes each, and a trailing timestamp word.
//! Older daemons only accept shorter requests, see [`LEGACY_REQUEST_SIZES`].
//!
//! ### Header layout
//!
//! ```ignore
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |R|M| VN  |Mode |A|  Sequence   |Implementation |   Req Code    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  Err  |      Number of data items |  MBZ  |   Size of data item   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Data items are decoded with [`ReadFromBytes`] from a slot that the
//! reassembler has zero-padded to the full record size, so items sent by
//! daemons without IPv6 support decode with the IPv6 fields zeroed.

use core::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use byteorder::{BE, ReadBytesExt, WriteBytesExt};

use crate::error::ParseError;

use super::{
    ConstPackedSizeBytes, FromBytes, ReadFromBytes, ShortFormat, TimestampFormat, ToBytes,
    Version, WriteToBytes, check_len, read_ipv4, read_ipv6, skip, write_zeros,
};

/// Mode value for private messages.
pub const MODE_PRIVATE: u8 = 7;

/// Implementation number of the reference daemon (`IMPL_XNTPD`).
pub const IMPL_XNTPD: u8 = 3;

/// Length of the request and response header.
pub const HEADER_LEN: usize = 8;

/// Size of the request data area.
pub const REQUEST_DATA_LEN: usize = 176;

/// Request length without a MAC: header, data area and timestamp word.
pub const REQUEST_LEN_NOMAC: usize = 188;

/// Request sizes tried in turn against daemons that reject the current one.
pub const LEGACY_REQUEST_SIZES: [usize; 3] = [REQUEST_LEN_NOMAC, 160, 48];

/// Largest data area of a response datagram.
pub const RESPONSE_DATA_LEN: usize = 500;

/// Largest sequence number of a response fragment.
pub const MAX_SEQUENCE: u8 = 127;

/// Response bit in the first header byte.
pub const RESPONSE_BIT: u8 = 0x80;
/// More bit in the first header byte.
pub const MORE_BIT: u8 = 0x40;
/// Authenticated bit in the second header byte.
pub const AUTH_BIT: u8 = 0x80;
/// Sequence mask in the second header byte.
pub const SEQUENCE_MASK: u8 = 0x7f;

/// System flag: NTP discipline enabled.
pub const SYS_FLAG_NTP: u32 = 0x04;
/// System flag: kernel discipline enabled.
pub const SYS_FLAG_KERNEL: u32 = 0x08;

/// `info_sys` flag: NTP discipline enabled.
pub const INFO_FLAG_NTP: u8 = 0x04;
/// `info_sys` flag: kernel discipline enabled.
pub const INFO_FLAG_KERNEL: u8 = 0x08;

/// Peer summary flag: this is the system peer.
pub const INFO_FLAG_SYSPEER: u8 = 0x02;
/// Peer summary flag: this peer is a reference clock.
pub const INFO_FLAG_REFCLOCK: u8 = 0x08;
/// Peer summary flag: this peer survived clustering.
pub const INFO_FLAG_SHORTLIST: u8 = 0x80;

/// Association mode of a peer we poll as a client.
pub const MODE_CLIENT: u8 = 3;

/// Mode 7 request codes used by this client.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum RequestCode {
    /// List of peers.
    PeerList = 0,
    /// Summary of every peer.
    PeerListSummary = 1,
    /// Full information about specific peers.
    PeerInfo = 2,
    /// Packet statistics for specific peers.
    PeerStats = 3,
    /// System information.
    SysInfo = 4,
    /// Set system flags.
    SetSysFlag = 12,
    /// Clear system flags.
    ClearSysFlag = 13,
}

impl TryFrom<u8> for RequestCode {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RequestCode::PeerList),
            1 => Ok(RequestCode::PeerListSummary),
            2 => Ok(RequestCode::PeerInfo),
            3 => Ok(RequestCode::PeerStats),
            4 => Ok(RequestCode::SysInfo),
            12 => Ok(RequestCode::SetSysFlag),
            13 => Ok(RequestCode::ClearSysFlag),
            _ => Err(ParseError::InvalidField {
                field: "request code",
                value: u32::from(value),
            }),
        }
    }
}

/// Error codes in the top four bits of a response's `err_nitems` word.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum InfoError {
    /// Implementation mismatch. Older daemons also answer this to requests
    /// larger than they expect.
    Implementation,
    /// Unknown request code.
    Request,
    /// Badly formatted request.
    Format,
    /// No data for this request.
    NoData,
    /// Authentication failure.
    Auth,
    /// A code this client does not know.
    Unknown(u8),
}

impl InfoError {
    /// Decode a non-zero error code. Zero is success and yields `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(InfoError::Implementation),
            2 => Some(InfoError::Request),
            3 => Some(InfoError::Format),
            4 => Some(InfoError::NoData),
            7 => Some(InfoError::Auth),
            other => Some(InfoError::Unknown(other)),
        }
    }

    /// The raw error code.
    pub fn code(self) -> u8 {
        match self {
            InfoError::Implementation => 1,
            InfoError::Request => 2,
            InfoError::Format => 3,
            InfoError::NoData => 4,
            InfoError::Auth => 7,
            InfoError::Unknown(code) => code,
        }
    }
}

impl fmt::Display for InfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoError::Implementation => write!(f, "implementation mismatch"),
            InfoError::Request => write!(f, "unknown request code"),
            InfoError::Format => write!(f, "badly formatted request"),
            InfoError::NoData => write!(f, "no data available"),
            InfoError::Auth => write!(f, "authentication failure"),
            InfoError::Unknown(code) => write!(f, "unknown error code {code}"),
        }
    }
}

impl std::error::Error for InfoError {}

/// The 8-byte mode 7 header shared by requests and responses.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PrivateHeader {
    /// Set on responses.
    pub response: bool,
    /// Set when further fragments follow.
    pub more: bool,
    /// Raw 3-bit version.
    pub version: u8,
    /// Raw 3-bit mode.
    pub mode: u8,
    /// Set on authenticated requests.
    pub auth: bool,
    /// 7-bit fragment sequence number.
    pub sequence: u8,
    /// Implementation number.
    pub implementation: u8,
    /// Raw request code.
    pub request: u8,
    /// 4-bit error code.
    pub err: u8,
    /// 12-bit item count.
    pub nitems: u16,
    /// 4-bit must-be-zero field.
    pub mbz: u8,
    /// 12-bit item size.
    pub itemsize: u16,
}

impl PrivateHeader {
    /// Header for a request carrying `nitems` items of `itemsize` bytes.
    pub fn request(code: RequestCode, auth: bool, nitems: u16, itemsize: u16) -> Self {
        PrivateHeader {
            response: false,
            more: false,
            version: Version::V2.value(),
            mode: MODE_PRIVATE,
            auth,
            sequence: 0,
            implementation: IMPL_XNTPD,
            request: code as u8,
            err: 0,
            nitems,
            mbz: 0,
            itemsize,
        }
    }

    /// Decoded version field.
    pub fn version(&self) -> Version {
        Version::from_bits(self.version)
    }

    /// The daemon error, if any.
    pub fn info_error(&self) -> Option<InfoError> {
        InfoError::from_code(self.err)
    }
}

impl ConstPackedSizeBytes for PrivateHeader {
    const PACKED_SIZE_BYTES: usize = HEADER_LEN;
}

impl FromBytes for PrivateHeader {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        check_len(buf, HEADER_LEN)?;
        let err_nitems = u16::from_be_bytes([buf[4], buf[5]]);
        let mbz_itemsize = u16::from_be_bytes([buf[6], buf[7]]);
        Ok((
            PrivateHeader {
                response: buf[0] & RESPONSE_BIT != 0,
                more: buf[0] & MORE_BIT != 0,
                version: (buf[0] >> 3) & 0b111,
                mode: buf[0] & 0b111,
                auth: buf[1] & AUTH_BIT != 0,
                sequence: buf[1] & SEQUENCE_MASK,
                implementation: buf[2],
                request: buf[3],
                err: (err_nitems >> 12) as u8,
                nitems: err_nitems & 0x0fff,
                mbz: (mbz_itemsize >> 12) as u8,
                itemsize: mbz_itemsize & 0x0fff,
            },
            HEADER_LEN,
        ))
    }
}

impl ToBytes for PrivateHeader {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        check_len(buf, HEADER_LEN)?;
        let mut rm_vn_mode = ((self.version & 0b111) << 3) | (self.mode & 0b111);
        if self.response {
            rm_vn_mode |= RESPONSE_BIT;
        }
        if self.more {
            rm_vn_mode |= MORE_BIT;
        }
        buf[0] = rm_vn_mode;
        buf[1] = (self.sequence & SEQUENCE_MASK) | if self.auth { AUTH_BIT } else { 0 };
        buf[2] = self.implementation;
        buf[3] = self.request;
        let err_nitems = (u16::from(self.err & 0x0f) << 12) | (self.nitems & 0x0fff);
        let mbz_itemsize = (u16::from(self.mbz & 0x0f) << 12) | (self.itemsize & 0x0fff);
        buf[4..6].copy_from_slice(&err_nitems.to_be_bytes());
        buf[6..8].copy_from_slice(&mbz_itemsize.to_be_bytes());
        Ok(HEADER_LEN)
    }
}

/// Usable data bytes in a request of `request_size` bytes.
///
/// Authenticated requests lose the final 8 bytes to the timestamp.
pub fn data_capacity(request_size: usize, authenticate: bool) -> usize {
    let reserved = if authenticate {
        TimestampFormat::PACKED_SIZE_BYTES
    } else {
        0
    };
    request_size
        .saturating_sub(HEADER_LEN + reserved)
        .min(REQUEST_DATA_LEN)
}

/// Encode an unauthenticated-form request of exactly `request_size` bytes.
///
/// `data` holds `nitems` items of `itemsize` bytes. The item size is always
/// sent, even with no items. Authentication is applied afterwards by
/// [`crate::auth::Authenticator::sign_private`].
pub fn encode_request(
    buf: &mut [u8],
    request_size: usize,
    code: RequestCode,
    authenticate: bool,
    nitems: u16,
    itemsize: u16,
    data: &[u8],
) -> Result<usize, ParseError> {
    let max = data_capacity(request_size, authenticate);
    if data.len() > max {
        return Err(ParseError::PayloadTooLarge {
            size: data.len(),
            max,
        });
    }
    check_len(buf, request_size)?;
    buf[..request_size].fill(0);
    PrivateHeader::request(code, authenticate, nitems, itemsize).to_bytes(buf)?;
    buf[HEADER_LEN..HEADER_LEN + data.len()].copy_from_slice(data);
    Ok(request_size)
}

// IPv4 peers carry a zeroed IPv6 field and vice versa.
fn select_address(v6_flag: bool, v4: Ipv4Addr, v6: Ipv6Addr) -> IpAddr {
    if v6_flag {
        IpAddr::V6(v6)
    } else {
        IpAddr::V4(v4)
    }
}

/// System information (`info_sys`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InfoSys {
    /// IPv4 address of the system peer.
    pub peer: Ipv4Addr,
    /// Mode of the system peer.
    pub peer_mode: u8,
    /// Leap indicator.
    pub leap: u8,
    /// System stratum.
    pub stratum: u8,
    /// System precision as a power of two.
    pub precision: i8,
    /// Root delay.
    pub root_delay: ShortFormat,
    /// Root dispersion.
    pub root_dispersion: ShortFormat,
    /// Reference id.
    pub refid: u32,
    /// Reference timestamp.
    pub reftime: TimestampFormat,
    /// Poll interval.
    pub poll: u32,
    /// System flags, see [`INFO_FLAG_NTP`] and [`INFO_FLAG_KERNEL`].
    pub flags: u8,
    /// Whether the peer address is the IPv6 field.
    pub v6_flag: bool,
    /// IPv6 address of the system peer.
    pub peer6: Ipv6Addr,
}

impl InfoSys {
    /// Address of the current system peer.
    pub fn peer_address(&self) -> IpAddr {
        select_address(self.v6_flag, self.peer, self.peer6)
    }

    /// Whether the daemon currently disciplines the clock.
    pub fn clock_control_enabled(&self) -> bool {
        self.flags & (INFO_FLAG_NTP | INFO_FLAG_KERNEL) != 0
    }
}

impl ConstPackedSizeBytes for InfoSys {
    const PACKED_SIZE_BYTES: usize = 80;
}

impl ReadFromBytes for InfoSys {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let peer = read_ipv4(&mut reader)?;
        let peer_mode = reader.read_u8()?;
        let leap = reader.read_u8()?;
        let stratum = reader.read_u8()?;
        let precision = reader.read_i8()?;
        let root_delay = ShortFormat::read_from_bytes(&mut reader)?;
        let root_dispersion = ShortFormat::read_from_bytes(&mut reader)?;
        let refid = reader.read_u32::<BE>()?;
        let reftime = TimestampFormat::read_from_bytes(&mut reader)?;
        let poll = reader.read_u32::<BE>()?;
        let flags = reader.read_u8()?;
        // unused[3], bdelay, frequency, authdelay, stability
        skip(&mut reader, 3 + 4 + 4 + 8 + 4)?;
        let v6_flag = reader.read_u32::<BE>()? != 0;
        skip(&mut reader, 4)?;
        let peer6 = read_ipv6(&mut reader)?;
        Ok(InfoSys {
            peer,
            peer_mode,
            leap,
            stratum,
            precision,
            root_delay,
            root_dispersion,
            refid,
            reftime,
            poll,
            flags,
            v6_flag,
            peer6,
        })
    }
}

/// One entry of the peer list summary (`info_peer_summary`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InfoPeerSummary {
    /// Local address.
    pub dstadr: Ipv4Addr,
    /// Remote address.
    pub srcadr: Ipv4Addr,
    /// Remote port.
    pub srcport: u16,
    /// Peer stratum.
    pub stratum: u8,
    /// Host poll exponent.
    pub hpoll: u8,
    /// Peer poll exponent.
    pub ppoll: u8,
    /// Reachability register.
    pub reach: u8,
    /// Peer flags, see [`INFO_FLAG_SYSPEER`] and friends.
    pub flags: u8,
    /// Association mode.
    pub hmode: u8,
    /// Round-trip delay.
    pub delay: ShortFormat,
    /// Offset as the daemon reports it (reference minus local).
    pub offset: TimestampFormat,
    /// Dispersion.
    pub dispersion: ShortFormat,
    /// Whether the address fields are the IPv6 ones.
    pub v6_flag: bool,
    /// Local IPv6 address.
    pub dstadr6: Ipv6Addr,
    /// Remote IPv6 address.
    pub srcadr6: Ipv6Addr,
}

impl InfoPeerSummary {
    /// Remote address of the peer.
    pub fn remote_address(&self) -> IpAddr {
        select_address(self.v6_flag, self.srcadr, self.srcadr6)
    }

    /// Local address used to reach the peer.
    pub fn local_address(&self) -> IpAddr {
        select_address(self.v6_flag, self.dstadr, self.dstadr6)
    }
}

impl ConstPackedSizeBytes for InfoPeerSummary {
    const PACKED_SIZE_BYTES: usize = 72;
}

impl ReadFromBytes for InfoPeerSummary {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let dstadr = read_ipv4(&mut reader)?;
        let srcadr = read_ipv4(&mut reader)?;
        let srcport = reader.read_u16::<BE>()?;
        let stratum = reader.read_u8()?;
        let hpoll = reader.read_u8()?;
        let ppoll = reader.read_u8()?;
        let reach = reader.read_u8()?;
        let flags = reader.read_u8()?;
        let hmode = reader.read_u8()?;
        let delay = ShortFormat::read_from_bytes(&mut reader)?;
        let offset = TimestampFormat::read_from_bytes(&mut reader)?;
        let dispersion = ShortFormat::read_from_bytes(&mut reader)?;
        let v6_flag = reader.read_u32::<BE>()? != 0;
        skip(&mut reader, 4)?;
        let dstadr6 = read_ipv6(&mut reader)?;
        let srcadr6 = read_ipv6(&mut reader)?;
        Ok(InfoPeerSummary {
            dstadr,
            srcadr,
            srcport,
            stratum,
            hpoll,
            ppoll,
            reach,
            flags,
            hmode,
            delay,
            offset,
            dispersion,
            v6_flag,
            dstadr6,
            srcadr6,
        })
    }
}

/// Packet statistics of one peer (`info_peer_stats`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InfoPeerStats {
    /// Local address.
    pub dstadr: Ipv4Addr,
    /// Remote address.
    pub srcadr: Ipv4Addr,
    /// Remote port.
    pub srcport: u16,
    /// Peer flags.
    pub flags: u16,
    /// Packets sent to the peer.
    pub sent: u32,
    /// Packets processed from the peer.
    pub processed: u32,
    /// Whether the address fields are the IPv6 ones.
    pub v6_flag: bool,
    /// Local IPv6 address.
    pub dstadr6: Ipv6Addr,
    /// Remote IPv6 address.
    pub srcadr6: Ipv6Addr,
}

impl InfoPeerStats {
    /// Remote address the statistics belong to.
    pub fn remote_address(&self) -> IpAddr {
        select_address(self.v6_flag, self.srcadr, self.srcadr6)
    }
}

impl ConstPackedSizeBytes for InfoPeerStats {
    const PACKED_SIZE_BYTES: usize = 120;
}

impl ReadFromBytes for InfoPeerStats {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let dstadr = read_ipv4(&mut reader)?;
        let srcadr = read_ipv4(&mut reader)?;
        let srcport = reader.read_u16::<BE>()?;
        let flags = reader.read_u16::<BE>()?;
        // timereset, timereceived, timetosend, timereachable
        skip(&mut reader, 16)?;
        let sent = reader.read_u32::<BE>()?;
        skip(&mut reader, 4)?;
        let processed = reader.read_u32::<BE>()?;
        // unused2 through candidate and its padding
        skip(&mut reader, 40)?;
        let v6_flag = reader.read_u32::<BE>()? != 0;
        skip(&mut reader, 4)?;
        let dstadr6 = read_ipv6(&mut reader)?;
        let srcadr6 = read_ipv6(&mut reader)?;
        Ok(InfoPeerStats {
            dstadr,
            srcadr,
            srcport,
            flags,
            sent,
            processed,
            v6_flag,
            dstadr6,
            srcadr6,
        })
    }
}

/// Full information about one peer (`info_peer`). Only the fields this
/// client consumes are decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InfoPeer {
    /// Local address.
    pub dstadr: Ipv4Addr,
    /// Remote address.
    pub srcadr: Ipv4Addr,
    /// Remote port.
    pub srcport: u16,
    /// Peer stratum.
    pub stratum: u8,
    /// Root delay.
    pub root_delay: ShortFormat,
    /// Root dispersion.
    pub root_dispersion: ShortFormat,
    /// Whether the address fields are the IPv6 ones.
    pub v6_flag: bool,
    /// Local IPv6 address.
    pub dstadr6: Ipv6Addr,
    /// Remote IPv6 address. Some daemons leave this unset.
    pub srcadr6: Ipv6Addr,
}

impl InfoPeer {
    /// Remote address the record belongs to.
    pub fn remote_address(&self) -> IpAddr {
        select_address(self.v6_flag, self.srcadr, self.srcadr6)
    }
}

impl ConstPackedSizeBytes for InfoPeer {
    const PACKED_SIZE_BYTES: usize = 280;
}

impl ReadFromBytes for InfoPeer {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let dstadr = read_ipv4(&mut reader)?;
        let srcadr = read_ipv4(&mut reader)?;
        let srcport = reader.read_u16::<BE>()?;
        // flags, leap, hmode, pmode
        skip(&mut reader, 4)?;
        let stratum = reader.read_u8()?;
        // ppoll through timer
        skip(&mut reader, 29)?;
        let root_delay = ShortFormat::read_from_bytes(&mut reader)?;
        let root_dispersion = ShortFormat::read_from_bytes(&mut reader)?;
        // reftime through estbdelay
        skip(&mut reader, 188)?;
        let v6_flag = reader.read_u32::<BE>()? != 0;
        skip(&mut reader, 4)?;
        let dstadr6 = read_ipv6(&mut reader)?;
        let srcadr6 = read_ipv6(&mut reader)?;
        Ok(InfoPeer {
            dstadr,
            srcadr,
            srcport,
            stratum,
            root_delay,
            root_dispersion,
            v6_flag,
            dstadr6,
            srcadr6,
        })
    }
}

/// Request item naming one peer (`info_peer_list`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InfoPeerList {
    /// Peer address.
    pub address: IpAddr,
    /// Peer port.
    pub port: u16,
    /// Association mode, zero in queries.
    pub hmode: u8,
    /// Flags, zero in queries.
    pub flags: u8,
}

impl InfoPeerList {
    /// Item selecting the peer at `address` on the NTP port.
    pub fn new(address: IpAddr) -> Self {
        InfoPeerList {
            address,
            port: super::PORT,
            hmode: 0,
            flags: 0,
        }
    }
}

impl ConstPackedSizeBytes for InfoPeerList {
    const PACKED_SIZE_BYTES: usize = 32;
}

impl WriteToBytes for InfoPeerList {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        let (v4, v6_flag, v6) = match self.address {
            IpAddr::V4(v4) => (v4, 0, Ipv6Addr::UNSPECIFIED),
            IpAddr::V6(v6) => (Ipv4Addr::UNSPECIFIED, 1, v6),
        };
        writer.write_u32::<BE>(u32::from(v4))?;
        writer.write_u16::<BE>(self.port)?;
        writer.write_u8(self.hmode)?;
        writer.write_u8(self.flags)?;
        writer.write_u32::<BE>(v6_flag)?;
        write_zeros(&mut writer, 4)?;
        writer.write_all(&v6.octets())?;
        Ok(())
    }
}

/// Request item for `SET_SYS_FLAG` / `CLR_SYS_FLAG` (`conf_sys_flags`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConfSysFlags {
    /// Flags to set or clear.
    pub flags: u32,
}

impl ConfSysFlags {
    /// The NTP and kernel discipline flags.
    pub fn clock_discipline() -> Self {
        ConfSysFlags {
            flags: SYS_FLAG_NTP | SYS_FLAG_KERNEL,
        }
    }
}

impl ConstPackedSizeBytes for ConfSysFlags {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl WriteToBytes for ConfSysFlags {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<BE>(self.flags)
    }
}

// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Mode 6 (control message) wire format, as spoken by `ntpq`.
//!
//! ### Header layout
//!
//! ```ignore
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |LI | VN  |Mode |R|E|M| Opcode  |          Sequence             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            Status             |       Association ID          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            Offset             |            Count              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Data (0 to 468 octets)                    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                 Key ID and MAC (authenticated)                |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use core::fmt;

use crate::error::ParseError;

use super::{ConstPackedSizeBytes, FromBytes, ToBytes, Version, check_len};

/// Mode value for control messages.
pub const MODE_CONTROL: u8 = 6;

/// Length of the fixed control header.
pub const HEADER_LEN: usize = 12;

/// Largest data payload carried by a single control message.
pub const MAX_DATA_LEN: usize = 468;

/// Response bit in the `r_e_m_op` byte.
pub const RESPONSE_BIT: u8 = 0x80;
/// Error bit in the `r_e_m_op` byte.
pub const ERROR_BIT: u8 = 0x40;
/// More bit in the `r_e_m_op` byte.
pub const MORE_BIT: u8 = 0x20;
/// Opcode mask in the `r_e_m_op` byte.
pub const OPCODE_MASK: u8 = 0x1f;

/// Peer status word bit: association is persistent (configured).
pub const PEER_STATUS_CONFIG: u8 = 0x80;
/// Peer status word bit: peer is reachable.
pub const PEER_STATUS_REACH: u8 = 0x10;
/// Peer selection code: system peer (`*` in `ntpq -p`).
pub const PEER_SELECT_SYSPEER: u8 = 6;
/// Peer selection code: backup / excess (`#` in `ntpq -p`).
pub const PEER_SELECT_EXCESS: u8 = 5;

/// Control message opcodes.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Opcode {
    /// Read status (association list or system status).
    ReadStatus = 1,
    /// Read system or peer variables.
    ReadVariables = 2,
    /// Write variables.
    WriteVariables = 3,
    /// Read clock variables.
    ReadClock = 4,
    /// Write clock variables.
    WriteClock = 5,
    /// Set trap address.
    SetTrap = 6,
    /// Asynchronous message.
    AsyncMessage = 7,
    /// Runtime configuration, one `ntp.conf` line per request.
    Configure = 8,
    /// Save configuration to a file.
    SaveConfig = 9,
    /// Read the MRU list.
    ReadMru = 10,
    /// Read an ordered list.
    ReadOrderedList = 11,
    /// Request a nonce.
    RequestNonce = 12,
    /// Unset trap.
    UnsetTrap = 31,
}

impl TryFrom<u8> for Opcode {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Opcode::ReadStatus),
            2 => Ok(Opcode::ReadVariables),
            3 => Ok(Opcode::WriteVariables),
            4 => Ok(Opcode::ReadClock),
            5 => Ok(Opcode::WriteClock),
            6 => Ok(Opcode::SetTrap),
            7 => Ok(Opcode::AsyncMessage),
            8 => Ok(Opcode::Configure),
            9 => Ok(Opcode::SaveConfig),
            10 => Ok(Opcode::ReadMru),
            11 => Ok(Opcode::ReadOrderedList),
            12 => Ok(Opcode::RequestNonce),
            31 => Ok(Opcode::UnsetTrap),
            _ => Err(ParseError::InvalidField {
                field: "opcode",
                value: u32::from(value),
            }),
        }
    }
}

/// Error codes carried in the high byte of the status word when the error bit is set.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum ControlError {
    /// Unspecified error.
    Unspecified,
    /// Permission denied.
    Permission,
    /// Request was badly formatted.
    BadFormat,
    /// Opcode not supported.
    BadOpcode,
    /// No such association.
    BadAssociation,
    /// Unknown variable name.
    UnknownVariable,
    /// Bad value for a variable.
    BadValue,
    /// Request refused by access restrictions.
    Restricted,
    /// A code this client does not know.
    Unknown(u8),
}

impl ControlError {
    /// Decode the error code from a response status word.
    pub fn from_status(status: u16) -> Self {
        ControlError::from_code((status >> 8) as u8)
    }

    /// Decode a raw error code.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ControlError::Unspecified,
            1 => ControlError::Permission,
            2 => ControlError::BadFormat,
            3 => ControlError::BadOpcode,
            4 => ControlError::BadAssociation,
            5 => ControlError::UnknownVariable,
            6 => ControlError::BadValue,
            7 => ControlError::Restricted,
            other => ControlError::Unknown(other),
        }
    }

    /// The raw error code.
    pub fn code(self) -> u8 {
        match self {
            ControlError::Unspecified => 0,
            ControlError::Permission => 1,
            ControlError::BadFormat => 2,
            ControlError::BadOpcode => 3,
            ControlError::BadAssociation => 4,
            ControlError::UnknownVariable => 5,
            ControlError::BadValue => 6,
            ControlError::Restricted => 7,
            ControlError::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Unspecified => write!(f, "unspecified error"),
            ControlError::Permission => write!(f, "permission denied"),
            ControlError::BadFormat => write!(f, "badly formatted request"),
            ControlError::BadOpcode => write!(f, "unsupported opcode"),
            ControlError::BadAssociation => write!(f, "unknown association"),
            ControlError::UnknownVariable => write!(f, "unknown variable"),
            ControlError::BadValue => write!(f, "bad variable value"),
            ControlError::Restricted => write!(f, "access restricted"),
            ControlError::Unknown(code) => write!(f, "unknown error code {code}"),
        }
    }
}

impl std::error::Error for ControlError {}

/// Fixed 12-byte control message header.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ControlHeader {
    /// Leap indicator (2 bits). Always zero in requests.
    pub leap: u8,
    /// Raw 3-bit version.
    pub version: u8,
    /// Raw 3-bit mode.
    pub mode: u8,
    /// Set on daemon responses.
    pub response: bool,
    /// Set when the response carries an error code in `status`.
    pub error: bool,
    /// Set when further fragments follow.
    pub more: bool,
    /// Raw 5-bit opcode.
    pub opcode: u8,
    /// Sequence number correlating responses with a request.
    pub sequence: u16,
    /// Status word.
    pub status: u16,
    /// Association id the message concerns, 0 for the system.
    pub association_id: u16,
    /// Byte offset of this fragment's data within the whole response.
    pub offset: u16,
    /// Number of data bytes in this fragment.
    pub count: u16,
}

impl ControlHeader {
    /// Header for a request with the given opcode, sequence and association.
    pub fn request(opcode: Opcode, sequence: u16, association_id: u16, count: u16) -> Self {
        ControlHeader {
            leap: 0,
            version: Version::V4.value(),
            mode: MODE_CONTROL,
            response: false,
            error: false,
            more: false,
            opcode: opcode as u8,
            sequence,
            status: 0,
            association_id,
            offset: 0,
            count,
        }
    }

    /// Decoded version field.
    pub fn version(&self) -> Version {
        Version::from_bits(self.version)
    }

    /// The daemon error code, meaningful only when `error` is set.
    pub fn control_error(&self) -> ControlError {
        ControlError::from_status(self.status)
    }
}

impl ConstPackedSizeBytes for ControlHeader {
    const PACKED_SIZE_BYTES: usize = HEADER_LEN;
}

impl FromBytes for ControlHeader {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        check_len(buf, HEADER_LEN)?;
        let li_vn_mode = buf[0];
        let r_e_m_op = buf[1];
        let word = |i: usize| u16::from_be_bytes([buf[i], buf[i + 1]]);
        Ok((
            ControlHeader {
                leap: li_vn_mode >> 6,
                version: (li_vn_mode >> 3) & 0b111,
                mode: li_vn_mode & 0b111,
                response: r_e_m_op & RESPONSE_BIT != 0,
                error: r_e_m_op & ERROR_BIT != 0,
                more: r_e_m_op & MORE_BIT != 0,
                opcode: r_e_m_op & OPCODE_MASK,
                sequence: word(2),
                status: word(4),
                association_id: word(6),
                offset: word(8),
                count: word(10),
            },
            HEADER_LEN,
        ))
    }
}

impl ToBytes for ControlHeader {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        check_len(buf, HEADER_LEN)?;
        buf[0] = ((self.leap & 0b11) << 6) | ((self.version & 0b111) << 3) | (self.mode & 0b111);
        let mut r_e_m_op = self.opcode & OPCODE_MASK;
        if self.response {
            r_e_m_op |= RESPONSE_BIT;
        }
        if self.error {
            r_e_m_op |= ERROR_BIT;
        }
        if self.more {
            r_e_m_op |= MORE_BIT;
        }
        buf[1] = r_e_m_op;
        buf[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        buf[4..6].copy_from_slice(&self.status.to_be_bytes());
        buf[6..8].copy_from_slice(&self.association_id.to_be_bytes());
        buf[8..10].copy_from_slice(&self.offset.to_be_bytes());
        buf[10..12].copy_from_slice(&self.count.to_be_bytes());
        Ok(HEADER_LEN)
    }
}

/// Peer status word returned with each association by `READSTAT`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PeerStatus(pub u16);

impl PeerStatus {
    /// The high byte carrying the status flags and selection code.
    pub fn statval(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// The association was configured (persistent).
    pub fn is_configured(self) -> bool {
        self.statval() & PEER_STATUS_CONFIG != 0
    }

    /// The peer is reachable.
    pub fn is_reachable(self) -> bool {
        self.statval() & PEER_STATUS_REACH != 0
    }

    /// 3-bit peer selection code.
    pub fn selection(self) -> u8 {
        self.statval() & 0b111
    }

    /// The peer is the daemon's system peer.
    pub fn is_system_peer(self) -> bool {
        self.selection() == PEER_SELECT_SYSPEER
    }

    /// The peer survived selection as a backup.
    pub fn is_backup(self) -> bool {
        self.selection() == PEER_SELECT_EXCESS
    }
}

/// One (association id, peer status) pair from a `READSTAT` response.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Association {
    /// Association id.
    pub association_id: u16,
    /// Peer status word.
    pub status: PeerStatus,
}

impl ConstPackedSizeBytes for Association {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl FromBytes for Association {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        check_len(buf, Self::PACKED_SIZE_BYTES)?;
        Ok((
            Association {
                association_id: u16::from_be_bytes([buf[0], buf[1]]),
                status: PeerStatus(u16::from_be_bytes([buf[2], buf[3]])),
            },
            Self::PACKED_SIZE_BYTES,
        ))
    }
}

impl ToBytes for Association {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        check_len(buf, Self::PACKED_SIZE_BYTES)?;
        buf[0..2].copy_from_slice(&self.association_id.to_be_bytes());
        buf[2..4].copy_from_slice(&self.status.0.to_be_bytes());
        Ok(Self::PACKED_SIZE_BYTES)
    }
}

/// Encode a control request into `buf`.
///
/// The payload is copied after the header and zero-padded to a 32-bit
/// boundary. Returns the number of bytes written; authentication, if any, is
/// applied afterwards by [`crate::auth::Authenticator::sign_control`].
pub fn encode_request(
    buf: &mut [u8],
    opcode: Opcode,
    sequence: u16,
    association_id: u16,
    payload: &[u8],
) -> Result<usize, ParseError> {
    if payload.len() > MAX_DATA_LEN {
        return Err(ParseError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_DATA_LEN,
        });
    }
    let len = (HEADER_LEN + payload.len() + 3) & !3;
    check_len(buf, len)?;
    let header = ControlHeader::request(opcode, sequence, association_id, payload.len() as u16);
    header.to_bytes(buf)?;
    buf[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
    buf[HEADER_LEN + payload.len()..len].fill(0);
    Ok(len)
}

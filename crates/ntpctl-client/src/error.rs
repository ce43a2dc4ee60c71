// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error types for the ntpd client.
//!
//! Every operation returns [`NtpdError`]. Callers that only care about the
//! broad outcome use [`NtpdError::status`]; callers that want the daemon's own
//! error code match on [`NtpdError::Control`] or [`NtpdError::Private`].
//!
//! `NtpdError` converts into `io::Error` and can be recovered with
//! `io::Error::get_ref()`:
//!
//! ```no_run
//! use std::io;
//! use ntpctl_client::NtpdClient;
//! use ntpctl_client::error::NtpdError;
//!
//! fn peers() -> io::Result<usize> {
//!     let mut client = NtpdClient::builder().build()?;
//!     Ok(client.get_peer_info()?.num_peers())
//! }
//!
//! if let Err(e) = peers() {
//!     if let Some(err) = e.get_ref().and_then(|inner| inner.downcast_ref::<NtpdError>()) {
//!         eprintln!("ntpd query failed ({:?}): {err}", err.status());
//!     }
//! }
//! ```

// Re-export proto error types so callers need only this crate.
pub use ntpctl_proto::error::ParseError;
pub use ntpctl_proto::protocol::control::ControlError;
pub use ntpctl_proto::protocol::private::InfoError;

use std::fmt;
use std::io;
use std::net::IpAddr;

/// Errors that can occur while talking to an NTP daemon.
#[derive(Debug)]
pub enum NtpdError {
    /// Underlying I/O error (socket creation, send, receive, connection refused).
    Io(io::Error),
    /// No complete response arrived before the deadline.
    Timeout,
    /// The daemon's response could not be interpreted.
    Malformed(ProtocolError),
    /// The daemon answered a mode 6 request with an error code.
    Control(ControlError),
    /// The daemon answered a mode 7 request with an error code.
    Private(InfoError),
    /// The request needs a key the client does not have, or the daemon refused it.
    PermissionDenied,
    /// No management protocol is available.
    ProtocolUnavailable,
    /// The response does not fit the client's fixed-size tables.
    OutOfMemory,
    /// The reassembled response would exceed the reassembly buffer.
    ResponseTooLarge,
    /// The request payload does not fit in one request packet.
    ItemTooLarge,
    /// The response was split into more fragments than are tracked.
    FragmentLimitExceeded,
    /// The requested information is not available.
    NotFound,
    /// The daemon answered a per-peer query about a different peer.
    PeerMismatch {
        /// Address that was queried.
        expected: IpAddr,
        /// Address in the response.
        received: IpAddr,
    },
    /// Invalid client configuration.
    Config(ConfigError),
}

/// Broad outcome categories callers act on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    /// No response before the deadline.
    Timeout,
    /// Transport failure.
    Io,
    /// Malformed response or request rejected as badly formatted.
    Malformed,
    /// Missing key or access refused by the daemon.
    PermissionDenied,
    /// The protocol, or the request within it, is not supported.
    ProtocolUnavailable,
    /// A fixed-size client table overflowed.
    OutOfMemory,
    /// The response overflowed the reassembly buffer.
    ResponseTooLarge,
    /// The request did not fit in a packet.
    ItemTooLarge,
    /// Too many response fragments.
    FragmentLimitExceeded,
    /// The daemon has no such data.
    NotFound,
    /// The client configuration was rejected.
    InvalidConfig,
}

/// Responses that passed packet validation but could not be decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolError {
    /// A mode 6 fragment claims more data than the datagram holds.
    ShortFragment {
        /// Data bytes the header claims.
        claimed: usize,
        /// Datagram length.
        received: usize,
    },
    /// A `READSTAT` response whose length is not a whole number of entries.
    AssociationList {
        /// Response length.
        len: usize,
    },
    /// A mode 7 response that carried no items.
    NoItems,
    /// A record or value inside the response could not be parsed.
    Parse(ParseError),
}

/// Configuration errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Key id 0 is reserved.
    ZeroKeyId,
    /// The key value is empty.
    EmptyKey,
    /// The key value is longer than the daemon accepts.
    KeyTooLong {
        /// Length of the rejected key.
        len: usize,
    },
    /// A key specification is not of the form `ID VALUE`.
    InvalidKeySpec {
        /// Detail about the invalid specification.
        detail: String,
    },
    /// A timeout of zero was configured.
    ZeroTimeout {
        /// Which timeout was zero.
        protocol: &'static str,
    },
}

impl NtpdError {
    /// The broad category of this error.
    pub fn status(&self) -> Status {
        match self {
            NtpdError::Io(_) | NtpdError::PeerMismatch { .. } => Status::Io,
            NtpdError::Timeout => Status::Timeout,
            NtpdError::Malformed(_) => Status::Malformed,
            NtpdError::Control(e) => control_status(*e),
            NtpdError::Private(e) => private_status(*e),
            NtpdError::PermissionDenied => Status::PermissionDenied,
            NtpdError::ProtocolUnavailable => Status::ProtocolUnavailable,
            NtpdError::OutOfMemory => Status::OutOfMemory,
            NtpdError::ResponseTooLarge => Status::ResponseTooLarge,
            NtpdError::ItemTooLarge => Status::ItemTooLarge,
            NtpdError::FragmentLimitExceeded => Status::FragmentLimitExceeded,
            NtpdError::NotFound => Status::NotFound,
            NtpdError::Config(_) => Status::InvalidConfig,
        }
    }
}

fn control_status(err: ControlError) -> Status {
    match err {
        ControlError::Permission | ControlError::Restricted => Status::PermissionDenied,
        ControlError::BadFormat | ControlError::BadValue => Status::Malformed,
        ControlError::BadOpcode => Status::ProtocolUnavailable,
        ControlError::BadAssociation | ControlError::UnknownVariable => Status::NotFound,
        ControlError::Unspecified | ControlError::Unknown(_) => Status::Io,
    }
}

fn private_status(err: InfoError) -> Status {
    match err {
        InfoError::Implementation => Status::ItemTooLarge,
        InfoError::Request => Status::ProtocolUnavailable,
        InfoError::Format => Status::Malformed,
        InfoError::NoData => Status::NotFound,
        InfoError::Auth => Status::PermissionDenied,
        InfoError::Unknown(_) => Status::Io,
    }
}

impl Status {
    /// The `io::ErrorKind` an error of this status converts to.
    pub fn io_kind(self) -> io::ErrorKind {
        match self {
            Status::Timeout => io::ErrorKind::TimedOut,
            Status::Io => io::ErrorKind::Other,
            Status::Malformed
            | Status::ResponseTooLarge
            | Status::FragmentLimitExceeded => io::ErrorKind::InvalidData,
            Status::PermissionDenied => io::ErrorKind::PermissionDenied,
            Status::ProtocolUnavailable => io::ErrorKind::Unsupported,
            Status::OutOfMemory => io::ErrorKind::OutOfMemory,
            Status::ItemTooLarge | Status::InvalidConfig => io::ErrorKind::InvalidInput,
            Status::NotFound => io::ErrorKind::NotFound,
        }
    }
}

// ── Display implementations ─────────────────────────────────────────

impl fmt::Display for NtpdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NtpdError::Io(e) => write!(f, "{e}"),
            NtpdError::Timeout => write!(f, "timed out waiting for ntpd response"),
            NtpdError::Malformed(e) => write!(f, "malformed ntpd response: {e}"),
            NtpdError::Control(e) => write!(f, "ntpd mode 6 error: {e}"),
            NtpdError::Private(e) => write!(f, "ntpd mode 7 error: {e}"),
            NtpdError::PermissionDenied => write!(f, "permission denied"),
            NtpdError::ProtocolUnavailable => {
                write!(f, "ntpd does not answer mode 6 or mode 7 requests")
            }
            NtpdError::OutOfMemory => write!(f, "response exceeds client tables"),
            NtpdError::ResponseTooLarge => write!(f, "response exceeds reassembly buffer"),
            NtpdError::ItemTooLarge => write!(f, "request data does not fit in a packet"),
            NtpdError::FragmentLimitExceeded => write!(f, "too many response fragments"),
            NtpdError::NotFound => write!(f, "requested information not available"),
            NtpdError::PeerMismatch { expected, received } => {
                write!(f, "queried peer {expected} but got a response for {received}")
            }
            NtpdError::Config(e) => write!(f, "ntpd client config error: {e}"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::ShortFragment { claimed, received } => {
                write!(f, "fragment claims {claimed} data bytes in a {received} byte datagram")
            }
            ProtocolError::AssociationList { len } => {
                write!(f, "association list length {len} is not a multiple of 4")
            }
            ProtocolError::NoItems => write!(f, "response carried no items"),
            ProtocolError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroKeyId => write!(f, "key id 0 is reserved"),
            ConfigError::EmptyKey => write!(f, "key value is empty"),
            ConfigError::KeyTooLong { len } => {
                write!(f, "key value is {len} bytes, at most 32 are allowed")
            }
            ConfigError::InvalidKeySpec { detail } => write!(f, "invalid key: {detail}"),
            ConfigError::ZeroTimeout { protocol } => write!(f, "{protocol} timeout is zero"),
        }
    }
}

// ── Error trait implementations ─────────────────────────────────────

impl std::error::Error for NtpdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NtpdError::Io(e) => Some(e),
            NtpdError::Malformed(e) => Some(e),
            NtpdError::Control(e) => Some(e),
            NtpdError::Private(e) => Some(e),
            NtpdError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}

// ── From conversions ────────────────────────────────────────────────

impl From<NtpdError> for io::Error {
    fn from(err: NtpdError) -> io::Error {
        // Preserve the original io::Error directly for the Io variant.
        if let NtpdError::Io(e) = err {
            return e;
        }
        io::Error::new(err.status().io_kind(), err)
    }
}

impl From<io::Error> for NtpdError {
    fn from(err: io::Error) -> NtpdError {
        NtpdError::Io(err)
    }
}

impl From<ParseError> for NtpdError {
    fn from(err: ParseError) -> NtpdError {
        match err {
            ParseError::PayloadTooLarge { .. } => NtpdError::ItemTooLarge,
            ParseError::InvalidKey => NtpdError::PermissionDenied,
            other => NtpdError::Malformed(ProtocolError::Parse(other)),
        }
    }
}

impl From<ConfigError> for NtpdError {
    fn from(err: ConfigError) -> NtpdError {
        NtpdError::Config(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let e = ProtocolError::ShortFragment {
            claimed: 100,
            received: 40,
        };
        assert_eq!(
            e.to_string(),
            "fragment claims 100 data bytes in a 40 byte datagram"
        );
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(ConfigError::ZeroKeyId.to_string(), "key id 0 is reserved");
        assert_eq!(
            ConfigError::KeyTooLong { len: 40 }.to_string(),
            "key value is 40 bytes, at most 32 are allowed"
        );
    }

    #[test]
    fn test_control_error_status() {
        let cases = [
            (ControlError::Unspecified, Status::Io),
            (ControlError::Permission, Status::PermissionDenied),
            (ControlError::BadFormat, Status::Malformed),
            (ControlError::BadOpcode, Status::ProtocolUnavailable),
            (ControlError::BadAssociation, Status::NotFound),
            (ControlError::UnknownVariable, Status::NotFound),
            (ControlError::BadValue, Status::Malformed),
            (ControlError::Restricted, Status::PermissionDenied),
            (ControlError::Unknown(42), Status::Io),
        ];
        for (err, status) in cases {
            assert_eq!(NtpdError::Control(err).status(), status, "{err:?}");
        }
    }

    #[test]
    fn test_private_error_status() {
        let cases = [
            (InfoError::Implementation, Status::ItemTooLarge),
            (InfoError::Request, Status::ProtocolUnavailable),
            (InfoError::Format, Status::Malformed),
            (InfoError::NoData, Status::NotFound),
            (InfoError::Auth, Status::PermissionDenied),
            (InfoError::Unknown(9), Status::Io),
        ];
        for (err, status) in cases {
            assert_eq!(NtpdError::Private(err).status(), status, "{err:?}");
        }
    }

    #[test]
    fn test_peer_mismatch_is_io() {
        let err = NtpdError::PeerMismatch {
            expected: "10.0.0.1".parse().unwrap(),
            received: "10.0.0.2".parse().unwrap(),
        };
        assert_eq!(err.status(), Status::Io);
        assert_eq!(
            err.to_string(),
            "queried peer 10.0.0.1 but got a response for 10.0.0.2"
        );
    }

    #[test]
    fn test_ntpd_error_to_io_error_kind() {
        let cases: Vec<(NtpdError, io::ErrorKind)> = vec![
            (NtpdError::Timeout, io::ErrorKind::TimedOut),
            (
                NtpdError::Malformed(ProtocolError::NoItems),
                io::ErrorKind::InvalidData,
            ),
            (NtpdError::PermissionDenied, io::ErrorKind::PermissionDenied),
            (NtpdError::ProtocolUnavailable, io::ErrorKind::Unsupported),
            (NtpdError::OutOfMemory, io::ErrorKind::OutOfMemory),
            (NtpdError::ItemTooLarge, io::ErrorKind::InvalidInput),
            (NtpdError::NotFound, io::ErrorKind::NotFound),
            (
                NtpdError::Config(ConfigError::EmptyKey),
                io::ErrorKind::InvalidInput,
            ),
        ];
        for (err, expected_kind) in cases {
            let io_err: io::Error = err.into();
            assert_eq!(io_err.kind(), expected_kind);
        }
    }

    #[test]
    fn test_io_error_passthrough() {
        let orig = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let io_err: io::Error = NtpdError::Io(orig).into();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(io_err.to_string(), "refused");
    }

    #[test]
    fn test_from_parse_error() {
        let too_large = ParseError::PayloadTooLarge { size: 500, max: 468 };
        assert!(matches!(NtpdError::from(too_large), NtpdError::ItemTooLarge));
        assert!(matches!(
            NtpdError::from(ParseError::InvalidKey),
            NtpdError::PermissionDenied
        ));
        let short = ParseError::BufferTooShort {
            needed: 8,
            available: 4,
        };
        assert!(matches!(
            NtpdError::from(short),
            NtpdError::Malformed(ProtocolError::Parse(_))
        ));
    }

    #[test]
    fn test_from_io_error() {
        let orig = io::Error::new(io::ErrorKind::BrokenPipe, "broken");
        let err: NtpdError = orig.into();
        assert!(matches!(err, NtpdError::Io(_)));
        assert_eq!(err.status(), Status::Io);
    }
}

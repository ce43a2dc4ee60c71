// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Mode 6 control protocol instance, as used by `ntpq`.
//!
//! Mode 6 is the protocol current daemons support. Values are read as
//! `name=value` text; clock control is a text `configure` command.

use log::{debug, warn};
use std::time::{Duration, Instant};

use ntpctl_proto::auth::{Authenticator, MAC_LEN};
use ntpctl_proto::error::ParseError;
use ntpctl_proto::protocol::control::{self, Association, ControlError, Opcode};
use ntpctl_proto::protocol::private::MODE_CLIENT;
use ntpctl_proto::protocol::vars::{self, make_query_data, variables};
use ntpctl_proto::protocol::{ConstPackedSizeBytes, FromBytes, MAX_PEERS, MAX_RESPONSE_LEN};

use crate::config::ClientConfig;
use crate::error::{NtpdError, ProtocolError};
use crate::protocol::NtpdProtocol;
use crate::reassembly::{ControlReassembler, Outcome};
use crate::transport::{RECV_BUF_LEN, Transport};
use crate::types::{FeatureFlags, Peer, PeerInfo, ProtocolKind, SysInfo};

/// Largest association list a reassembled response can carry.
pub const ASSOCIATION_CACHE_LEN: usize = MAX_RESPONSE_LEN / Association::PACKED_SIZE_BYTES;

const SEND_BUF_LEN: usize = control::HEADER_LEN + control::MAX_DATA_LEN + 8 + MAC_LEN;

const PEERADR: &str = "peeradr";

const PEER_VARIABLES: [&str; 9] = [
    "srcadr", "dstadr", "stratum", "offset", "hmode", "sent", "received", "rootdisp", "refid",
];

const CONFIG_SUCCEEDED: &[u8] = b"Config Succeeded";

/// A mode 6 connection to the daemon.
#[derive(Debug)]
pub struct Mode6Client {
    transport: Transport,
    timeout: Duration,
    key: Option<Authenticator>,
    sequence: u16,
    buf: Box<[u8]>,
    send_buf: Box<[u8]>,
    recv_buf: Box<[u8]>,
    associations: Vec<Association>,
    peer_query: String,
    features: FeatureFlags,
    clock_control_enabled: bool,
}

impl Mode6Client {
    /// Open a socket to the configured daemon address.
    pub fn new(config: &ClientConfig) -> Result<Self, NtpdError> {
        let key = config.authenticator()?;
        let transport = Transport::connect(config.address)?;
        Ok(Mode6Client {
            transport,
            timeout: config.mode6_timeout,
            key,
            sequence: 0,
            buf: vec![0; MAX_RESPONSE_LEN].into_boxed_slice(),
            send_buf: vec![0; SEND_BUF_LEN].into_boxed_slice(),
            recv_buf: vec![0; RECV_BUF_LEN].into_boxed_slice(),
            associations: Vec::with_capacity(ASSOCIATION_CACHE_LEN),
            peer_query: make_query_data(&PEER_VARIABLES, control::MAX_DATA_LEN),
            features: FeatureFlags::MODE6,
            clock_control_enabled: false,
        })
    }

    /// Send one request and wait for its complete, reassembled response.
    ///
    /// The deadline starts at `timeout` and is pushed back by `timeout` each
    /// time a fragment is accepted.
    pub fn query(
        &mut self,
        opcode: Opcode,
        association_id: u16,
        authenticate: bool,
        payload: &[u8],
    ) -> Result<&[u8], NtpdError> {
        let len = self.exchange(opcode, association_id, authenticate, payload)?;
        Ok(&self.buf[..len])
    }

    fn exchange(
        &mut self,
        opcode: Opcode,
        association_id: u16,
        authenticate: bool,
        payload: &[u8],
    ) -> Result<usize, NtpdError> {
        let auth = if authenticate {
            Some(self.key.as_ref().ok_or(NtpdError::PermissionDenied)?)
        } else {
            None
        };

        self.transport.drain(&mut self.recv_buf)?;
        self.sequence = self.sequence.wrapping_add(1);
        let mut len = control::encode_request(
            &mut self.send_buf,
            opcode,
            self.sequence,
            association_id,
            payload,
        )?;
        if let Some(auth) = auth {
            len = auth.sign_control(&mut self.send_buf, len)?;
        }
        self.transport.send(&self.send_buf[..len])?;

        let mut reassembler =
            ControlReassembler::new(&mut self.buf, self.sequence, opcode, association_id);
        let mut deadline = Instant::now() + self.timeout;
        loop {
            let Some(n) = self.transport.recv_until(&mut self.recv_buf, deadline)? else {
                debug!(
                    "mode 6 {:?} timed out with {} fragments",
                    opcode,
                    reassembler.fragments()
                );
                return Err(NtpdError::Timeout);
            };
            match reassembler.accept(&self.recv_buf[..n])? {
                Outcome::Discarded(reason) => debug!("mode 6: discarding packet: {reason}"),
                Outcome::Accepted => deadline = Instant::now() + self.timeout,
                Outcome::Complete(len) => return Ok(len),
            }
        }
    }

    /// Refresh the association cache. The reassembly buffer bounds the list
    /// to [`ASSOCIATION_CACHE_LEN`] entries.
    fn read_associations(&mut self) -> Result<(), NtpdError> {
        let len = self.exchange(Opcode::ReadStatus, 0, false, &[])?;
        if len % Association::PACKED_SIZE_BYTES != 0 {
            return Err(NtpdError::Malformed(ProtocolError::AssociationList { len }));
        }
        self.associations.clear();
        for entry in self.buf[..len].chunks_exact(Association::PACKED_SIZE_BYTES) {
            let (assoc, _) = Association::from_bytes(entry)?;
            self.associations.push(assoc);
        }
        debug!("mode 6: {} associations", self.associations.len());
        Ok(())
    }

    fn read_peers(&mut self, query_data: &str) -> Result<PeerInfo, NtpdError> {
        let mut peers = Vec::with_capacity(MAX_PEERS);

        for i in 0..self.associations.len() {
            let assoc = self.associations[i];
            if !(assoc.status.is_configured() || assoc.status.is_reachable()) {
                continue;
            }
            if peers.len() == MAX_PEERS {
                warn!("ntpd has more than {MAX_PEERS} peers, ignoring the rest");
                break;
            }

            let len = match self.exchange(
                Opcode::ReadVariables,
                assoc.association_id,
                false,
                query_data.as_bytes(),
            ) {
                Ok(len) => len,
                Err(NtpdError::Control(
                    e @ (ControlError::BadAssociation | ControlError::UnknownVariable),
                )) => {
                    debug!("mode 6: skipping association {}: {e}", assoc.association_id);
                    continue;
                }
                Err(e) => return Err(e),
            };
            peers.push(parse_peer(&String::from_utf8_lossy(&self.buf[..len]), assoc));
        }

        Ok(PeerInfo { peers })
    }
}

fn apply_peer_variable(peer: &mut Peer, name: &str, value: &str) -> Result<(), ParseError> {
    match name {
        "srcadr" => peer.remote_address = Some(vars::parse_address("srcadr", value)?),
        "dstadr" => peer.local_address = Some(vars::parse_address("dstadr", value)?),
        "stratum" => peer.stratum = vars::parse_u32("stratum", value)?,
        "hmode" => peer.candidate = vars::parse_u32("hmode", value)? == u32::from(MODE_CLIENT),
        // Milliseconds, sign inverted to local minus reference.
        "offset" => peer.offset = vars::parse_f64("offset", value)? * -1.0e6,
        "rootdisp" => peer.root_dispersion = vars::parse_f64("rootdisp", value)? * 1.0e6,
        "sent" => peer.pkts_sent = vars::parse_u32("sent", value)?,
        "received" => peer.pkts_received = vars::parse_u32("received", value)?,
        // A short refid usually marks a reference clock but an IPv4 peer's
        // refid can be just as short, so the self flag is left unset.
        _ => {}
    }
    Ok(())
}

fn parse_peer(text: &str, assoc: Association) -> Peer {
    let mut peer = Peer::default();
    for var in variables(text) {
        let Some(value) = var.value else { continue };
        if let Err(e) = apply_peer_variable(&mut peer, var.name, value) {
            debug!(
                "mode 6: association {}: ignoring {}={:?}: {e}",
                assoc.association_id, var.name, value
            );
        }
    }
    peer.selected = assoc.status.is_system_peer();
    peer.shortlist = assoc.status.is_backup();
    peer
}

impl NtpdProtocol for Mode6Client {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::Mode6
    }

    fn get_sys_info(&mut self) -> Result<SysInfo, NtpdError> {
        let text = match self.query(Opcode::ReadVariables, 0, false, PEERADR.as_bytes()) {
            Ok(data) => String::from_utf8_lossy(data),
            Err(e @ (NtpdError::Io(_) | NtpdError::Timeout)) => return Err(e),
            Err(e) => {
                warn!("mode 6 is being used but there is no support for the peeradr variable ({e})");
                return Err(NtpdError::NotFound);
            }
        };

        let value = variables(&text)
            .find(|var| var.name == PEERADR)
            .and_then(|var| var.value)
            .map(str::trim);
        let peer_address = match value {
            Some("") => None,
            Some(value) => match vars::parse_address(PEERADR, value) {
                Ok(addr) => Some(addr).filter(|addr| !addr.is_unspecified()),
                Err(e) => {
                    warn!("mode 6: cannot use peeradr value {value:?}: {e}");
                    return Err(NtpdError::NotFound);
                }
            },
            None => {
                warn!("mode 6 is being used but there is no support for the peeradr variable");
                return Err(NtpdError::NotFound);
            }
        };
        debug!("mode 6: system peer {peer_address:?}");

        Ok(SysInfo {
            peer_address,
            clock_control_enabled: self.clock_control_enabled,
        })
    }

    fn get_peer_info(&mut self) -> Result<PeerInfo, NtpdError> {
        self.read_associations()?;
        let query_data = std::mem::take(&mut self.peer_query);
        let result = self.read_peers(&query_data);
        self.peer_query = query_data;
        result
    }

    fn clock_control(&mut self, enable: bool) -> Result<(), NtpdError> {
        if self.key.is_none() {
            warn!("mode 6: clock control needs a control key");
            return Err(NtpdError::PermissionDenied);
        }
        let command = if enable {
            "enable ntp kernel"
        } else {
            "disable ntp kernel"
        };

        let data = self
            .query(Opcode::Configure, 0, true, command.as_bytes())
            .inspect_err(|e| warn!("mode 6: failed to send {command:?}: {e}"))?;
        if !data.starts_with(CONFIG_SUCCEEDED) {
            let reply = String::from_utf8_lossy(data);
            warn!(
                "mode 6: ntpd rejected {command:?}: {}",
                reply.trim_end_matches(['\r', '\n', '\0'])
            );
            return Err(NtpdError::PermissionDenied);
        }

        debug!("mode 6: {command} succeeded");
        self.features.set_clock_control = true;
        self.clock_control_enabled = enable;
        Ok(())
    }

    fn features(&self) -> FeatureFlags {
        self.features
    }
}

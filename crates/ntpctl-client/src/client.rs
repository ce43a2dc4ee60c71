// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Client façade choosing between the mode 7 and mode 6 protocols.

use log::{debug, info, warn};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::config::{ClientConfig, NtpKey};
use crate::error::NtpdError;
use crate::mode6::Mode6Client;
use crate::mode7::Mode7Client;
use crate::protocol::NtpdProtocol;
use crate::types::{FeatureFlags, Peer, PeerInfo, ProtocolKind, SysInfo};

/// Order in which protocols are probed.
const PROBE_ORDER: [ProtocolKind; 2] = [ProtocolKind::Mode7, ProtocolKind::Mode6];

/// Client for a co-located NTP daemon.
///
/// Holds one instance of each management protocol and forwards every call to
/// whichever answered a probe first, preferring mode 7. While neither has
/// answered, every call probes again.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> Result<(), ntpctl_client::error::NtpdError> {
/// let mut client = ntpctl_client::NtpdClient::builder()
///     .key(1, "secret")
///     .build()?;
/// let sys = client.get_sys_info()?;
/// println!("system peer: {:?}", sys.peer_address);
/// client.clock_control(false)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct NtpdClient {
    mode7: Mode7Client,
    mode6: Mode6Client,
    selected: Option<ProtocolKind>,
}

impl NtpdClient {
    /// Create a builder for configuring the client.
    pub fn builder() -> NtpdClientBuilder {
        NtpdClientBuilder::new()
    }

    /// Create a client from a complete configuration.
    ///
    /// Succeeds even if the daemon does not answer; the failure is logged
    /// and selection is retried by each later call.
    pub fn new(config: ClientConfig) -> Result<Self, NtpdError> {
        config.validate()?;
        let mut client = NtpdClient {
            mode7: Mode7Client::new(&config)?,
            mode6: Mode6Client::new(&config)?,
            selected: None,
        };
        if let Err(e) = client.select() {
            info!(
                "could not communicate with NTP daemon at {} over any known protocol: {e}",
                config.address
            );
        }
        Ok(client)
    }

    /// The protocol in use, if one has been selected.
    pub fn selected(&self) -> Option<ProtocolKind> {
        self.selected
    }

    fn protocol(&self, kind: ProtocolKind) -> &dyn NtpdProtocol {
        match kind {
            ProtocolKind::Mode7 => &self.mode7,
            ProtocolKind::Mode6 => &self.mode6,
        }
    }

    fn protocol_mut(&mut self, kind: ProtocolKind) -> &mut dyn NtpdProtocol {
        match kind {
            ProtocolKind::Mode7 => &mut self.mode7,
            ProtocolKind::Mode6 => &mut self.mode6,
        }
    }

    fn select(&mut self) -> Result<ProtocolKind, NtpdError> {
        if let Some(kind) = self.selected {
            return Ok(kind);
        }
        for kind in PROBE_ORDER {
            match self.protocol_mut(kind).test_connection() {
                Ok(()) => {
                    info!("ntpclient: selected {kind} protocol");
                    self.selected = Some(kind);
                    return Ok(kind);
                }
                Err(e) => debug!("ntpclient: {kind} probe failed: {e}"),
            }
        }
        Err(NtpdError::ProtocolUnavailable)
    }

    /// Read the daemon-wide state.
    pub fn get_sys_info(&mut self) -> Result<SysInfo, NtpdError> {
        let kind = self.select()?;
        self.protocol_mut(kind).get_sys_info()
    }

    /// Read the daemon's peers and log them as a table.
    pub fn get_peer_info(&mut self) -> Result<PeerInfo, NtpdError> {
        let kind = self.select()?;
        let peers = self.protocol_mut(kind).get_peer_info()?;
        for (i, peer) in peers.peers.iter().enumerate() {
            info!("ntp-peer{i}: {}", PeerRow(peer));
        }
        Ok(peers)
    }

    /// Ask the daemon to start or stop disciplining the system clock.
    pub fn clock_control(&mut self, enable: bool) -> Result<(), NtpdError> {
        let kind = self.select()?;
        self.protocol_mut(kind).clock_control(enable)
    }

    /// Capabilities of the selected protocol, or `None` before selection.
    pub fn get_features(&self) -> Option<FeatureFlags> {
        match self.selected {
            Some(kind) => Some(self.protocol(kind).features()),
            None => {
                warn!("ntpclient: trying to retrieve features with no protocol selected");
                None
            }
        }
    }
}

/// Builder for [`NtpdClient`].
#[derive(Debug)]
pub struct NtpdClientBuilder {
    config: ClientConfig,
}

impl NtpdClientBuilder {
    fn new() -> Self {
        NtpdClientBuilder {
            config: ClientConfig::default(),
        }
    }

    /// Daemon address (default `127.0.0.1:123`).
    pub fn address(mut self, addr: SocketAddr) -> Self {
        self.config.address = addr;
        self
    }

    /// Key used to authenticate clock control requests. Checked by
    /// [`build`](Self::build).
    pub fn key(mut self, id: u32, value: impl Into<String>) -> Self {
        self.config.key = Some(NtpKey {
            id,
            value: value.into(),
        });
        self
    }

    /// Mode 6 query timeout (default 1 s).
    pub fn mode6_timeout(mut self, timeout: Duration) -> Self {
        self.config.mode6_timeout = timeout;
        self
    }

    /// Mode 7 query timeout (default 300 ms).
    pub fn mode7_timeout(mut self, timeout: Duration) -> Self {
        self.config.mode7_timeout = timeout;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration, open both sockets and probe the daemon.
    pub fn build(self) -> Result<NtpdClient, NtpdError> {
        NtpdClient::new(self.config)
    }
}

struct PeerAddr<'a> {
    addr: &'a Option<IpAddr>,
    is_self: bool,
}

impl fmt::Display for PeerAddr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.addr, self.is_self) {
            (Some(addr), _) => write!(f, "{addr}"),
            (None, true) => f.write_str("<reference clock>"),
            (None, false) => f.write_str("<invalid>"),
        }
    }
}

struct PeerRow<'a>(&'a Peer);

impl fmt::Display for PeerRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peer = self.0;
        write!(
            f,
            "remote-address {}, local-address {}, sent {}, received {}, candidate {}, \
             stratum {}, offset {:.3} ns, root disp {:.3} ns",
            PeerAddr {
                addr: &peer.remote_address,
                is_self: peer.is_self
            },
            PeerAddr {
                addr: &peer.local_address,
                is_self: peer.is_self
            },
            peer.pkts_sent,
            peer.pkts_received,
            u8::from(peer.candidate),
            peer.stratum,
            peer.offset,
            peer.root_dispersion,
        )
    }
}

/// Human-readable peer table, one line per peer.
#[derive(Clone, Copy, Debug)]
pub struct PeerTable<'a>(&'a PeerInfo);

impl PeerInfo {
    /// Display adapter printing the peers as a table.
    pub fn table(&self) -> PeerTable<'_> {
        PeerTable(self)
    }
}

impl fmt::Display for PeerTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, peer) in self.0.peers.iter().enumerate() {
            writeln!(f, "peer{i}: {}", PeerRow(peer))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows() {
        let info = PeerInfo {
            peers: vec![
                Peer {
                    remote_address: Some("10.0.0.1".parse().unwrap()),
                    local_address: Some("10.0.0.2".parse().unwrap()),
                    pkts_sent: 5,
                    pkts_received: 4,
                    candidate: true,
                    stratum: 2,
                    offset: 1500.0,
                    root_dispersion: 2.25,
                    ..Peer::default()
                },
                Peer {
                    is_self: true,
                    ..Peer::default()
                },
                Peer::default(),
            ],
        };
        let text = info.table().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "peer0: remote-address 10.0.0.1, local-address 10.0.0.2, sent 5, received 4, \
             candidate 1, stratum 2, offset 1500.000 ns, root disp 2.250 ns"
        );
        assert!(lines[1].starts_with(
            "peer1: remote-address <reference clock>, local-address <reference clock>,"
        ));
        assert!(lines[2].starts_with("peer2: remote-address <invalid>, local-address <invalid>,"));
        assert!(lines[2].ends_with("offset NaN ns, root disp NaN ns"));
    }

    #[test]
    fn builder_collects_settings() {
        let builder = NtpdClient::builder()
            .address("127.0.0.1:1123".parse().unwrap())
            .key(4, "abc")
            .mode6_timeout(Duration::from_millis(50))
            .mode7_timeout(Duration::from_millis(20));
        assert_eq!(builder.config.address.port(), 1123);
        assert_eq!(builder.config.key.as_ref().map(|k| k.id), Some(4));
        assert_eq!(builder.config.mode6_timeout, Duration::from_millis(50));
        assert_eq!(builder.config.mode7_timeout, Duration::from_millis(20));
    }

    #[test]
    fn build_rejects_invalid_key() {
        let err = NtpdClient::builder().key(0, "abc").build().unwrap_err();
        assert_eq!(err.status(), crate::error::Status::InvalidConfig);
        let err = NtpdClient::builder().key(1, "k".repeat(33)).build().unwrap_err();
        assert_eq!(err.status(), crate::error::Status::InvalidConfig);
    }
}

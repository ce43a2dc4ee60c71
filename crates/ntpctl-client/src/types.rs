// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Results returned by both protocols.
//!
//! All times are nanoseconds. Values the daemon did not supply are NaN.

use std::fmt;
use std::net::IpAddr;

/// Which management protocol an instance speaks.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProtocolKind {
    /// Mode 6 control messages (`ntpq`).
    Mode6,
    /// Mode 7 private messages (`ntpdc`).
    Mode7,
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolKind::Mode6 => f.write_str("NTP mode 6"),
            ProtocolKind::Mode7 => f.write_str("NTP mode 7"),
        }
    }
}

/// What a protocol instance can do.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct FeatureFlags {
    /// The daemon's presence can be detected.
    pub detect_presence: bool,
    /// Peer information can be read.
    pub get_peers: bool,
    /// System state can be read.
    pub get_state: bool,
    /// The clock discipline state can be read.
    pub get_clock_control: bool,
    /// The clock discipline can be changed. Becomes true after the first
    /// successful clock control request.
    pub set_clock_control: bool,
}

impl FeatureFlags {
    /// Initial capabilities of a mode 7 instance.
    pub const MODE7: FeatureFlags = FeatureFlags {
        detect_presence: true,
        get_peers: true,
        get_state: true,
        get_clock_control: true,
        set_clock_control: false,
    };

    /// Initial capabilities of a mode 6 instance. Mode 6 cannot read the
    /// clock discipline state.
    pub const MODE6: FeatureFlags = FeatureFlags {
        detect_presence: true,
        get_peers: true,
        get_state: true,
        get_clock_control: false,
        set_clock_control: false,
    };
}

/// Daemon-wide state.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct SysInfo {
    /// Address of the current system peer, if there is one.
    pub peer_address: Option<IpAddr>,
    /// Whether the daemon disciplines the system clock.
    pub clock_control_enabled: bool,
}

/// One association of the daemon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peer {
    /// Remote address.
    pub remote_address: Option<IpAddr>,
    /// Local address used to reach the peer.
    pub local_address: Option<IpAddr>,
    /// Packets sent to the peer.
    pub pkts_sent: u32,
    /// Packets received from the peer.
    pub pkts_received: u32,
    /// Stratum of the peer.
    pub stratum: u32,
    /// The peer is the daemon's system peer.
    pub selected: bool,
    /// The peer survived selection.
    pub shortlist: bool,
    /// The association is in client mode.
    pub candidate: bool,
    /// The peer is a reference clock attached to the daemon host.
    pub is_self: bool,
    /// Offset of the local clock from the peer.
    pub offset: f64,
    /// Root dispersion of the peer.
    pub root_dispersion: f64,
    /// Smoothed offset, if known.
    pub smoothed_offset: f64,
    /// Smoothed root dispersion, if known.
    pub smoothed_root_dispersion: f64,
    /// Offset tracked by a servo, if known.
    pub tracking_offset: f64,
}

impl Default for Peer {
    /// The null peer: no addresses, zero counters, unknown times.
    fn default() -> Self {
        Peer {
            remote_address: None,
            local_address: None,
            pkts_sent: 0,
            pkts_received: 0,
            stratum: 0,
            selected: false,
            shortlist: false,
            candidate: false,
            is_self: false,
            offset: f64::NAN,
            root_dispersion: f64::NAN,
            smoothed_offset: f64::NAN,
            smoothed_root_dispersion: f64::NAN,
            tracking_offset: f64::NAN,
        }
    }
}

impl Peer {
    /// The most refined offset available: tracking, then smoothed, then raw.
    pub fn best_offset(&self) -> f64 {
        [self.tracking_offset, self.smoothed_offset]
            .into_iter()
            .find(|v| v.is_normal())
            .unwrap_or(self.offset)
    }

    /// The most refined error estimate available: smoothed, then raw root
    /// dispersion.
    pub fn best_error(&self) -> f64 {
        if self.smoothed_root_dispersion.is_normal() {
            self.smoothed_root_dispersion
        } else {
            self.root_dispersion
        }
    }
}

/// Peers reported by the daemon, at most
/// [`MAX_PEERS`](ntpctl_proto::protocol::MAX_PEERS).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeerInfo {
    /// The peers, in the order the daemon listed them.
    pub peers: Vec<Peer>,
}

impl PeerInfo {
    /// Number of peers.
    pub fn num_peers(&self) -> usize {
        self.peers.len()
    }
}

// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Mode 7 private protocol instance, as used by `ntpdc`.
//!
//! Mode 7 returns fixed binary records and is what older daemons offer.
//! Daemons built with a different idea of the request size answer with an
//! implementation error; the instance then steps down through
//! [`LEGACY_REQUEST_SIZES`] and keeps the size that worked.

use log::{debug, error, warn};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use ntpctl_proto::auth::{Authenticator, MAC_LEN};
use ntpctl_proto::error::ParseError;
use ntpctl_proto::protocol::private::{
    self, ConfSysFlags, INFO_FLAG_REFCLOCK, INFO_FLAG_SHORTLIST, INFO_FLAG_SYSPEER, InfoError,
    InfoPeer, InfoPeerList, InfoPeerStats, InfoPeerSummary, InfoSys, LEGACY_REQUEST_SIZES,
    MODE_CLIENT, RequestCode,
};
use ntpctl_proto::protocol::{
    ConstPackedSizeBytes, MAX_PEERS, MAX_RESPONSE_LEN, ReadBytes, ReadFromBytes, WriteBytes,
    WriteToBytes,
};
use ntpctl_proto::unix_time;

use crate::config::ClientConfig;
use crate::error::{NtpdError, ProtocolError};
use crate::protocol::NtpdProtocol;
use crate::reassembly::{Outcome, PrivateReassembler};
use crate::transport::{RECV_BUF_LEN, Transport};
use crate::types::{FeatureFlags, Peer, PeerInfo, ProtocolKind, SysInfo};

const SEND_BUF_LEN: usize = private::REQUEST_LEN_NOMAC + MAC_LEN;

/// A reassembled mode 7 response: `items()` records of `item_size()` bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Response<'a> {
    data: &'a [u8],
    items: usize,
    item_size: usize,
}

impl<'a> Response<'a> {
    /// Number of items.
    pub fn items(&self) -> usize {
        self.items
    }

    /// Size of each item slot, at least the expected record size.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// All item slots back to back.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The slot of item `index`.
    pub fn item(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.items {
            return None;
        }
        self.data
            .get(index * self.item_size..(index + 1) * self.item_size)
    }

    /// Decode item `index` as a record.
    pub fn decode<T: ReadFromBytes + ConstPackedSizeBytes>(
        &self,
        index: usize,
    ) -> Result<T, NtpdError> {
        let mut item = self
            .item(index)
            .ok_or(NtpdError::Malformed(ProtocolError::NoItems))?;
        let available = item.len();
        item.read_bytes::<T>().map_err(|_| {
            NtpdError::Malformed(ProtocolError::Parse(ParseError::BufferTooShort {
                needed: T::PACKED_SIZE_BYTES,
                available,
            }))
        })
    }
}

/// Large enough for any request item this client sends.
const ITEM_BUF_LEN: usize = if InfoPeerList::PACKED_SIZE_BYTES > ConfSysFlags::PACKED_SIZE_BYTES {
    InfoPeerList::PACKED_SIZE_BYTES
} else {
    ConfSysFlags::PACKED_SIZE_BYTES
};

fn encode_item<T: WriteToBytes + ConstPackedSizeBytes>(
    item: T,
    buf: &mut [u8; ITEM_BUF_LEN],
) -> Result<&[u8], NtpdError> {
    let mut writer = &mut buf[..];
    writer.write_bytes(item)?;
    Ok(&buf[..T::PACKED_SIZE_BYTES])
}

/// A mode 7 connection to the daemon.
#[derive(Debug)]
pub struct Mode7Client {
    transport: Transport,
    timeout: Duration,
    key: Option<Authenticator>,
    size_index: usize,
    buf: Box<[u8]>,
    send_buf: Box<[u8]>,
    recv_buf: Box<[u8]>,
    features: FeatureFlags,
}

impl Mode7Client {
    /// Open a socket to the configured daemon address.
    pub fn new(config: &ClientConfig) -> Result<Self, NtpdError> {
        let key = config.authenticator()?;
        let transport = Transport::connect(config.address)?;
        Ok(Mode7Client {
            transport,
            timeout: config.mode7_timeout,
            key,
            size_index: 0,
            buf: vec![0; MAX_RESPONSE_LEN].into_boxed_slice(),
            send_buf: vec![0; SEND_BUF_LEN].into_boxed_slice(),
            recv_buf: vec![0; RECV_BUF_LEN].into_boxed_slice(),
            features: FeatureFlags::MODE7,
        })
    }

    /// Size of the requests currently sent, excluding any MAC.
    pub fn request_size(&self) -> usize {
        LEGACY_REQUEST_SIZES[self.size_index]
    }

    /// Send one request of `nitems` items of `itemsize` bytes held in `data`
    /// and wait for the complete response.
    ///
    /// Each response item is padded to at least `expected_item_size` bytes.
    /// An implementation error retries the whole request at the next smaller
    /// legacy size, which then becomes the size for later requests.
    pub fn query(
        &mut self,
        code: RequestCode,
        authenticate: bool,
        nitems: u16,
        itemsize: u16,
        data: &[u8],
        expected_item_size: usize,
    ) -> Result<Response<'_>, NtpdError> {
        let (items, item_size, len) = loop {
            match self.query_once(code, authenticate, nitems, itemsize, data, expected_item_size) {
                Err(NtpdError::Private(InfoError::Implementation))
                    if self.size_index + 1 < LEGACY_REQUEST_SIZES.len() =>
                {
                    let rejected = self.request_size();
                    self.size_index += 1;
                    debug!(
                        "mode 7: ntpd rejected {rejected} byte request, retrying with {} bytes",
                        self.request_size()
                    );
                }
                result => break result?,
            }
        };
        Ok(Response {
            data: &self.buf[..len],
            items,
            item_size,
        })
    }

    fn query_once(
        &mut self,
        code: RequestCode,
        authenticate: bool,
        nitems: u16,
        itemsize: u16,
        data: &[u8],
        expected_item_size: usize,
    ) -> Result<(usize, usize, usize), NtpdError> {
        let request_size = self.request_size();
        let auth = if authenticate {
            Some(self.key.as_ref().ok_or(NtpdError::PermissionDenied)?)
        } else {
            None
        };

        self.transport.drain(&mut self.recv_buf)?;
        let mut len = private::encode_request(
            &mut self.send_buf,
            request_size,
            code,
            authenticate,
            nitems,
            itemsize,
            data,
        )?;
        if let Some(auth) = auth {
            len = auth.sign_private(&mut self.send_buf, len, unix_time::Instant::now())?;
        }
        self.transport.send(&self.send_buf[..len])?;

        let deadline = Instant::now() + self.timeout;
        let mut reassembler = PrivateReassembler::new(&mut self.buf, code, expected_item_size);
        loop {
            let Some(n) = self.transport.recv_until(&mut self.recv_buf, deadline)? else {
                debug!("mode 7 {code:?} timed out with {} items", reassembler.items());
                return Err(NtpdError::Timeout);
            };
            match reassembler.accept(&self.recv_buf[..n])? {
                Outcome::Discarded(reason) => debug!("mode 7: discarding packet: {reason}"),
                Outcome::Accepted => {}
                Outcome::Complete(len) => {
                    return Ok((reassembler.items(), reassembler.slot_size(), len));
                }
            }
        }
    }

    fn peer_stats(&mut self, remote: IpAddr) -> Result<Option<InfoPeerStats>, NtpdError> {
        let mut item_buf = [0u8; ITEM_BUF_LEN];
        let item = encode_item(InfoPeerList::new(remote), &mut item_buf)?;
        let stats = match self.query(
            RequestCode::PeerStats,
            false,
            1,
            InfoPeerList::PACKED_SIZE_BYTES as u16,
            item,
            InfoPeerStats::PACKED_SIZE_BYTES,
        ) {
            Ok(resp) => {
                if resp.items() > 1 {
                    warn!("mode 7: expected 1 set of peer stats, got {}", resp.items());
                }
                resp.decode::<InfoPeerStats>(0)?
            }
            Err(NtpdError::Private(InfoError::NoData)) => {
                debug!("mode 7: no statistics available for peer {remote}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if stats.remote_address() != remote {
            error!(
                "mode 7: got peer stats for wrong peer (expected {remote}, got {})",
                stats.remote_address()
            );
            return Err(NtpdError::PeerMismatch {
                expected: remote,
                received: stats.remote_address(),
            });
        }
        Ok(Some(stats))
    }

    fn peer_details(&mut self, remote: IpAddr) -> Result<InfoPeer, NtpdError> {
        let mut item_buf = [0u8; ITEM_BUF_LEN];
        let item = encode_item(InfoPeerList::new(remote), &mut item_buf)?;
        let resp = self.query(
            RequestCode::PeerInfo,
            false,
            1,
            InfoPeerList::PACKED_SIZE_BYTES as u16,
            item,
            InfoPeer::PACKED_SIZE_BYTES,
        )?;
        if resp.items() > 1 {
            warn!("mode 7: expected 1 set of peer info, got {}", resp.items());
        }
        let info = resp.decode::<InfoPeer>(0)?;
        // Daemons do not fill in the source address of IPv6 peers.
        if remote.is_ipv4() && info.remote_address() != remote {
            error!(
                "mode 7: got peer info for wrong peer (expected {remote}, got {})",
                info.remote_address()
            );
            return Err(NtpdError::PeerMismatch {
                expected: remote,
                received: info.remote_address(),
            });
        }
        Ok(info)
    }
}

fn peer_from_summary(summary: &InfoPeerSummary) -> Peer {
    Peer {
        remote_address: Some(summary.remote_address()),
        local_address: Some(summary.local_address()),
        stratum: u32::from(summary.stratum),
        selected: summary.flags & INFO_FLAG_SYSPEER != 0,
        shortlist: summary.flags & INFO_FLAG_SHORTLIST != 0,
        candidate: summary.hmode == MODE_CLIENT,
        is_self: summary.flags & INFO_FLAG_REFCLOCK != 0,
        // Seconds, sign inverted to local minus reference.
        offset: summary.offset.as_signed_seconds() * -1.0e9,
        ..Peer::default()
    }
}

impl NtpdProtocol for Mode7Client {
    fn kind(&self) -> ProtocolKind {
        ProtocolKind::Mode7
    }

    fn get_sys_info(&mut self) -> Result<SysInfo, NtpdError> {
        let resp = self.query(
            RequestCode::SysInfo,
            false,
            0,
            0,
            &[],
            InfoSys::PACKED_SIZE_BYTES,
        )?;
        let info = resp.decode::<InfoSys>(0)?;
        let reftime = unix_time::timestamp_to_instant(info.reftime, &unix_time::Instant::now());
        debug!(
            "mode 7: system peer {}, leap {}, stratum {}, flags {:#04x}, reftime {}.{:09}",
            info.peer_address(),
            info.leap,
            info.stratum,
            info.flags,
            reftime.secs(),
            reftime.subsec_nanos()
        );
        Ok(SysInfo {
            peer_address: Some(info.peer_address()).filter(|addr| !addr.is_unspecified()),
            clock_control_enabled: info.clock_control_enabled(),
        })
    }

    fn get_peer_info(&mut self) -> Result<PeerInfo, NtpdError> {
        let mut peers = match self.query(
            RequestCode::PeerListSummary,
            false,
            0,
            0,
            &[],
            InfoPeerSummary::PACKED_SIZE_BYTES,
        ) {
            Ok(resp) => (0..resp.items())
                .map(|i| resp.decode::<InfoPeerSummary>(i).map(|s| peer_from_summary(&s)))
                .collect::<Result<Vec<_>, _>>()?,
            // Also seen while ntpd is still resolving its configured servers.
            Err(NtpdError::Private(InfoError::NoData)) => {
                debug!("mode 7: ntpd did not return any peers");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        if peers.len() > MAX_PEERS {
            warn!(
                "mode 7: too many peers - summary limited to {MAX_PEERS} of {} peers",
                peers.len()
            );
            peers.truncate(MAX_PEERS);
        }

        for peer in &mut peers {
            let Some(remote) = peer.remote_address else {
                continue;
            };
            let Some(stats) = self.peer_stats(remote)? else {
                continue;
            };
            peer.pkts_sent = stats.sent;
            peer.pkts_received = stats.processed;

            let info = self.peer_details(remote)?;
            peer.root_dispersion = info.root_dispersion.as_unsigned_seconds() * 1.0e9;
        }

        Ok(PeerInfo { peers })
    }

    fn clock_control(&mut self, enable: bool) -> Result<(), NtpdError> {
        if self.key.is_none() {
            warn!("mode 7: clock control needs a request key");
            return Err(NtpdError::PermissionDenied);
        }
        let code = if enable {
            RequestCode::SetSysFlag
        } else {
            RequestCode::ClearSysFlag
        };
        let mut item_buf = [0u8; ITEM_BUF_LEN];
        let item = encode_item(ConfSysFlags::clock_discipline(), &mut item_buf)?;
        self.query(
            code,
            true,
            1,
            ConfSysFlags::PACKED_SIZE_BYTES as u16,
            item,
            0,
        )
        .inspect_err(|e| warn!("mode 7: failed to set NTP daemon system flags: {e}"))?;

        debug!(
            "mode 7: {}abled NTP daemon clock control",
            if enable { "en" } else { "dis" }
        );
        self.features.set_clock_control = true;
        Ok(())
    }

    fn features(&self) -> FeatureFlags {
        self.features
    }
}

// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Connected UDP socket shared by the query engines.

use log::debug;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Instant;

/// Large enough for any mode 6 or mode 7 datagram.
pub(crate) const RECV_BUF_LEN: usize = 1024;

/// Select the unspecified bind address matching the daemon's address family.
fn bind_addr_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}

#[derive(Debug)]
pub(crate) struct Transport {
    sock: UdpSocket,
    daemon: SocketAddr,
}

impl Transport {
    /// Open a socket connected to the daemon. Only datagrams from the daemon
    /// address are delivered afterwards.
    pub(crate) fn connect(daemon: SocketAddr) -> io::Result<Self> {
        let sock = UdpSocket::bind(bind_addr_for(&daemon))?;
        sock.connect(daemon)?;
        debug!("{:?} connected to {}", sock.local_addr(), daemon);
        Ok(Transport { sock, daemon })
    }

    /// Discard datagrams left over from an earlier, abandoned query.
    ///
    /// Receive errors (such as a refusal reported for an earlier send) end
    /// the drain without being reported.
    pub(crate) fn drain(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.sock.set_nonblocking(true)?;
        let mut drained = 0;
        while let Ok(len) = self.sock.recv(buf) {
            debug!("drained stale {} byte datagram from {}", len, self.daemon);
            drained += 1;
        }
        self.sock.set_nonblocking(false)?;
        Ok(drained)
    }

    pub(crate) fn send(&self, buf: &[u8]) -> io::Result<()> {
        let sz = self.sock.send(buf)?;
        debug!("sent: {}", sz);
        Ok(())
    }

    /// Wait for one datagram until `deadline`.
    ///
    /// Returns `Ok(None)` once the deadline has passed.
    pub(crate) fn recv_until(&self, buf: &mut [u8], deadline: Instant) -> io::Result<Option<usize>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        self.sock.set_read_timeout(Some(remaining))?;
        match self.sock.recv(buf) {
            Ok(len) => {
                debug!("recv: {} bytes from {}", len, self.daemon);
                Ok(Some(len))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

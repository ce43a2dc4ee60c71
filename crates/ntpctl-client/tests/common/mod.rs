// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for integration tests: a scripted UDP daemon and builders
//! for the responses it sends.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`, but clippy flags them as unreachable outside the crate.
#![allow(unreachable_pub)]
// Not every test file uses every helper.
#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ntpctl_client::wire::ToBytes;
use ntpctl_client::wire::control::{self, ControlHeader};
use ntpctl_client::wire::private::{self, PrivateHeader};
use ntpctl_client::{ClientConfig, NtpKey};

/// Install `env_logger` once so `RUST_LOG=debug` shows discard reasons.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A UDP responder on `127.0.0.1` that answers each request with whatever
/// datagrams the handler returns. Every request is recorded.
pub struct MockDaemon {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockDaemon {
    pub fn start<F>(handler: F) -> Self
    where
        F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        Self::start_paced(Duration::ZERO, handler)
    }

    /// Like [`start`](Self::start) but waits `gap` between reply datagrams.
    pub fn start_paced<F>(gap: Duration, mut handler: F) -> Self
    where
        F: FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        init_logging();
        let sock = UdpSocket::bind("127.0.0.1:0").expect("bind mock daemon");
        sock.set_read_timeout(Some(Duration::from_millis(10)))
            .expect("set read timeout");
        let addr = sock.local_addr().expect("local addr");
        let stop = Arc::new(AtomicBool::new(false));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let thread_stop = Arc::clone(&stop);
        let thread_requests = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 2048];
            while !thread_stop.load(Ordering::Relaxed) {
                let Ok((len, from)) = sock.recv_from(&mut buf) else {
                    continue;
                };
                let request = buf[..len].to_vec();
                thread_requests.lock().unwrap().push(request.clone());
                for (i, reply) in handler(&request).iter().enumerate() {
                    if i > 0 && !gap.is_zero() {
                        thread::sleep(gap);
                    }
                    let _ = sock.send_to(reply, from);
                }
            }
        });

        MockDaemon {
            addr,
            stop,
            requests,
            handle: Some(handle),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().unwrap().clone()
    }

    /// Client configuration pointing at this daemon with short timeouts.
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            address: self.addr,
            key: None,
            mode6_timeout: Duration::from_millis(200),
            mode7_timeout: Duration::from_millis(150),
        }
    }

    pub fn config_with_key(&self, id: u32, value: &str) -> ClientConfig {
        ClientConfig {
            key: Some(NtpKey::new(id, value).unwrap()),
            ..self.config()
        }
    }
}

impl Drop for MockDaemon {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Mode of a request datagram.
pub fn mode_of(request: &[u8]) -> u8 {
    request[0] & 0b111
}

// ── Mode 6 ──────────────────────────────────────────────────────────

/// Decoded header of a mode 6 request.
pub fn control_request(request: &[u8]) -> ControlHeader {
    use ntpctl_client::wire::FromBytes;
    ControlHeader::from_bytes(request).unwrap().0
}

/// Payload of a mode 6 request.
pub fn control_payload(request: &[u8]) -> &[u8] {
    let header = control_request(request);
    &request[control::HEADER_LEN..control::HEADER_LEN + usize::from(header.count)]
}

/// One response fragment to `request` carrying `data` at `offset`.
pub fn control_fragment(request: &[u8], offset: usize, data: &[u8], more: bool) -> Vec<u8> {
    let mut header = control_request(request);
    header.response = true;
    header.more = more;
    header.offset = offset as u16;
    header.count = data.len() as u16;
    let len = (control::HEADER_LEN + data.len() + 3) & !3;
    let mut packet = vec![0u8; len];
    header.to_bytes(&mut packet).unwrap();
    packet[control::HEADER_LEN..control::HEADER_LEN + data.len()].copy_from_slice(data);
    packet
}

/// `data` split into fragments of at most `chunk` bytes, in order.
pub fn control_response(request: &[u8], data: &[u8], chunk: usize) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![control_fragment(request, 0, data, false)];
    }
    let chunks: Vec<&[u8]> = data.chunks(chunk).collect();
    let last = chunks.len() - 1;
    chunks
        .iter()
        .enumerate()
        .map(|(i, part)| control_fragment(request, i * chunk, part, i != last))
        .collect()
}

/// An error response to `request` with the given error code.
pub fn control_error(request: &[u8], code: u8) -> Vec<u8> {
    let mut header = control_request(request);
    header.response = true;
    header.error = true;
    header.status = u16::from(code) << 8;
    header.count = 0;
    let mut packet = vec![0u8; control::HEADER_LEN];
    header.to_bytes(&mut packet).unwrap();
    packet
}

/// `READSTAT` payload for (association id, status word) pairs.
pub fn association_list(entries: &[(u16, u16)]) -> Vec<u8> {
    entries
        .iter()
        .flat_map(|(id, status)| id.to_be_bytes().into_iter().chain(status.to_be_bytes()))
        .collect()
}

// ── Mode 7 ──────────────────────────────────────────────────────────

/// Decoded header of a mode 7 request.
pub fn private_request(request: &[u8]) -> PrivateHeader {
    use ntpctl_client::wire::FromBytes;
    PrivateHeader::from_bytes(request).unwrap().0
}

/// One response datagram to `request` carrying `items` of `itemsize` bytes.
pub fn private_packet(
    request: &[u8],
    seq: u8,
    more: bool,
    itemsize: usize,
    items: &[Vec<u8>],
) -> Vec<u8> {
    let req = private_request(request);
    let header = PrivateHeader {
        response: true,
        more,
        version: 2,
        mode: private::MODE_PRIVATE,
        auth: false,
        sequence: seq,
        implementation: private::IMPL_XNTPD,
        request: req.request,
        err: 0,
        nitems: items.len() as u16,
        mbz: 0,
        itemsize: itemsize as u16,
    };
    let mut packet = vec![0u8; private::HEADER_LEN];
    header.to_bytes(&mut packet).unwrap();
    for item in items {
        let mut slot = item.clone();
        slot.resize(itemsize, 0);
        packet.extend_from_slice(&slot);
    }
    packet
}

/// A complete single-datagram response.
pub fn private_response(request: &[u8], itemsize: usize, items: &[Vec<u8>]) -> Vec<u8> {
    private_packet(request, 0, false, itemsize, items)
}

/// An error response to `request` with the given error code.
pub fn private_error(request: &[u8], code: u8) -> Vec<u8> {
    let mut packet = private_packet(request, 0, false, 0, &[]);
    packet[4] = code << 4;
    packet
}

/// The address carried in a `PEER_STATS`/`PEER_INFO` request item.
pub fn requested_peer(request: &[u8]) -> Ipv4Addr {
    let item = &request[private::HEADER_LEN..];
    Ipv4Addr::new(item[0], item[1], item[2], item[3])
}

pub fn info_sys(peer: Ipv4Addr, flags: u8) -> Vec<u8> {
    let mut item = vec![0u8; 80];
    item[0..4].copy_from_slice(&peer.octets());
    item[4] = 3;
    item[6] = 2;
    item[32] = flags;
    item
}

pub fn peer_summary(
    remote: Ipv4Addr,
    local: Ipv4Addr,
    stratum: u8,
    flags: u8,
    hmode: u8,
    offset: (i32, u32),
) -> Vec<u8> {
    let mut item = vec![0u8; 72];
    item[0..4].copy_from_slice(&local.octets());
    item[4..8].copy_from_slice(&remote.octets());
    item[8..10].copy_from_slice(&123u16.to_be_bytes());
    item[10] = stratum;
    item[14] = flags;
    item[15] = hmode;
    item[20..24].copy_from_slice(&offset.0.to_be_bytes());
    item[24..28].copy_from_slice(&offset.1.to_be_bytes());
    item
}

pub fn peer_stats(remote: Ipv4Addr, sent: u32, processed: u32) -> Vec<u8> {
    let mut item = vec![0u8; 120];
    item[4..8].copy_from_slice(&remote.octets());
    item[28..32].copy_from_slice(&sent.to_be_bytes());
    item[36..40].copy_from_slice(&processed.to_be_bytes());
    item
}

pub fn peer_info(remote: Ipv4Addr, root_dispersion: u32) -> Vec<u8> {
    let mut item = vec![0u8; 280];
    item[4..8].copy_from_slice(&remote.octets());
    item[48..52].copy_from_slice(&root_dispersion.to_be_bytes());
    item
}

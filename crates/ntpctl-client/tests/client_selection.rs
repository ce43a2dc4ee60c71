// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

mod common;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{
    MockDaemon, association_list, control_request, control_response, info_sys, mode_of,
    private_response,
};
use ntpctl_client::wire::control::Opcode;
use ntpctl_client::{FeatureFlags, NtpdClient, NtpdError, ProtocolKind, Status};

/// Answers mode 6 only.
fn mode6_handler(req: &[u8]) -> Vec<Vec<u8>> {
    if mode_of(req) != 6 {
        return Vec::new();
    }
    if control_request(req).opcode == Opcode::ReadStatus as u8 {
        return control_response(req, &association_list(&[(7, 0x9614)]), 468);
    }
    let text: &[u8] = if control_request(req).association_id == 0 {
        b"peeradr=192.0.2.1:123"
    } else {
        b"srcadr=192.0.2.1, dstadr=192.0.2.9, stratum=1, offset=0.001, hmode=3, sent=9, received=9"
    };
    control_response(req, text, 468)
}

#[test]
fn selects_mode6_when_mode7_is_silent() {
    let daemon = MockDaemon::start(mode6_handler);
    let mut client = NtpdClient::builder().config(daemon.config()).build().unwrap();
    assert_eq!(client.selected(), Some(ProtocolKind::Mode6));
    assert_eq!(client.get_features(), Some(FeatureFlags::MODE6));

    let modes: Vec<u8> = daemon.requests().iter().map(|req| mode_of(req)).collect();
    assert_eq!(modes, vec![7, 6]);

    let sys = client.get_sys_info().unwrap();
    assert_eq!(sys.peer_address, Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))));
    let peers = client.get_peer_info().unwrap();
    assert_eq!(peers.num_peers(), 1);
    assert!(peers.table().to_string().starts_with("peer0: remote-address 192.0.2.1,"));

    // Mode 7 is not probed again once a protocol is selected.
    let mode7_requests = daemon
        .requests()
        .iter()
        .filter(|req| mode_of(req) == 7)
        .count();
    assert_eq!(mode7_requests, 1);
}

#[test]
fn prefers_mode7() {
    let daemon = MockDaemon::start(|req| match mode_of(req) {
        7 => vec![private_response(req, 80, &[info_sys(Ipv4Addr::new(192, 0, 2, 5), 0)])],
        _ => mode6_handler(req),
    });
    let mut client = NtpdClient::new(daemon.config()).unwrap();
    assert_eq!(client.selected(), Some(ProtocolKind::Mode7));
    assert_eq!(client.get_features(), Some(FeatureFlags::MODE7));
    assert!(daemon.requests().iter().all(|req| mode_of(req) == 7));

    let sys = client.get_sys_info().unwrap();
    assert_eq!(sys.peer_address, Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 5))));
}

#[test]
fn silent_daemon_then_selection_on_demand() {
    let online = Arc::new(AtomicBool::new(false));
    let daemon_online = Arc::clone(&online);
    let daemon = MockDaemon::start(move |req| {
        if daemon_online.load(Ordering::Relaxed) {
            mode6_handler(req)
        } else {
            Vec::new()
        }
    });

    let mut client = NtpdClient::builder()
        .config(daemon.config())
        .mode6_timeout(Duration::from_millis(100))
        .mode7_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    assert_eq!(client.selected(), None);
    assert_eq!(client.get_features(), None);

    let err = client.get_sys_info().unwrap_err();
    assert!(matches!(err, NtpdError::ProtocolUnavailable));
    assert_eq!(err.status(), Status::ProtocolUnavailable);
    assert!(matches!(
        client.clock_control(false),
        Err(NtpdError::ProtocolUnavailable)
    ));

    online.store(true, Ordering::Relaxed);
    client.get_sys_info().unwrap();
    assert_eq!(client.selected(), Some(ProtocolKind::Mode6));
}

#[test]
fn clock_control_through_the_client() {
    let daemon = MockDaemon::start(|req| {
        if mode_of(req) == 6 && control_request(req).opcode == Opcode::Configure as u8 {
            return control_response(req, b"Config Succeeded", 468);
        }
        mode6_handler(req)
    });
    let mut client = NtpdClient::builder()
        .config(daemon.config())
        .key(2, "façade")
        .build()
        .unwrap();
    assert_eq!(client.selected(), Some(ProtocolKind::Mode6));
    assert!(!client.get_features().unwrap().set_clock_control);

    client.clock_control(false).unwrap();
    assert!(client.get_features().unwrap().set_clock_control);
    assert!(!client.get_sys_info().unwrap().clock_control_enabled);
}

#[test]
fn invalid_configuration() {
    let err = NtpdClient::builder()
        .mode6_timeout(Duration::ZERO)
        .build()
        .unwrap_err();
    assert_eq!(err.status(), Status::InvalidConfig);

    let err = NtpdClient::builder().key(1, "").build().unwrap_err();
    assert_eq!(err.status(), Status::InvalidConfig);
}

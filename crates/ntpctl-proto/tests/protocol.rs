use std::net::{IpAddr, Ipv4Addr};

use ntpctl_proto::auth::{Authenticator, MAC_LEN};
use ntpctl_proto::error::ParseError;
use ntpctl_proto::protocol::control::{self, Association, ControlHeader, Opcode, PeerStatus};
use ntpctl_proto::protocol::private::{
    self, InfoPeerList, InfoPeerSummary, InfoSys, PrivateHeader, RequestCode,
};
use ntpctl_proto::protocol::vars::{self, Variable};
use ntpctl_proto::protocol::{ConstPackedSizeBytes, FromBytes, ReadBytes, ToBytes, WriteBytes};
use ntpctl_proto::unix_time::Instant;

#[test]
fn readstat_response_from_bytes() {
    // Two associations: 0x1f2a configured+reachable system peer, 0x1f2b unreachable.
    let input = [
        0x26u8, 0x81, 0x00, 0x05, 0x06, 0x15, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08, 0x1f, 0x2a,
        0x96, 0x14, 0x1f, 0x2b, 0x00, 0x00,
    ];
    let (header, used) = ControlHeader::from_bytes(&input).unwrap();
    assert_eq!(
        header,
        ControlHeader {
            leap: 0,
            version: 4,
            mode: control::MODE_CONTROL,
            response: true,
            error: false,
            more: false,
            opcode: Opcode::ReadStatus as u8,
            sequence: 5,
            status: 0x0615,
            association_id: 0,
            offset: 0,
            count: 8,
        }
    );

    let associations: Vec<Association> = input[used..]
        .chunks_exact(Association::PACKED_SIZE_BYTES)
        .map(|chunk| Association::from_bytes(chunk).unwrap().0)
        .collect();
    assert_eq!(
        associations,
        vec![
            Association {
                association_id: 0x1f2a,
                status: PeerStatus(0x9614),
            },
            Association {
                association_id: 0x1f2b,
                status: PeerStatus(0),
            },
        ]
    );
    assert!(associations[0].status.is_system_peer());
    assert!(!associations[1].status.is_reachable());
}

#[test]
fn control_header_to_bytes() {
    let header = ControlHeader {
        response: true,
        more: true,
        ..ControlHeader::request(Opcode::ReadVariables, 0xBEEF, 0x1234, 468)
    };
    let mut buf = [0u8; 12];
    assert_eq!(header.to_bytes(&mut buf).unwrap(), 12);
    assert_eq!(
        buf,
        [0x26, 0xA2, 0xBE, 0xEF, 0x00, 0x00, 0x12, 0x34, 0x00, 0x00, 0x01, 0xD4]
    );
}

#[test]
fn signed_configure_request() {
    let auth = Authenticator::new(1, "secret").unwrap();
    let mut buf = [0u8; 600];
    let text = b"enable ntp kernel";
    let len = control::encode_request(&mut buf, Opcode::Configure, 9, 0, text).unwrap();
    assert_eq!(len, 32);
    let signed = auth.sign_control(&mut buf, len).unwrap();
    assert_eq!(signed, 32 + MAC_LEN);
    assert_eq!(&buf[32..36], &[0, 0, 0, 1]);
}

#[test]
fn signed_sys_flag_request() {
    let auth = Authenticator::new(3, "secret").unwrap();
    let mut item = Vec::new();
    item.write_bytes(private::ConfSysFlags::clock_discipline())
        .unwrap();
    let mut buf = [0u8; 256];
    let len = private::encode_request(
        &mut buf,
        private::REQUEST_LEN_NOMAC,
        RequestCode::SetSysFlag,
        true,
        1,
        item.len() as u16,
        &item,
    )
    .unwrap();
    let signed = auth
        .sign_private(&mut buf, len, Instant::new(1_704_067_200, 0))
        .unwrap();
    assert_eq!(signed, 208);

    let (header, _) = PrivateHeader::from_bytes(&buf).unwrap();
    assert!(header.auth);
    assert_eq!(header.request, RequestCode::SetSysFlag as u8);
    assert_eq!(header.nitems, 1);
    assert_eq!(header.itemsize, 4);
    assert_eq!(&buf[8..12], &[0, 0, 0, 0x0c]);
}

#[test]
fn legacy_request_sizes_only_decrease() {
    let sizes = private::LEGACY_REQUEST_SIZES;
    assert_eq!(sizes[0], private::REQUEST_LEN_NOMAC);
    assert!(sizes.windows(2).all(|w| w[0] > w[1]));
    // A peer list item still fits the smallest request.
    assert!(private::data_capacity(sizes[2], false) >= InfoPeerList::PACKED_SIZE_BYTES);
}

#[test]
fn summary_items_from_padded_slots() {
    // Daemons without IPv6 support send 32-byte summaries; the reassembler pads
    // each to the full record size before decoding.
    let mut buf = vec![0u8; InfoPeerSummary::PACKED_SIZE_BYTES * 2];
    buf[4..8].copy_from_slice(&[10, 0, 0, 1]);
    buf[72 + 4..72 + 8].copy_from_slice(&[10, 0, 0, 2]);
    let mut reader = &buf[..];
    let first: InfoPeerSummary = reader.read_bytes().unwrap();
    let second: InfoPeerSummary = reader.read_bytes().unwrap();
    assert!(reader.is_empty());
    assert_eq!(first.remote_address(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(second.remote_address(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
}

#[test]
fn info_sys_from_slot() {
    let mut slot = vec![0u8; InfoSys::PACKED_SIZE_BYTES];
    slot[0..4].copy_from_slice(&[127, 127, 1, 0]);
    slot[32] = private::INFO_FLAG_NTP;
    let info = (&slot[..]).read_bytes::<InfoSys>().unwrap();
    assert_eq!(info.peer_address(), IpAddr::V4(Ipv4Addr::new(127, 127, 1, 0)));
    assert!(info.clock_control_enabled());
}

#[test]
fn peer_variables_response() {
    let text = "srcadr=192.0.2.5, dstadr=192.0.2.1, stratum=2, offset=-1.234,\r\n\
                hmode=3, sent=10, received=9, rootdisp=12.5, refid=GPS\r\n";
    let vars: Vec<Variable<'_>> = vars::variables(text).collect();
    assert_eq!(vars.len(), 9);
    assert_eq!(vars[0].name, "srcadr");
    assert_eq!(
        vars::parse_address("srcadr", vars[0].value.unwrap()).unwrap(),
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, 5))
    );
    assert_eq!(vars::parse_f64("offset", vars[3].value.unwrap()).unwrap(), -1.234);
    assert_eq!(vars[8], Variable { name: "refid", value: Some("GPS") });
}

#[test]
fn short_buffers_error() {
    assert_eq!(
        ControlHeader::from_bytes(&[0u8; 11]).unwrap_err(),
        ParseError::BufferTooShort {
            needed: 12,
            available: 11
        }
    );
    assert!(PrivateHeader::from_bytes(&[0u8; 7]).is_err());
    assert!(ControlHeader::default().to_bytes(&mut [0u8; 4]).is_err());
}

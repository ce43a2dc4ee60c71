// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
Client for the management protocols of a co-located NTP daemon.

A time synchronization service that uses ntpd as a comparison or fallback
source needs to know which peer ntpd has selected, how far each peer is from
the local clock, and must be able to stop ntpd from disciplining the clock
while it does so itself. ntpd offers this over two UDP protocols: mode 7
(`ntpdc`) on older daemons and mode 6 (`ntpq`) on all of them. This crate
speaks both, selects whichever the daemon answers, and handles fragmented
responses, keyed-MD5 authentication and the request size quirks of old
mode 7 implementations.

# Example

```rust,no_run
fn main() -> Result<(), ntpctl_client::error::NtpdError> {
    let mut client = ntpctl_client::NtpdClient::builder()
        .address("127.0.0.1:123".parse().unwrap())
        .build()?;

    let sys = client.get_sys_info()?;
    println!("system peer: {:?}", sys.peer_address);

    let peers = client.get_peer_info()?;
    print!("{}", peers.table());
    for peer in &peers.peers {
        println!("best offset {:.0} ns", peer.best_offset());
    }
    Ok(())
}
```

All operations block for at most the configured per-protocol timeout, or a
little longer for mode 6 responses that keep arriving in fragments.
*/

#![warn(missing_docs)]

// Re-export protocol types from ntpctl_proto for convenience.
pub use ntpctl_proto::{auth, protocol as wire, unix_time};

/// Client errors and the status taxonomy.
pub mod error;

/// Daemon address, key and timeout configuration.
pub mod config;

/// Results returned by both protocols.
pub mod types;

/// Reassembly of fragmented responses.
pub mod reassembly;

/// The operations every protocol instance provides.
pub mod protocol;

/// Mode 6 (`ntpq`) protocol instance.
pub mod mode6;

/// Mode 7 (`ntpdc`) protocol instance.
pub mod mode7;

mod client;
mod transport;

pub use client::{NtpdClient, NtpdClientBuilder, PeerTable};
pub use config::{ClientConfig, NtpKey};
pub use error::{NtpdError, Status};
pub use protocol::NtpdProtocol;
pub use types::{FeatureFlags, Peer, PeerInfo, ProtocolKind, SysInfo};

// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Print the system peer and peer table of a local ntpd.
//!
//! Run with:
//!   RUST_LOG=info cargo run -p ntpctl-client --example ntpd_status -- [ADDRESS]
//!
//! With `NTPD_KEY="ID VALUE"` set, the example also disables and re-enables
//! ntpd's clock discipline:
//!   NTPD_KEY="1 secret" cargo run -p ntpctl-client --example ntpd_status

use std::net::SocketAddr;

use ntpctl_client::{NtpKey, NtpdClient};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let address: SocketAddr = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => ntpctl_client::config::DEFAULT_ADDRESS,
    };

    let mut builder = NtpdClient::builder().address(address);
    if let Ok(spec) = std::env::var("NTPD_KEY") {
        let key: NtpKey = spec.parse()?;
        builder = builder.key(key.id, key.value);
    }
    let mut client = builder.build()?;

    match client.selected() {
        Some(kind) => println!("talking to {address} over {kind}"),
        None => println!("{address} is not answering yet"),
    }

    let sys = client.get_sys_info()?;
    match sys.peer_address {
        Some(peer) => println!("system peer: {peer}"),
        None => println!("system peer: none"),
    }
    if let Some(features) = client.get_features() {
        if features.get_clock_control {
            println!("clock discipline enabled: {}", sys.clock_control_enabled);
        }
    }

    let peers = client.get_peer_info()?;
    println!("{} peers", peers.num_peers());
    print!("{}", peers.table());
    for peer in peers.peers.iter().filter(|peer| peer.selected) {
        println!(
            "selected peer offset {:.0} ns, error {:.0} ns",
            peer.best_offset(),
            peer.best_error()
        );
    }

    if std::env::var_os("NTPD_KEY").is_some() {
        client.clock_control(false)?;
        println!("clock discipline disabled");
        client.clock_control(true)?;
        println!("clock discipline enabled");
    }

    Ok(())
}

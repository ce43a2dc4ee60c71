// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The operations every management protocol instance provides.

use crate::error::NtpdError;
use crate::types::{FeatureFlags, PeerInfo, ProtocolKind, SysInfo};

/// A connection to the daemon over one management protocol.
///
/// Implemented by [`Mode6Client`](crate::mode6::Mode6Client) and
/// [`Mode7Client`](crate::mode7::Mode7Client); the
/// [`NtpdClient`](crate::NtpdClient) façade picks whichever answers.
pub trait NtpdProtocol: std::fmt::Debug {
    /// The protocol this instance speaks.
    fn kind(&self) -> ProtocolKind;

    /// Read the daemon-wide state.
    fn get_sys_info(&mut self) -> Result<SysInfo, NtpdError>;

    /// Read the daemon's peers.
    fn get_peer_info(&mut self) -> Result<PeerInfo, NtpdError>;

    /// Ask the daemon to start or stop disciplining the system clock.
    ///
    /// Needs a configured key.
    fn clock_control(&mut self, enable: bool) -> Result<(), NtpdError>;

    /// Check that the daemon answers this protocol.
    fn test_connection(&mut self) -> Result<(), NtpdError> {
        self.get_sys_info().map(|_| ())
    }

    /// Current capabilities.
    fn features(&self) -> FeatureFlags;
}

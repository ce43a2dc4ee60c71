// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Wire types for the ntpd management protocols.
//!
//! This crate provides the packet layouts, codes and parsing logic for the
//! mode 6 control protocol used by `ntpq` and the mode 7 private protocol
//! used by `ntpdc`, together with the keyed-MD5 request authentication both
//! protocols share. It performs no I/O; see the `ntpctl-client` crate for a
//! client built on top of it.

#![warn(missing_docs)]

/// Symmetric-key authentication of mode 6 and mode 7 requests.
pub mod auth;

/// Custom error types for buffer-based packet parsing and serialization.
pub mod error;

/// Mode 6 and mode 7 protocol types and constants.
pub mod protocol;

/// Unix time conversion utilities for NTP timestamps.
pub mod unix_time;

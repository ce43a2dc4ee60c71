// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Reassembly of fragmented daemon responses.
//!
//! Both protocols may split one response across several datagrams. A
//! reassembler is created per query, borrows the instance's response buffer
//! and is fed every datagram that arrives until it reports completion.
//! Datagrams that fail validation are discarded with a reason so the caller
//! can keep waiting; only daemon errors and conditions that cannot be
//! satisfied by further datagrams end the query.

use std::collections::BTreeMap;

use log::debug;
use ntpctl_proto::protocol::FromBytes;
use ntpctl_proto::protocol::control::{self, ControlHeader, Opcode};
use ntpctl_proto::protocol::private::{self, PrivateHeader, RequestCode};

use crate::error::{NtpdError, ProtocolError};

/// Largest number of mode 6 fragments tracked for one response.
pub const MAX_FRAGMENTS: usize = 32;

/// Number of distinct mode 7 sequence numbers.
const SEQUENCE_SPACE: usize = private::MAX_SEQUENCE as usize + 1;

/// What became of one datagram.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The datagram was ignored for the given reason.
    Discarded(&'static str),
    /// The datagram was accepted; more are needed.
    Accepted,
    /// The response is complete and this many bytes of the buffer hold it.
    Complete(usize),
}

/// Mode 6 reassembly, addressed by byte offset.
#[derive(Debug)]
pub struct ControlReassembler<'a> {
    buf: &'a mut [u8],
    sequence: u16,
    opcode: Opcode,
    association_id: u16,
    // offset -> count, kept sorted and disjoint
    fragments: BTreeMap<usize, usize>,
    seen_last: bool,
}

impl<'a> ControlReassembler<'a> {
    /// Reassemble the response to the request with the given sequence,
    /// opcode and association into `buf`.
    pub fn new(buf: &'a mut [u8], sequence: u16, opcode: Opcode, association_id: u16) -> Self {
        ControlReassembler {
            buf,
            sequence,
            opcode,
            association_id,
            fragments: BTreeMap::new(),
            seen_last: false,
        }
    }

    /// Number of fragments accepted so far.
    pub fn fragments(&self) -> usize {
        self.fragments.len()
    }

    /// Feed one received datagram.
    pub fn accept(&mut self, packet: &[u8]) -> Result<Outcome, NtpdError> {
        let Ok((header, _)) = ControlHeader::from_bytes(packet) else {
            return Ok(Outcome::Discarded("undersize packet"));
        };
        if !header.version().is_known() {
            return Ok(Outcome::Discarded("unknown version"));
        }
        if header.mode != control::MODE_CONTROL {
            return Ok(Outcome::Discarded("not a control message"));
        }
        if !header.response {
            return Ok(Outcome::Discarded("not a response"));
        }
        if header.sequence != self.sequence {
            return Ok(Outcome::Discarded("sequence mismatch"));
        }
        if header.opcode != self.opcode as u8 {
            return Ok(Outcome::Discarded("opcode mismatch"));
        }

        if header.error {
            return Err(NtpdError::Control(header.control_error()));
        }

        if header.association_id != self.association_id {
            debug!(
                "association id mismatch: sent {}, got {}",
                self.association_id,
                header.association_id
            );
        }

        let len = packet.len();
        if len % 4 != 0 {
            return Ok(Outcome::Discarded("length not a multiple of 4"));
        }

        let count = usize::from(header.count);
        let offset = usize::from(header.offset);
        let should_be = (control::HEADER_LEN + count + 3) & !3;
        if len < should_be {
            return Err(NtpdError::Malformed(ProtocolError::ShortFragment {
                claimed: count,
                received: len,
            }));
        }

        if count == 0 && header.more {
            return Ok(Outcome::Discarded("empty non-final fragment"));
        }

        if offset + count > self.buf.len() {
            return Err(NtpdError::ResponseTooLarge);
        }

        if self.seen_last && !header.more {
            return Ok(Outcome::Discarded("second final fragment"));
        }

        if self.fragments.contains_key(&offset) {
            return Ok(Outcome::Discarded("duplicate fragment"));
        }
        if let Some((&prev_offset, &prev_count)) = self.fragments.range(..offset).next_back() {
            if prev_offset + prev_count > offset {
                return Ok(Outcome::Discarded("overlaps previous fragment"));
            }
        }
        if let Some((&next_offset, _)) = self.fragments.range(offset..).next() {
            if offset + count > next_offset {
                return Ok(Outcome::Discarded("overlaps next fragment"));
            }
        }

        if self.fragments.len() >= MAX_FRAGMENTS {
            return Err(NtpdError::FragmentLimitExceeded);
        }

        self.fragments.insert(offset, count);
        if !header.more {
            self.seen_last = true;
        }
        let data = &packet[control::HEADER_LEN..control::HEADER_LEN + count];
        self.buf[offset..offset + count].copy_from_slice(data);

        match self.contiguous_len() {
            Some(total) => Ok(Outcome::Complete(total)),
            None => Ok(Outcome::Accepted),
        }
    }

    // Total length once the final fragment is in and there are no gaps.
    fn contiguous_len(&self) -> Option<usize> {
        if !self.seen_last {
            return None;
        }
        let mut end = 0;
        for (&offset, &count) in &self.fragments {
            if offset != end {
                return None;
            }
            end = offset + count;
        }
        Some(end)
    }
}

/// Mode 7 reassembly, addressed by sequence number.
///
/// Items are stored in arrival order, each zero-padded to the slot size so
/// records from daemons with shorter layouts decode as if the missing fields
/// were zero.
#[derive(Debug)]
pub struct PrivateReassembler<'a> {
    buf: &'a mut [u8],
    request: RequestCode,
    expected_item_size: usize,
    first_item_size: Option<usize>,
    slot: usize,
    have_seq: [bool; SEQUENCE_SPACE],
    last_seq: Option<usize>,
    pkts_received: usize,
    items: usize,
    len: usize,
}

impl<'a> PrivateReassembler<'a> {
    /// Reassemble the response to `request` into `buf`, giving each item at
    /// least `expected_item_size` bytes.
    pub fn new(buf: &'a mut [u8], request: RequestCode, expected_item_size: usize) -> Self {
        PrivateReassembler {
            buf,
            request,
            expected_item_size,
            first_item_size: None,
            slot: expected_item_size,
            have_seq: [false; SEQUENCE_SPACE],
            last_seq: None,
            pkts_received: 0,
            items: 0,
            len: 0,
        }
    }

    /// Number of items received so far.
    pub fn items(&self) -> usize {
        self.items
    }

    /// Bytes occupied by each item in the buffer.
    pub fn slot_size(&self) -> usize {
        self.slot
    }

    /// Feed one received datagram.
    pub fn accept(&mut self, packet: &[u8]) -> Result<Outcome, NtpdError> {
        let Ok((header, _)) = PrivateHeader::from_bytes(packet) else {
            return Ok(Outcome::Discarded("undersize packet"));
        };
        if !header.version().is_known() {
            return Ok(Outcome::Discarded("unknown version"));
        }
        if header.mode != private::MODE_PRIVATE {
            return Ok(Outcome::Discarded("not a private message"));
        }
        if header.auth {
            return Ok(Outcome::Discarded("authenticated response"));
        }
        if !header.response {
            return Ok(Outcome::Discarded("not a response"));
        }
        if header.mbz != 0 {
            return Ok(Outcome::Discarded("non-zero mbz"));
        }
        if header.implementation != private::IMPL_XNTPD {
            return Ok(Outcome::Discarded("implementation mismatch"));
        }
        if header.request != self.request as u8 {
            return Ok(Outcome::Discarded("request code mismatch"));
        }

        if let Some(err) = header.info_error() {
            return Err(NtpdError::Private(err));
        }

        let nitems = usize::from(header.nitems);
        let itemsize = usize::from(header.itemsize);
        let data = &packet[private::HEADER_LEN..];
        if nitems * itemsize > data.len() {
            return Ok(Outcome::Discarded("items exceed datagram"));
        }

        let slot = match self.first_item_size {
            Some(first) => {
                if itemsize < first || itemsize > self.slot {
                    return Ok(Outcome::Discarded("inconsistent item size"));
                }
                self.slot
            }
            None => self.expected_item_size.max(itemsize),
        };

        let seq = usize::from(header.sequence);
        if self.have_seq[seq] {
            return Ok(Outcome::Discarded("duplicate sequence"));
        }
        if !header.more && self.last_seq.is_some() {
            return Ok(Outcome::Discarded("second final fragment"));
        }

        if self.len + nitems * slot > self.buf.len() {
            return Err(NtpdError::ResponseTooLarge);
        }

        if self.first_item_size.is_none() {
            self.first_item_size = Some(itemsize);
            self.slot = slot;
        }
        self.have_seq[seq] = true;
        if !header.more {
            self.last_seq = Some(seq);
        }

        for i in 0..nitems {
            let item = &data[i * itemsize..(i + 1) * itemsize];
            let dest = &mut self.buf[self.len..self.len + slot];
            dest[..itemsize].copy_from_slice(item);
            dest[itemsize..].fill(0);
            self.len += slot;
        }
        self.items += nitems;
        self.pkts_received += 1;

        match self.last_seq {
            Some(last) if self.pkts_received > last => Ok(Outcome::Complete(self.len)),
            _ => Ok(Outcome::Accepted),
        }
    }
}

//! pingwire wire format — ICMP Echo frames carrying payload chunks.
//!
//! ```text
//! offset 0:  type       (1 byte)   8 = Echo Request
//! offset 1:  code       (1 byte)   0
//! offset 2:  checksum   (2 bytes, network order)
//! offset 4:  identifier (2 bytes, network order)
//! offset 6:  sequence   (2 bytes, network order)
//! offset 8+: data       (even length, one zero pad byte if the chunk is odd)
//! ```
//!
//! Datagrams read from a raw socket carry a 20-byte IPv4 header in front of
//! the frame. It is stripped unconditionally; IP options are not expected.
//! The header types are zerocopy structs with network-endian fields, so
//! serialization needs no unsafe code and no manual byte shuffling.

use std::net::Ipv4Addr;

use bytes::Bytes;
use static_assertions::assert_eq_size;
use zerocopy::byteorder::{NetworkEndian, U16};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

use crate::checksum::header_checksum;

// ── Constants ─────────────────────────────────────────────────────────────────

/// ICMP Echo Request. The only type accepted inbound.
pub const ICMP_ECHO_REQUEST: u8 = 8;

/// ICMP Echo Reply. Seen on the receive socket when the kernel answers our
/// own pings; always ignored.
pub const ICMP_ECHO_REPLY: u8 = 0;

/// Echo messages always carry code 0.
pub const ICMP_ECHO_CODE: u8 = 0;

/// Size of the echo header preceding the data segment.
pub const ECHO_HEADER_LEN: usize = 8;

/// Size of the outer IPv4 header stripped from every received datagram.
pub const IPV4_HEADER_LEN: usize = 20;

/// IP protocol number for ICMP.
pub const IPPROTO_ICMP: u8 = 1;

// ── Echo Header ───────────────────────────────────────────────────────────────

/// Fixed 8-byte ICMP echo header.
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct EchoHeader {
    pub kind: u8,
    pub code: u8,
    pub checksum: U16<NetworkEndian>,
    pub identifier: U16<NetworkEndian>,
    pub sequence: U16<NetworkEndian>,
}

assert_eq_size!(EchoHeader, [u8; ECHO_HEADER_LEN]);

impl EchoHeader {
    pub fn new(kind: u8, code: u8, identifier: u16, sequence: u16) -> Self {
        Self {
            kind,
            code,
            checksum: U16::ZERO,
            identifier: U16::new(identifier),
            sequence: U16::new(sequence),
        }
    }
}

// ── Echo Frame ────────────────────────────────────────────────────────────────

/// A decoded frame. `data` still carries any pad byte added by the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoFrame {
    pub kind: u8,
    pub code: u8,
    pub checksum: u16,
    pub identifier: u16,
    pub sequence: u16,
    pub data: Bytes,
}

impl EchoFrame {
    /// Encode an Echo Request (type 8, code 0) carrying `data`.
    pub fn request(identifier: u16, sequence: u16, data: &[u8]) -> Vec<u8> {
        encode(ICMP_ECHO_REQUEST, ICMP_ECHO_CODE, identifier, sequence, data)
    }

    pub fn is_echo_request(&self) -> bool {
        self.kind == ICMP_ECHO_REQUEST
    }
}

/// Build a complete frame: header, data, optional pad byte, checksum.
///
/// The checksum is computed over the whole buffer with the checksum field
/// zeroed, then written in place. Oversized `data` is the caller's problem;
/// the segmenter keeps chunks well under the ICMP limit.
pub fn encode(kind: u8, code: u8, identifier: u16, sequence: u16, data: &[u8]) -> Vec<u8> {
    let mut header = EchoHeader::new(kind, code, identifier, sequence);

    let padded_len = data.len() + data.len() % 2;
    let mut frame = Vec::with_capacity(ECHO_HEADER_LEN + padded_len);
    frame.extend_from_slice(header.as_bytes());
    frame.extend_from_slice(data);
    frame.resize(ECHO_HEADER_LEN + padded_len, 0);

    header.checksum = U16::new(header_checksum(&frame));
    frame[..ECHO_HEADER_LEN].copy_from_slice(header.as_bytes());
    frame
}

/// Decode an ICMP region (no outer IP header).
///
/// The checksum is read but not validated.
pub fn decode_icmp(icmp: &[u8]) -> Result<EchoFrame, WireError> {
    let header = EchoHeader::read_from_prefix(icmp).ok_or(WireError::Truncated {
        len: icmp.len(),
        needed: ECHO_HEADER_LEN,
    })?;

    Ok(EchoFrame {
        kind: header.kind,
        code: header.code,
        checksum: header.checksum.get(),
        identifier: header.identifier.get(),
        sequence: header.sequence.get(),
        data: Bytes::copy_from_slice(&icmp[ECHO_HEADER_LEN..]),
    })
}

/// Decode a datagram as delivered by a raw socket: IPv4 header, then frame.
pub fn decode_datagram(datagram: &[u8]) -> Result<EchoFrame, WireError> {
    let needed = IPV4_HEADER_LEN + ECHO_HEADER_LEN;
    if datagram.len() < needed {
        return Err(WireError::Truncated { len: datagram.len(), needed });
    }
    decode_icmp(&datagram[IPV4_HEADER_LEN..])
}

/// True when the checksum stored in `icmp` matches its contents.
pub fn verify(icmp: &[u8]) -> bool {
    icmp.len() >= ECHO_HEADER_LEN && crate::checksum::checksum(icmp) == 0
}

// ── IPv4 Envelope ─────────────────────────────────────────────────────────────

/// Minimal IPv4 header (no options), as a raw ICMP socket delivers it.
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct Ipv4Envelope {
    pub version_ihl: u8,
    pub tos: u8,
    pub total_len: U16<NetworkEndian>,
    pub id: U16<NetworkEndian>,
    pub flags_fragment: U16<NetworkEndian>,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: U16<NetworkEndian>,
    pub src: [u8; 4],
    pub dst: [u8; 4],
}

assert_eq_size!(Ipv4Envelope, [u8; IPV4_HEADER_LEN]);

impl Ipv4Envelope {
    /// Prefix `icmp` with an IPv4 header addressed `src` → `dst`.
    pub fn wrap(src: Ipv4Addr, dst: Ipv4Addr, icmp: &[u8]) -> Vec<u8> {
        let total_len = (IPV4_HEADER_LEN + icmp.len()).min(u16::MAX as usize) as u16;
        let mut header = Self {
            version_ihl: 0x45,
            tos: 0,
            total_len: U16::new(total_len),
            id: U16::ZERO,
            flags_fragment: U16::new(0x4000), // don't fragment
            ttl: 64,
            protocol: IPPROTO_ICMP,
            checksum: U16::ZERO,
            src: src.octets(),
            dst: dst.octets(),
        };
        header.checksum = U16::new(header_checksum(header.as_bytes()));

        let mut datagram = Vec::with_capacity(IPV4_HEADER_LEN + icmp.len());
        datagram.extend_from_slice(header.as_bytes());
        datagram.extend_from_slice(icmp);
        datagram
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("datagram of {len} bytes is shorter than the {needed} bytes required")]
    Truncated { len: usize, needed: usize },
}

// ── Tests ─────────────────────────────────────────────────────────────────────

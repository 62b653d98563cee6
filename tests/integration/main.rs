//! pingwire integration test harness.
//!
//! Scenarios run sender and listener against each other over the in-process
//! transport on tokio's paused clock, so session timeouts are exact and the
//! suite needs no privileges.
//!
//! `raw_socket` additionally exercises a real raw ICMP socket on loopback.
//! It needs root or CAP_NET_RAW and skips itself otherwise:
//!
//!   sudo -E cargo test --test integration raw_socket

use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::{Context, Result};

use pingwire_core::wire::Ipv4Envelope;
use pingwire_core::Record;
use pingwire_net::{MemoryTransport, RawIcmpSocket, SessionListener, Sender};

mod raw_socket;
mod scenarios;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const SENDER_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);
pub const RECEIVER_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 21);
pub const WINDOW: Duration = Duration::from_millis(500);

/// A sender and a listener joined by an in-process link.
pub fn linked(chunk_size: usize) -> Result<(Sender<MemoryTransport>, SessionListener<MemoryTransport>)> {
    let (tx, rx) = MemoryTransport::pair(SENDER_ADDR, RECEIVER_ADDR);
    let sender = Sender::new(tx, RECEIVER_ADDR, chunk_size).context("sender")?;
    let listener = SessionListener::new(rx, WINDOW).context("listener")?;
    Ok((sender, listener))
}

/// What a raw socket on the receiver would read for `icmp`.
pub fn datagram(icmp: &[u8]) -> Vec<u8> {
    Ipv4Envelope::wrap(SENDER_ADDR, RECEIVER_ADDR, icmp)
}

pub fn sequences(records: &[Record]) -> Vec<u16> {
    records.iter().map(|r| r.sequence).collect()
}

/// Pseudo-random lowercase text that compresses poorly.
pub fn noise(len: u32) -> String {
    (0..len)
        .map(|i| char::from(b'a' + ((i.wrapping_mul(2_654_435_761) >> 13) % 26) as u8))
        .collect()
}

/// Open a raw ICMP socket, or print SKIP and return None when this process
/// lacks the privilege. Call from inside a tokio runtime.
pub fn open_raw_or_skip() -> Option<RawIcmpSocket> {
    match RawIcmpSocket::open(0) {
        Ok(socket) => Some(socket),
        Err(e) => {
            eprintln!("SKIP: raw ICMP socket unavailable ({e}); run as root");
            None
        }
    }
}

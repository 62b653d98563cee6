//! Receive-side session state.
//!
//! A session is one burst of Echo Requests bounded by silence. The state
//! machine here is pure: the caller feeds it datagrams and tells it when the
//! inactivity timer fired. Timing itself belongs to whoever drives it.
//!
//!   Idle   ── datagram ──▶ Active ── datagram ──▶ Active
//!                            │
//!                            └──── timeout ─────▶ Closed ── finish() ──▶ records
//!
//! Any datagram counts as traffic for the timer, but only Echo Requests are
//! recorded.

use bytes::Bytes;

use crate::wire::{decode_datagram, WireError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing received yet. Wait without a deadline.
    Idle,
    /// At least one datagram received. Wait up to the inactivity timeout.
    Active,
    /// The timeout elapsed; no more datagrams are taken.
    Closed,
}

/// One received chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub sequence: u16,
    pub data: Bytes,
}

/// What happened to a datagram handed to [`Session::observe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Accepted { sequence: u16, len: usize },
    /// Not an Echo Request. Carries the ICMP type.
    Ignored { kind: u8 },
    Malformed(WireError),
    /// The session was already closed.
    Rejected,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    records: Vec<Record>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take one raw datagram (outer IPv4 header included).
    pub fn observe(&mut self, datagram: &[u8]) -> Observation {
        if self.state == SessionState::Closed {
            return Observation::Rejected;
        }
        self.state = SessionState::Active;

        match decode_datagram(datagram) {
            Ok(frame) if frame.is_echo_request() => {
                let len = frame.data.len();
                self.records.push(Record {
                    sequence: frame.sequence,
                    data: frame.data,
                });
                Observation::Accepted {
                    sequence: frame.sequence,
                    len,
                }
            }
            Ok(frame) => Observation::Ignored { kind: frame.kind },
            Err(e) => Observation::Malformed(e),
        }
    }

    /// The inactivity timer fired.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Hand the collected records over, in arrival order.
    pub fn finish(self) -> Vec<Record> {
        self.records
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

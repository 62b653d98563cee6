//! Per-send field state: identifier and sequence counter.
//!
//! A `SendContext` lives for exactly one send call. Each call gets a fresh
//! random identifier and starts counting at 1, so nothing carries over
//! between payloads.

use rand::Rng;

use crate::wire::EchoFrame;

/// Identifiers are drawn from this range. Values in it look like the process
/// ids ordinary ping tools put in the field.
pub const IDENTIFIER_RANGE: std::ops::RangeInclusive<u16> = 1673..=23863;

/// First sequence number of every send.
pub const FIRST_SEQUENCE: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendContext {
    identifier: u16,
    sequence: u16,
}

impl SendContext {
    /// Fresh context with a random identifier.
    pub fn new() -> Self {
        Self::with_identifier(rand::thread_rng().gen_range(IDENTIFIER_RANGE))
    }

    pub fn with_identifier(identifier: u16) -> Self {
        Self {
            identifier,
            sequence: FIRST_SEQUENCE,
        }
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// Sequence number the next frame will carry.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Frame `data` as an Echo Request and advance the sequence.
    ///
    /// The counter wraps from 65535 to 0. A send of that many chunks is far
    /// beyond what one payload produces at sane chunk sizes.
    pub fn next_frame(&mut self, data: &[u8]) -> Vec<u8> {
        let frame = EchoFrame::request(self.identifier, self.sequence, data);
        self.sequence = self.sequence.wrapping_add(1);
        frame
    }
}

impl Default for SendContext {
    fn default() -> Self {
        Self::new()
    }
}

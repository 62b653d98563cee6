//! Errors surfaced by a send or a receive cycle.

use std::io;

use pingwire_core::config::ConfigError;
use pingwire_core::{ReassemblyError, SegmentError};

#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// The session's stream could not be decompressed or decoded.
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),

    /// Raised by the underlying socket; never retried.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),
}

impl TunnelError {
    /// True for failures that cost one session but leave the socket usable.
    pub fn is_session_local(&self) -> bool {
        matches!(self, TunnelError::Reassembly(_))
    }
}

//! pingwire-core — wire format, payload framing and session reassembly.
//! No I/O lives here; the transport crates drive these types.

pub mod checksum;
pub mod config;
pub mod reassemble;
pub mod segment;
pub mod sequencer;
pub mod session;
pub mod wire;

pub use reassemble::{reassemble, ReassemblyError};
pub use segment::{segment, SegmentError};
pub use sequencer::SendContext;
pub use session::{Observation, Record, Session, SessionState};
pub use wire::{EchoFrame, EchoHeader, WireError};

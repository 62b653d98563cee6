//! pingwire-net — drives the core protocol over a transport.
//!
//! The sender and listener are generic over [`Transport`], so the same code
//! runs against a raw ICMP socket in the binaries and an in-process link in
//! tests.

pub mod error;
pub mod listener;
pub mod memory;
pub mod sender;
pub mod transport;

pub use error::TunnelError;
pub use listener::SessionListener;
pub use memory::MemoryTransport;
pub use sender::{SendReport, Sender};
pub use transport::{RawIcmpSocket, Transport};

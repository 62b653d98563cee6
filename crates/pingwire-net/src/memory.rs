//! In-process transport.
//!
//! Two linked endpoints exchange frames over tokio channels. Each frame is
//! wrapped in an IPv4 header on the way, so the receiving side sees exactly
//! what a raw socket would hand it. A link with nothing queued behaves like
//! a quiet network: `recv` waits.

use std::io;
use std::net::Ipv4Addr;

use tokio::sync::{mpsc, Mutex};

use pingwire_core::wire::Ipv4Envelope;

use crate::transport::Transport;

pub struct MemoryTransport {
    local: Ipv4Addr,
    peer: mpsc::UnboundedSender<Vec<u8>>,
    injector: mpsc::UnboundedSender<Vec<u8>>,
    inbox: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryTransport {
    /// Two endpoints with the given addresses, each delivering to the other.
    pub fn pair(a: Ipv4Addr, b: Ipv4Addr) -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();

        let left = Self {
            local: a,
            peer: b_tx.clone(),
            injector: a_tx.clone(),
            inbox: Mutex::new(a_rx),
        };
        let right = Self {
            local: b,
            peer: a_tx,
            injector: b_tx,
            inbox: Mutex::new(b_rx),
        };
        (left, right)
    }

    /// Handle that delivers raw datagrams (IPv4 header included) to this
    /// endpoint. Usable from other tasks.
    pub fn injector(&self) -> mpsc::UnboundedSender<Vec<u8>> {
        self.injector.clone()
    }

    /// Deliver a raw datagram to this endpoint.
    pub fn inject(&self, datagram: Vec<u8>) {
        // The inbox is owned by self, so the channel is open.
        let _ = self.injector.send(datagram);
    }
}

impl Transport for MemoryTransport {
    async fn send_to(&self, frame: &[u8], dest: Ipv4Addr) -> io::Result<()> {
        let datagram = Ipv4Envelope::wrap(self.local, dest, frame);
        // A vanished peer is a lost datagram, not a send failure.
        if self.peer.send(datagram).is_err() {
            tracing::trace!(%dest, "peer endpoint dropped, datagram lost");
        }
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut inbox = self.inbox.lock().await;
        match inbox.recv().await {
            Some(datagram) => {
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(len)
            }
            None => std::future::pending().await,
        }
    }
}

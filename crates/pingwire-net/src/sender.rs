//! Sending — compress, chunk, frame, transmit.

use std::net::Ipv4Addr;

use pingwire_core::config::{ConfigError, SenderConfig};
use pingwire_core::segment::segment;
use pingwire_core::SendContext;

use crate::error::TunnelError;
use crate::transport::Transport;

/// Summary of one `send` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub identifier: u16,
    pub frames: usize,
    pub compressed_len: usize,
}

pub struct Sender<T> {
    transport: T,
    destination: Ipv4Addr,
    chunk_size: usize,
}

impl<T: Transport> Sender<T> {
    pub fn new(transport: T, destination: Ipv4Addr, chunk_size: usize) -> Result<Self, TunnelError> {
        if chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize.into());
        }
        Ok(Self {
            transport,
            destination,
            chunk_size,
        })
    }

    pub fn from_config(transport: T, config: &SenderConfig) -> Result<Self, TunnelError> {
        Self::new(transport, config.destination_addr()?, config.chunk_size)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `payload` as one burst of Echo Requests.
    ///
    /// Every call uses a fresh identifier and numbers its frames from 1.
    /// Frames go out back to back; the first transport error aborts the
    /// call and the rest of the burst is not sent.
    pub async fn send(&self, payload: &str) -> Result<SendReport, TunnelError> {
        let chunks = segment(payload, self.chunk_size)?;
        let compressed_len = chunks.iter().map(|c| c.len()).sum();

        let mut ctx = SendContext::new();
        for chunk in &chunks {
            let sequence = ctx.sequence();
            let frame = ctx.next_frame(chunk);

            self.transport
                .send_to(&frame, self.destination)
                .await
                .map_err(TunnelError::Transport)?;

            tracing::debug!(
                dest = %self.destination,
                identifier = ctx.identifier(),
                sequence,
                frame_len = frame.len(),
                "frame sent"
            );
        }

        tracing::info!(
            dest = %self.destination,
            identifier = ctx.identifier(),
            frames = chunks.len(),
            payload_len = payload.len(),
            compressed_len,
            "payload sent"
        );

        Ok(SendReport {
            identifier: ctx.identifier(),
            frames: chunks.len(),
            compressed_len,
        })
    }
}

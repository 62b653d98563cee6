//! Session listener — collects one burst of Echo Requests.
//!
//! The first datagram is awaited without a deadline. After that every
//! receive is bounded by the inactivity timeout, re-armed per datagram; the
//! first receive to exceed it closes the session. Each `listen` call starts
//! from a fresh Idle session, so no timeout leaks into the next one.
//!
//! Timing goes through `tokio::time`, which tests pause and advance.

use std::time::Duration;

use tokio::time::timeout;

use pingwire_core::config::{ConfigError, ReceiverConfig};
use pingwire_core::wire::{self, IPV4_HEADER_LEN};
use pingwire_core::{reassemble, Observation, Record, Session, SessionState};

use crate::error::TunnelError;
use crate::transport::Transport;

/// Large enough for any IPv4 datagram.
const RECV_BUFFER_LEN: usize = 65535;

pub struct SessionListener<T> {
    transport: T,
    inactivity: Duration,
    buf: Vec<u8>,
}

impl<T: Transport> SessionListener<T> {
    pub fn new(transport: T, inactivity: Duration) -> Result<Self, TunnelError> {
        if inactivity.is_zero() {
            return Err(ConfigError::InvalidTimeout.into());
        }
        Ok(Self {
            transport,
            inactivity,
            buf: vec![0u8; RECV_BUFFER_LEN],
        })
    }

    pub fn from_config(transport: T, config: &ReceiverConfig) -> Result<Self, TunnelError> {
        Self::new(transport, config.inactivity_timeout())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one Idle → Active → Closed cycle and return the raw records in
    /// arrival order.
    ///
    /// Malformed datagrams and non-request ICMP are skipped. Transport
    /// errors end the cycle and are returned as is.
    pub async fn listen(&mut self) -> Result<Vec<Record>, TunnelError> {
        let mut session = Session::new();

        loop {
            let received = match session.state() {
                SessionState::Idle => Some(self.transport.recv(&mut self.buf).await),
                SessionState::Active => timeout(self.inactivity, self.transport.recv(&mut self.buf))
                    .await
                    .ok(),
                SessionState::Closed => break,
            };

            let Some(result) = received else {
                session.close();
                continue;
            };
            let len = result.map_err(TunnelError::Transport)?;
            let datagram = &self.buf[..len];

            match session.observe(datagram) {
                Observation::Accepted { sequence, len } => {
                    if !wire::verify(&datagram[IPV4_HEADER_LEN..]) {
                        tracing::debug!(sequence, "checksum mismatch, keeping frame anyway");
                    }
                    tracing::trace!(
                        sequence,
                        data_len = len,
                        head = hex::encode(&datagram[IPV4_HEADER_LEN..IPV4_HEADER_LEN + 8]),
                        "echo request accepted"
                    );
                }
                Observation::Ignored { kind } => {
                    tracing::trace!(kind, "non-request ICMP ignored");
                }
                Observation::Malformed(e) => {
                    tracing::debug!(error = %e, "malformed datagram dropped");
                }
                Observation::Rejected => {}
            }
        }

        let records = session.finish();
        tracing::info!(
            frames = records.len(),
            inactivity_ms = self.inactivity.as_millis() as u64,
            "session closed"
        );
        Ok(records)
    }

    /// Listen for one session and rebuild its payload.
    pub async fn receive(&mut self) -> Result<String, TunnelError> {
        let records = self.listen().await?;
        match reassemble(records) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(error = %e, "session could not be reassembled");
                Err(e.into())
            }
        }
    }
}

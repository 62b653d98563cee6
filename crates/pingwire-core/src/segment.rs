//! Payload segmentation — compress, then cut into frame-sized chunks.
//!
//! Chunk boundaries are measured in compressed bytes. Every chunk except the
//! last has an even length so the sender's pad byte can only ever land after
//! the end of the zlib stream, where the decompressor ignores it.

use std::io::{self, Write};

use bytes::Bytes;
use flate2::{write::ZlibEncoder, Compression};

/// Default chunk size in compressed bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Compress `payload` at maximum level into a zlib stream.
pub fn compress(payload: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(payload)?;
    encoder.finish()
}

/// Compress `payload` and split the result into chunks of at most
/// `chunk_size` bytes, filled greedily in order.
///
/// An odd `chunk_size` is rounded down to even; a `chunk_size` of 1 behaves
/// as 2. The chunks share one underlying buffer.
pub fn segment(payload: &str, chunk_size: usize) -> Result<Vec<Bytes>, SegmentError> {
    if chunk_size == 0 {
        return Err(SegmentError::ZeroChunkSize);
    }

    let compressed = Bytes::from(compress(payload.as_bytes()).map_err(SegmentError::Compress)?);
    Ok(split(compressed, chunk_size))
}

/// Cut an already-compressed stream into chunks.
pub fn split(compressed: Bytes, chunk_size: usize) -> Vec<Bytes> {
    if compressed.len() <= chunk_size {
        return vec![compressed];
    }

    let stride = (chunk_size & !1).max(2);
    (0..compressed.len())
        .step_by(stride)
        .map(|start| compressed.slice(start..(start + stride).min(compressed.len())))
        .collect()
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("compression failed: {0}")]
    Compress(#[source] io::Error),
}

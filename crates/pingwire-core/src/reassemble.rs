//! Stream reassembly — order, join, inflate, decode.
//!
//! There is no gap or duplicate detection. Records are stably sorted by
//! sequence and joined as they are; a lost or repeated chunk surfaces as a
//! corrupt stream here, for the whole session.

use std::io::{self, Read};
use std::string::FromUtf8Error;

use flate2::read::ZlibDecoder;

use crate::session::Record;

/// Rebuild the original payload from one session's records.
pub fn reassemble(mut records: Vec<Record>) -> Result<String, ReassemblyError> {
    if records.is_empty() {
        return Err(ReassemblyError::Empty);
    }

    records.sort_by_key(|r| r.sequence);

    let total: usize = records.iter().map(|r| r.data.len()).sum();
    let mut compressed = Vec::with_capacity(total);
    for record in &records {
        compressed.extend_from_slice(&record.data);
    }

    // The decoder stops at the end of the zlib stream, so a trailing pad
    // byte on the last chunk is never read.
    let mut clean = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut clean)
        .map_err(ReassemblyError::Corrupt)?;

    String::from_utf8(clean).map_err(ReassemblyError::Decode)
}

#[derive(Debug, thiserror::Error)]
pub enum ReassemblyError {
    #[error("session ended without any echo request")]
    Empty,
    #[error("session stream is corrupt: {0}")]
    Corrupt(#[source] io::Error),
    #[error("session payload is not valid UTF-8: {0}")]
    Decode(#[source] FromUtf8Error),
}

//! Internet checksum (RFC 1071).
//!
//! Words are summed low byte first, the way a little-endian host reads the
//! buffer. The result is therefore byte-swapped relative to the big-endian
//! checksum; `wire` swaps it back (host-to-network) before storing it in the
//! header. One's-complement addition is byte-order independent, so the bytes
//! that reach the wire are identical to the classic big-endian computation.

/// Compute the one's-complement checksum of `data`.
///
/// Callers pad odd-length buffers with a zero byte. If they don't, the
/// trailing byte is summed as though that pad were present.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum = carry_around_add(sum, u16::from_le_bytes([word[0], word[1]]) as u32);
    }
    if let [last] = words.remainder() {
        sum = carry_around_add(sum, *last as u32);
    }

    !(sum as u16)
}

/// The checksum as it is stored in the header field (network order value).
pub fn header_checksum(data: &[u8]) -> u16 {
    checksum(data).swap_bytes()
}

fn carry_around_add(a: u32, b: u32) -> u32 {
    let c = a + b;
    (c & 0xFFFF) + (c >> 16)
}

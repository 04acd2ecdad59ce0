//! Nonce construction.
//!
//! Nonce uniqueness is the producer's responsibility (spec.md §4.2); the
//! receiver performs no nonce check at all, since replay defense is by
//! sequence number. This implementation uses the plain sequence counter,
//! zero-extended or truncated to the algorithm's nonce width, which the
//! spec explicitly calls out as an acceptable choice alongside a random or
//! obfuscated counter.
//!
//! BIND and BOUND are the one exception: both are sealed under the same
//! freshly adopted session key, by two different producers (transmitter,
//! receiver), before any other traffic exists to separate them. Mirroring
//! the transmitter's counter for BOUND would reuse its exact `(key, nonce)`
//! pair, which breaks OCB3 confidentiality for that pair of messages. The
//! receiver instead reserves the counter's top bit for its own nonce space
//! (spec.md §3 Invariant 4), which the transmitter's own counter — starting
//! at 1 and counting up from there for the life of the key — cannot reach.

/// Build a nonce of `nonce_len` bytes from `counter`, big-endian,
/// zero-extended on the left.
pub fn counter_nonce(counter: u32, nonce_len: usize) -> Vec<u8> {
    let full = (counter as u64).to_be_bytes();
    if nonce_len >= full.len() {
        let mut nonce = vec![0u8; nonce_len - full.len()];
        nonce.extend_from_slice(&full);
        nonce
    } else {
        full[full.len() - nonce_len..].to_vec()
    }
}

/// Reserved high bit separating the receiver's nonce space from the
/// transmitter's under a shared freshly-adopted key.
const RECEIVER_NONCE_BIT: u32 = 1 << 31;

/// Build the nonce the receiver uses to seal BOUND, keyed by the same
/// sequence number carried in the BIND it is answering but with the
/// reserved high bit set, so it can never collide with a nonce the
/// transmitter produced (or will produce) under that same key.
pub fn counter_nonce_for_receiver(counter: u32, nonce_len: usize) -> Vec<u8> {
    counter_nonce(counter | RECEIVER_NONCE_BIT, nonce_len)
}

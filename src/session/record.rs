//! A single paired transmitter's state, as held by the receiver.

use crate::protection::{ProtectionAlgorithm, SessionKey};

/// One receiver-side pairing record (spec.md §3).
///
/// `session_id` is ephemeral to the pairing, not tied to transmitter
/// identity — see [`crate::core`]'s module docs on the resulting partial
/// anonymity trade-off.
pub struct SessionRecord {
    /// The plaintext identifier frames are routed by.
    pub session_id: u32,
    /// Which AEAD variant this session uses.
    pub algorithm: ProtectionAlgorithm,
    /// The shared key, bootstrapped once over the private bus.
    pub key: SessionKey,
    /// The per-transmitter nonce the receiver last observed; tracked only
    /// for diagnostics, since nonce uniqueness is the transmitter's
    /// responsibility (spec.md §4.2) and anti-replay is by sequence number.
    pub last_nonce: Vec<u8>,
    /// Replay defense high-water mark (spec.md §3 Invariant 3).
    pub last_accepted_seq_no: u32,
}

impl SessionRecord {
    /// Build a freshly paired record with no accepted traffic yet.
    pub fn new(
        session_id: u32,
        algorithm: ProtectionAlgorithm,
        key: SessionKey,
        initial_seq_no: u32,
    ) -> Self {
        Self {
            session_id,
            algorithm,
            key,
            last_nonce: Vec::new(),
            last_accepted_seq_no: initial_seq_no,
        }
    }

    /// `true` if `seq` is strictly greater than the recorded high-water
    /// mark and so may be accepted.
    pub fn accepts(&self, seq: u32) -> bool {
        seq > self.last_accepted_seq_no
    }

    /// Record `seq` as accepted. Callers must have already checked
    /// [`Self::accepts`]; this does not re-check.
    pub fn mark_accepted(&mut self, seq: u32, nonce: &[u8]) {
        self.last_accepted_seq_no = seq;
        self.last_nonce.clear();
        self.last_nonce.extend_from_slice(nonce);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionRecord {
        SessionRecord::new(
            1,
            ProtectionAlgorithm::Aes128OcbTag64,
            SessionKey::from_bytes([0u8; 16]),
            1,
        )
    }

    #[test]
    fn rejects_seq_at_or_below_high_water_mark() {
        let record = sample();
        assert!(!record.accepts(1));
        assert!(!record.accepts(0));
        assert!(record.accepts(2));
    }

    #[test]
    fn mark_accepted_advances_high_water_mark() {
        let mut record = sample();
        record.mark_accepted(5, &[0, 1, 2, 3]);
        assert_eq!(record.last_accepted_seq_no, 5);
        assert!(!record.accepts(5));
        assert!(record.accepts(6));
    }
}

//! Transmitter-side persistence (spec.md §6: "Transmitter MUST persist its
//! key/session_id/seq counter").

use crate::core::TRANSMITTER_ID_SIZE;
use crate::protection::{ProtectionAlgorithm, SessionKey};

/// Everything a transmitter needs to survive a power cycle still paired.
#[derive(Clone)]
pub struct TransmitterKeyMaterial {
    /// The session id recorded from the HELLO that produced this pairing.
    pub session_id: u32,
    /// The adopted protection algorithm.
    pub algorithm: ProtectionAlgorithm,
    /// The adopted session key.
    pub key: SessionKey,
    /// The next sequence number to use.
    pub tx_seq: u32,
    /// Whether BOUND has not yet been received for this pairing.
    pub unbound: bool,
}

/// Durable storage for a transmitter's key material.
///
/// Representation is implementation-defined (spec.md §6); this crate
/// ships only the trait and an in-memory reference implementation for
/// tests. A real device backs this with double-buffered flash so a crash
/// mid-write never yields an inconsistent record.
pub trait TransmitterPersistence {
    /// Load the persisted key material, if any.
    fn load(&self) -> Option<TransmitterKeyMaterial>;

    /// Persist `material`, replacing whatever was stored before.
    fn save(&mut self, material: &TransmitterKeyMaterial);

    /// Wipe any persisted key material (factory reset); `transmitter_id`
    /// is unaffected, since it has its own load/save pair below.
    fn clear(&mut self);

    /// Load the persisted `transmitter_id`, if one was ever saved.
    fn load_transmitter_id(&self) -> Option<[u8; TRANSMITTER_ID_SIZE]>;

    /// Persist `transmitter_id`, replacing whatever was stored before.
    ///
    /// Called once at first boot and again on every `factory_reset()`
    /// (spec.md §9 Open Question: factory reset regenerates
    /// `transmitter_id` from the random source).
    fn save_transmitter_id(&mut self, transmitter_id: &[u8; TRANSMITTER_ID_SIZE]);
}

/// An in-memory [`TransmitterPersistence`] for tests and simulation; not
/// durable across process restarts.
#[derive(Default)]
pub struct InMemoryTransmitterPersistence {
    slot: Option<TransmitterKeyMaterial>,
    transmitter_id: Option<[u8; TRANSMITTER_ID_SIZE]>,
}

impl TransmitterPersistence for InMemoryTransmitterPersistence {
    fn load(&self) -> Option<TransmitterKeyMaterial> {
        self.slot.clone()
    }

    fn save(&mut self, material: &TransmitterKeyMaterial) {
        self.slot = Some(material.clone());
    }

    fn clear(&mut self) {
        self.slot = None;
    }

    fn load_transmitter_id(&self) -> Option<[u8; TRANSMITTER_ID_SIZE]> {
        self.transmitter_id
    }

    fn save_transmitter_id(&mut self, transmitter_id: &[u8; TRANSMITTER_ID_SIZE]) {
        self.transmitter_id = Some(*transmitter_id);
    }
}

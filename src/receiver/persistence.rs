//! Receiver-side persistence (spec.md §6: "Receiver MUST persist its
//! session table ... across power loss").

use crate::protection::{ProtectionAlgorithm, SessionKey};

/// A durable copy of one [`crate::session::SessionRecord`]'s fields. Kept
/// separate from `SessionRecord` itself so the session store stays free of
/// persistence concerns (spec.md §9's "persistence is a host-provided
/// capability").
#[derive(Clone)]
pub struct PersistedSession {
    /// The session id.
    pub session_id: u32,
    /// The negotiated protection algorithm.
    pub algorithm: ProtectionAlgorithm,
    /// The shared key.
    pub key: SessionKey,
    /// The replay high-water mark.
    pub last_accepted_seq_no: u32,
}

/// Durable storage for a receiver's session table.
///
/// Representation is implementation-defined (spec.md §6); this crate ships
/// only the trait and an in-memory reference implementation for tests. A
/// real device backs this with double-buffered flash so a crash mid-write
/// never yields an inconsistent table.
pub trait ReceiverPersistence {
    /// Load every persisted session record. Order is unspecified.
    fn load_all(&self) -> Vec<PersistedSession>;

    /// Persist or update one record.
    fn save(&mut self, session: &PersistedSession);

    /// Remove one record by session id, if present.
    fn remove(&mut self, session_id: u32);

    /// Wipe every record (factory reset).
    fn clear(&mut self);
}

/// An in-memory [`ReceiverPersistence`] for tests and simulation; not
/// durable across process restarts.
#[derive(Default)]
pub struct InMemoryReceiverPersistence {
    records: Vec<PersistedSession>,
}

impl ReceiverPersistence for InMemoryReceiverPersistence {
    fn load_all(&self) -> Vec<PersistedSession> {
        self.records.clone()
    }

    fn save(&mut self, session: &PersistedSession) {
        if let Some(existing) = self.records.iter_mut().find(|r| r.session_id == session.session_id) {
            *existing = session.clone();
        } else {
            self.records.push(session.clone());
        }
    }

    fn remove(&mut self, session_id: u32) {
        self.records.retain(|r| r.session_id != session_id);
    }

    fn clear(&mut self) {
        self.records.clear();
    }
}

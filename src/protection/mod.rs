//! AEAD encrypt/decrypt, nonce handling, and associated-data scoping (C2).

pub mod aead;
pub mod algorithm;
pub mod envelope;
pub mod nonce;

pub use aead::{open, seal, SessionKey};
pub use algorithm::ProtectionAlgorithm;
pub use envelope::{open_frame, seal_frame};
pub use nonce::{counter_nonce, counter_nonce_for_receiver};

//! The receiver state machine and its configuration/persistence (C5).

pub mod config;
pub mod fsm;
pub mod persistence;

pub use config::{ReceiverConfig, ReceiverConfigBuilder};
pub use fsm::ReceiverFsm;
pub use persistence::{InMemoryReceiverPersistence, PersistedSession, ReceiverPersistence};

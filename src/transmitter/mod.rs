//! The transmitter state machine and its configuration/persistence (C4).

pub mod config;
pub mod fsm;
pub mod persistence;

pub use config::{TransmitterConfig, TransmitterConfigBuilder};
pub use fsm::TransmitterFsm;
pub use persistence::{InMemoryTransmitterPersistence, TransmitterKeyMaterial, TransmitterPersistence};

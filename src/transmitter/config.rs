//! Transmitter configuration.

use crate::core::{INTERFACE_BUTTON_ACT, MIN_SYMBOL_UNIT_MICROS, PAIRING_TIMEOUT_MS, PREAMBLE_SYMBOLS};

/// Fixed parameters for a [`super::TransmitterFsm`] instance.
#[derive(Debug, Clone)]
pub struct TransmitterConfig {
    /// Interface types this transmitter can actuate, intersected against a
    /// HELLO's offered set when choosing what to BIND with.
    pub capabilities: Vec<u8>,
    /// How long `set_pairing()` waits for a HELLO before giving up.
    pub pairing_timeout_ms: u64,
    /// Duration of one preamble (spec.md §4.6's unit for burst/spacing
    /// timing), in milliseconds, at this device's symbol rate.
    pub preamble_length_ms: u64,
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        // A symbol at the slowest allowed unit duration is up to 3 units
        // wide (the `0` encoding); the preamble is `PREAMBLE_SYMBOLS` of
        // those. This is a conservative default a host overrides once it
        // knows its actual driver's symbol rate.
        let preamble_length_ms =
            (PREAMBLE_SYMBOLS as u64 * 3 * MIN_SYMBOL_UNIT_MICROS as u64).div_ceil(1000).max(1);
        Self {
            capabilities: vec![INTERFACE_BUTTON_ACT],
            pairing_timeout_ms: PAIRING_TIMEOUT_MS,
            preamble_length_ms,
        }
    }
}

/// Builder for [`TransmitterConfig`].
#[derive(Debug, Default)]
pub struct TransmitterConfigBuilder {
    config: TransmitterConfig,
}

impl TransmitterConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the capability set.
    pub fn capabilities(mut self, capabilities: Vec<u8>) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    /// Override the pairing timeout.
    pub fn pairing_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.pairing_timeout_ms = timeout_ms;
        self
    }

    /// Override the preamble length used to derive burst/spacing timing.
    pub fn preamble_length_ms(mut self, preamble_length_ms: u64) -> Self {
        self.config.preamble_length_ms = preamble_length_ms;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TransmitterConfig {
        self.config
    }
}

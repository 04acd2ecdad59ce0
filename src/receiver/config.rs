//! Receiver configuration.

use crate::core::{
    CONFIGURING_AFTER_ACT_MS, CONFIGURING_AFTER_BIND_MS, HELLO_INTERVAL_MS, INTERFACE_BUTTON_ACT,
    MIN_SYMBOL_UNIT_MICROS, PAIRING_TIMEOUT_MS, PREAMBLE_SYMBOLS, PROTECTION_AES128_OCB_TAG64,
    STARTING_MIN_MS, UNPAIRING_TIMEOUT_MS,
};

/// Fixed parameters for a [`super::ReceiverFsm`] instance.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Maximum number of paired transmitters (`N_MAX`, spec.md §3/§4.3).
    pub session_capacity: usize,
    /// Interface types this receiver can actuate.
    pub interfaces: Vec<u8>,
    /// Candidate protection algorithms offered in HELLO, most preferred
    /// first. Default: tag-64 only, per spec.md §4.5's stated default.
    pub protection_algorithms: Vec<u8>,
    /// Minimum time spent in `STARTING` before choosing `IDLE`/`CONFIGURING`.
    pub starting_min_ms: u64,
    /// `PAIRING`/`UNPAIRING` window.
    pub pairing_timeout_ms: u64,
    /// `CONFIGURING` window after a successful `BIND`.
    pub configuring_after_bind_ms: u64,
    /// `CONFIGURING` re-arm window after an authenticated `ACT`/`CONFIGURE`.
    pub configuring_after_act_ms: u64,
    /// Periodic `HELLO` broadcast interval while `PAIRING`.
    pub hello_interval_ms: u64,
    /// Duration of one preamble, in milliseconds, at this device's symbol
    /// rate — used for the governor's hold-off/burst-spacing timing.
    pub preamble_length_ms: u64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        let preamble_length_ms =
            (PREAMBLE_SYMBOLS as u64 * 3 * MIN_SYMBOL_UNIT_MICROS as u64).div_ceil(1000).max(1);
        Self {
            session_capacity: 8,
            interfaces: vec![INTERFACE_BUTTON_ACT],
            protection_algorithms: vec![PROTECTION_AES128_OCB_TAG64],
            starting_min_ms: STARTING_MIN_MS,
            pairing_timeout_ms: PAIRING_TIMEOUT_MS,
            configuring_after_bind_ms: CONFIGURING_AFTER_BIND_MS,
            configuring_after_act_ms: CONFIGURING_AFTER_ACT_MS,
            hello_interval_ms: HELLO_INTERVAL_MS,
            preamble_length_ms,
        }
    }
}

impl ReceiverConfig {
    /// The `UNPAIRING` window; shares `pairing_timeout_ms` by default per
    /// spec.md §4.5 (both are 10 s).
    pub fn unpairing_timeout_ms(&self) -> u64 {
        UNPAIRING_TIMEOUT_MS
    }
}

/// Builder for [`ReceiverConfig`].
#[derive(Debug, Default)]
pub struct ReceiverConfigBuilder {
    config: ReceiverConfig,
}

impl ReceiverConfigBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the session store's capacity.
    pub fn session_capacity(mut self, capacity: usize) -> Self {
        self.config.session_capacity = capacity;
        self
    }

    /// Replace the interface set this receiver can actuate.
    pub fn interfaces(mut self, interfaces: Vec<u8>) -> Self {
        self.config.interfaces = interfaces;
        self
    }

    /// Replace the candidate protection algorithms offered in HELLO.
    pub fn protection_algorithms(mut self, algorithms: Vec<u8>) -> Self {
        self.config.protection_algorithms = algorithms;
        self
    }

    /// Override the preamble length used to derive governor timing.
    pub fn preamble_length_ms(mut self, preamble_length_ms: u64) -> Self {
        self.config.preamble_length_ms = preamble_length_ms;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ReceiverConfig {
        self.config
    }
}

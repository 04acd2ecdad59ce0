//! Protocol constants from the Openepo specification.
//!
//! These values are fixed by the protocol version and MUST NOT be changed.

// =============================================================================
// WIRE FORMAT (v1)
// =============================================================================

/// The only protocol version this crate speaks.
pub const PROTOCOL_VERSION: u8 = 1;

/// Session id size in bytes.
pub const SESSION_ID_SIZE: usize = 4;

/// AES-128-OCB3 key size in bytes.
pub const PROTECTION_KEY_SIZE: usize = 16;

/// Nonce width for the tag-128 protection variant.
pub const NONCE_SIZE_TAG128: usize = 8;

/// Nonce width for the tag-64 protection variant.
pub const NONCE_SIZE_TAG64: usize = 4;

/// Width of the sequence number carried in the encrypted header.
pub const SEQUENCE_NUMBER_SIZE: usize = 4;

/// Chosen width for `transmitter_id` (open question in spec.md, resolved to
/// the reference implementation's 8 bytes).
pub const TRANSMITTER_ID_SIZE: usize = 8;

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// Reserved, never sent.
pub const MSG_TYPE_RESERVED: u8 = 0;
/// HELLO: private bus, receiver -> transmitter, plaintext only.
pub const MSG_TYPE_HELLO: u8 = 1;
/// BOUND: private bus, receiver -> transmitter, encrypted.
pub const MSG_TYPE_BOUND: u8 = 2;
/// BIND: public bus, transmitter -> receiver, encrypted.
pub const MSG_TYPE_BIND: u8 = 3;
/// UNBIND: public bus, encrypted.
pub const MSG_TYPE_UNBIND: u8 = 4;
/// CONFIGURE: public bus, encrypted, empty bodies.
pub const MSG_TYPE_CONFIGURE: u8 = 5;
/// ACT: public bus, encrypted.
pub const MSG_TYPE_ACT: u8 = 8;

// =============================================================================
// PROTECTION ALGORITHMS (registered)
// =============================================================================

/// AEAD_AES_128_OCB_TAGLEN128.
pub const PROTECTION_AES128_OCB_TAG128: u8 = 20;
/// AEAD_AES_128_OCB_TAGLEN64.
pub const PROTECTION_AES128_OCB_TAG64: u8 = 22;
/// Lowest id reserved for private use.
pub const PROTECTION_PRIVATE_USE_MIN: u8 = 128;

// =============================================================================
// INTERFACE DESCRIPTORS
// =============================================================================

/// The one registered interface type.
pub const INTERFACE_BUTTON_ACT: u8 = 1;

// =============================================================================
// MODULATION / FRAMING (C1)
// =============================================================================

/// Number of `0` symbols in the preamble.
pub const PREAMBLE_SYMBOLS: usize = 7;

/// Minimum symbol unit duration, per §4.1.
pub const MIN_SYMBOL_UNIT_MICROS: u32 = 10;

/// Upper bound on the on-air bit rate.
pub const MAX_BIT_RATE_BPS: u32 = 33_000;

/// Largest decoded frame payload [`crate::codec::decode_symbols`] will
/// accept before reporting [`crate::core::CodecError::FrameTooLong`].
pub const MAX_FRAME_SIZE: usize = 256;

// =============================================================================
// TIMING (C4/C5)
// =============================================================================

/// Transmitter and receiver pairing window.
pub const PAIRING_TIMEOUT_MS: u64 = 10_000;

/// Receiver CONFIGURING window after a successful BIND.
pub const CONFIGURING_AFTER_BIND_MS: u64 = 30_000;

/// Receiver CONFIGURING re-arm window after an authenticated ACT/CONFIGURE.
pub const CONFIGURING_AFTER_ACT_MS: u64 = 10_000;

/// Receiver UNPAIRING window.
pub const UNPAIRING_TIMEOUT_MS: u64 = 10_000;

/// Minimum time the receiver stays in STARTING before choosing IDLE/CONFIGURING.
pub const STARTING_MIN_MS: u64 = 100;

/// Periodic HELLO broadcast interval while PAIRING.
pub const HELLO_INTERVAL_MS: u64 = 400;

// =============================================================================
// GOVERNOR (C6)
// =============================================================================

/// Post-error silence, in preamble-lengths, before a new preamble is accepted.
pub const HOLDOFF_PREAMBLE_LENGTHS: u32 = 64;

/// Intra-burst spacing, in preamble-lengths.
pub const BURST_SPACING_PREAMBLE_LENGTHS: u32 = 128;

/// Inter-burst / unbursted-frame spacing, in preamble-lengths.
pub const FRAME_SPACING_PREAMBLE_LENGTHS: u32 = 1024;

/// Number of repeats for a bursted frame.
pub const BURST_REPEAT_COUNT: u32 = 3;

/// Suggested default admission ceiling for human-initiated message types.
pub const DEFAULT_ADMISSION_PER_SECOND: u32 = 5;

//! Error types for the Openepo protocol engine.

use thiserror::Error;

/// Errors raised by the codec (C1) while decoding a frame off either bus.
///
/// Per spec.md §4.1, each of these short-circuits into the governor's
/// hold-off path rather than propagating to the host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The preamble was shorter than the required run of `0` symbols.
    #[error("preamble too short: expected {expected} symbols, got {actual}")]
    PreambleShort {
        /// Symbols required.
        expected: usize,
        /// Symbols observed before the run ended.
        actual: usize,
    },

    /// The symbol following the preamble was not the SOF `1`.
    #[error("bad start-of-frame symbol")]
    BadSof,

    /// The stuffed leading `1` bit before a message byte was missing.
    #[error("missing stuff bit before byte {0}")]
    BadStuffBit(usize),

    /// The frame exceeded the maximum size this implementation accepts.
    #[error("frame too long: {actual} bytes exceeds limit of {limit}")]
    FrameTooLong {
        /// Bytes decoded so far.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Input ended before a complete, well-formed field could be read.
    #[error("truncated: expected at least {expected} more bytes, got {actual}")]
    Truncated {
        /// Minimum bytes required to continue.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// A discriminant was not recognised and the union is not extensible.
    #[error("unknown tag 0x{0:02x} in non-extensible union")]
    UnknownTag(u8),

    /// `version` in the unencrypted header was not `PROTOCOL_VERSION`.
    ///
    /// Per spec.md §3 Invariant 1, this is a discard, not a hard failure;
    /// it is still surfaced as an error here so the caller's governor can
    /// apply its hold-off the same as any other framing error.
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    /// The output buffer supplied to an `encode_into` call was too small.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes needed to encode.
        needed: usize,
        /// Bytes available in the caller's buffer.
        available: usize,
    },
}

/// Errors raised by the protection layer (C2).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtectionError {
    /// The supplied key was not exactly [`PROTECTION_KEY_SIZE`] bytes.
    ///
    /// [`PROTECTION_KEY_SIZE`]: crate::core::PROTECTION_KEY_SIZE
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length.
        expected: usize,
        /// Actual length supplied.
        actual: usize,
    },

    /// The supplied nonce did not match the width required by the algorithm.
    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected length.
        expected: usize,
        /// Actual length supplied.
        actual: usize,
    },

    /// AEAD sealing failed. This should only happen on programmer error.
    #[error("AEAD seal failed")]
    SealFailed,

    /// AEAD opening failed: the authentication tag did not verify, or the
    /// key/nonce/associated-data did not match what was sealed with.
    #[error("AEAD authentication failed")]
    AuthFailure,
}

/// Errors raised by the session store (C3).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The store is at capacity and cannot accept another record.
    #[error("session store at capacity ({0})")]
    CapacityExhausted(usize),

    /// A record with this session id already exists.
    #[error("duplicate session id")]
    DuplicateSessionId,

    /// No record exists for the given session id.
    #[error("unknown session id")]
    UnknownSessionId,

    /// A sequence number at or below `last_accepted_seq_no` was presented.
    #[error("replay: sequence {seq} <= last accepted {last_accepted}")]
    Replay {
        /// The rejected sequence number.
        seq: u32,
        /// The session's current high-water mark.
        last_accepted: u32,
    },
}

/// Errors raised by the transmitter state machine (C4).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransmitterError {
    /// `act()` was called while unpaired or mid-rebind; per §4.4 this is a
    /// silent no-op at the public API, so this variant is only used
    /// internally for tests and diagnostics.
    #[error("not paired")]
    NotPaired,

    /// The received HELLO offered no protection algorithm this transmitter
    /// supports.
    #[error("no common protection algorithm in HELLO")]
    NoCommonAlgorithm,

    /// The received HELLO's interfaces did not intersect this transmitter's
    /// capabilities; per §9's Open Question resolution, the HELLO is
    /// ignored and the PAIRING timer is left to expire.
    #[error("no common interface in HELLO")]
    NoCommonInterface,

    /// Codec failure while framing an outbound or inbound private message.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Protection failure while sealing or opening a frame.
    #[error(transparent)]
    Protection(#[from] ProtectionError),
}

/// Errors raised by the receiver state machine (C5).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReceiverError {
    /// The message is not legal in the receiver's current state and was
    /// discarded (spec.md §7, `StateRejection`).
    #[error("message illegal in current state")]
    StateRejection,

    /// Codec failure while framing an outbound or inbound message.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Protection failure while sealing or opening a frame.
    #[error(transparent)]
    Protection(#[from] ProtectionError),

    /// Session store failure.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Top-level error type unifying every layer, for callers that want a single
/// `Result` type across the crate (diagnostics, integration tests).
#[derive(Debug, Error)]
pub enum OpenepoError {
    /// Codec error.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Protection error.
    #[error(transparent)]
    Protection(#[from] ProtectionError),

    /// Session store error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Transmitter error.
    #[error(transparent)]
    Transmitter(#[from] TransmitterError),

    /// Receiver error.
    #[error(transparent)]
    Receiver(#[from] ReceiverError),
}

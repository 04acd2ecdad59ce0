//! # Openepo
//!
//! Openepo is an open rolling-code remote-control protocol for short-range
//! radio links (locks, garage doors, blinds). A transmitter and a receiver
//! exchange OOK-PWM framed messages over an untrusted public radio bus; keys
//! are bootstrapped once over a trusted, line-of-sight private bus (e.g.
//! infrared or a physical button) so that everyday operation needs no
//! further trust decisions.
//!
//! This crate is sans-IO: it owns no radio, timer, or RNG hardware. Callers
//! provide [`core::Bus`], [`core::Scheduler`], and [`core::RandomSource`]
//! implementations and drive the engine from a single execution context, so
//! it runs unmodified on an 8-bit MCU or inside a desktop test harness.
//!
//! ## Feature flags
//!
//! - `codec` (default): frame and message (de)serialization.
//! - `protection` (default): AEAD sealing/opening (AES-128-OCB3).
//! - `session` (default): the receiver's session store and replay defense.
//! - `governor` (default): hold-off, burst spacing, and admission limiting.
//! - `transmitter` (default): the transmitter state machine.
//! - `receiver` (default): the receiver state machine.
//! - `full`: all of the above.
//!
//! ## Modules
//!
//! - [`core`]: collaborator traits, wire constants, and error types (always
//!   included).
//! - [`codec`]: bitstream framing and message encode/decode.
//! - [`protection`]: AEAD algorithms and the protected-frame envelope.
//! - [`session`]: the receiver's per-session replay state.
//! - [`governor`]: transmission pacing and admission control.
//! - [`transmitter`]: the transmitter state machine.
//! - [`receiver`]: the receiver state machine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included).
pub mod core;

#[cfg(feature = "codec")]
#[cfg_attr(docsrs, doc(cfg(feature = "codec")))]
pub mod codec;

#[cfg(feature = "protection")]
#[cfg_attr(docsrs, doc(cfg(feature = "protection")))]
pub mod protection;

#[cfg(feature = "session")]
#[cfg_attr(docsrs, doc(cfg(feature = "session")))]
pub mod session;

#[cfg(feature = "governor")]
#[cfg_attr(docsrs, doc(cfg(feature = "governor")))]
pub mod governor;

#[cfg(feature = "transmitter")]
#[cfg_attr(docsrs, doc(cfg(feature = "transmitter")))]
pub mod transmitter;

#[cfg(feature = "receiver")]
#[cfg_attr(docsrs, doc(cfg(feature = "receiver")))]
pub mod receiver;

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::core::*;

    #[cfg(feature = "codec")]
    pub use crate::codec::*;

    #[cfg(feature = "protection")]
    pub use crate::protection::*;

    #[cfg(feature = "session")]
    pub use crate::session::*;

    #[cfg(feature = "governor")]
    pub use crate::governor::*;

    #[cfg(feature = "transmitter")]
    pub use crate::transmitter::*;

    #[cfg(feature = "receiver")]
    pub use crate::receiver::*;
}

pub use core::OpenepoError;

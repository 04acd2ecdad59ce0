//! Transmission pacing and admission control (C6).
//!
//! Nothing here touches a wall clock directly — per spec.md §5 the core's
//! only notion of time is the [`crate::core::Scheduler`] firing callbacks,
//! so every duration below is expressed in preamble-lengths and converted
//! to milliseconds by the caller, and [`admission::AdmissionLimiter`] takes
//! its "now" as an explicit millisecond counter the FSM advances itself.

pub mod admission;
pub mod burst;
pub mod holdoff;

pub use admission::AdmissionLimiter;
pub use burst::BurstPlan;
pub use holdoff::Holdoff;

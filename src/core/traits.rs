//! Collaborator traits the core is built against.
//!
//! Per spec.md §1/§6, the protocol engine never owns radio/LED drivers, a
//! scheduler, a random source, or the host UI/actuator — it consumes small
//! abstract interfaces for each and is driven entirely by callbacks on a
//! single execution context (spec.md §5). None of these traits require
//! `Send`/`Sync`: a core instance is confined to one context.

/// A cancellation capability returned by [`Bus::subscribe`] and by
/// [`Scheduler::set_timeout`]/[`Scheduler::set_interval`].
///
/// Calling it is idempotent and safe after the subscription/timer has
/// already ended, per spec.md §5.
pub type Cancel = Box<dyn FnMut()>;

/// One of the two abstract media the engine speaks over: the untrusted
/// public radio bus, or the trusted line-of-sight private bus.
///
/// A typed pub/sub channel carrying whole frames. Delivery is synchronous:
/// a subscribed handler observes every frame sent from the moment it
/// subscribes (spec.md §6).
pub trait Bus {
    /// Broadcast a whole frame to every current subscriber.
    fn send(&mut self, frame: &[u8]);

    /// Register a handler invoked with each frame sent from now on.
    ///
    /// Returns a capability that unsubscribes the handler when called.
    fn subscribe(&mut self, handler: Box<dyn FnMut(&[u8])>) -> Cancel;
}

/// One-shot and periodic deferred callbacks, the engine's only source of
/// suspension (spec.md §5).
pub trait Scheduler {
    /// Invoke `cb` once, approximately `delay_ms` from now.
    fn set_timeout(&mut self, delay_ms: u64, cb: Box<dyn FnOnce()>) -> Cancel;

    /// Invoke `cb` every `period_ms`, starting approximately `period_ms`
    /// from now.
    fn set_interval(&mut self, period_ms: u64, cb: Box<dyn FnMut()>) -> Cancel;
}

/// A source of unbiased random bytes for keys, session ids, and nonces.
///
/// Implementations MUST be cryptographically suitable (spec.md §6); the
/// trait itself carries no such guarantee, so callers should not construct
/// one over a non-secure PRNG outside of tests.
pub trait RandomSource {
    /// Fill `out` with unbiased random bytes.
    fn fill(&mut self, out: &mut [u8]);
}

/// Lifecycle states a [`crate::transmitter::TransmitterFsm`] reports to its
/// host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransmitterState {
    /// Unpaired or paired-but-idle; no pairing activity in progress.
    Idle,
    /// Actively waiting for HELLO / BOUND to complete a pairing handshake.
    Pairing,
}

/// Lifecycle states a [`crate::receiver::ReceiverFsm`] reports to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverState {
    /// Power-on grace period (spec.md §4.5), before the device has decided
    /// whether it has any paired sessions.
    Starting,
    /// Commissioned and waiting for authenticated traffic.
    Idle,
    /// Accepting CONFIGURE-class commands; also the state pairing and
    /// unpairing are entered from.
    Configuring,
    /// Broadcasting HELLO and waiting for a matching BIND.
    Pairing,
    /// Waiting for an UNBIND to remove a session.
    Unpairing,
}

/// The one registered interface descriptor type, plus an escape hatch for
/// private-use/future values (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    /// `BUTTON_ACT = 1`: a momentary button actuation.
    ButtonAct,
    /// An interface type this implementation does not interpret.
    Private(u8),
}

impl InterfaceType {
    /// The wire code for this interface type.
    pub fn code(self) -> u8 {
        match self {
            InterfaceType::ButtonAct => crate::core::INTERFACE_BUTTON_ACT,
            InterfaceType::Private(code) => code,
        }
    }

    /// Decode a wire code into an [`InterfaceType`].
    pub fn from_code(code: u8) -> Self {
        if code == crate::core::INTERFACE_BUTTON_ACT {
            InterfaceType::ButtonAct
        } else {
            InterfaceType::Private(code)
        }
    }
}

/// Type-specific parameters carried alongside an [`InterfaceType`] in an
/// ACT body. `BUTTON_ACT` has no parameters; other interface types carry
/// opaque bytes this implementation does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceParameters {
    /// No parameters (the `BUTTON_ACT` case).
    None,
    /// Opaque parameter bytes for an interface type this implementation
    /// does not natively understand.
    Opaque(Vec<u8>),
}

/// A single actuation request delivered to the receiver's host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Which interface is being actuated.
    pub interface: InterfaceType,
    /// Interface-specific parameters.
    pub parameters: InterfaceParameters,
}

/// Callbacks the transmitter's host (UI, GPIO) receives.
pub trait TransmitterHost {
    /// The transmitter's FSM state changed.
    fn state_changed(&mut self, state: TransmitterState);

    /// Pairing was established (`true`) or torn down (`false`).
    fn pairing_changed(&mut self, paired: bool);
}

/// Callbacks the receiver's host (UI, GPIO, actuator) receives.
pub trait ReceiverHost {
    /// The receiver's FSM state changed.
    fn state_changed(&mut self, state: ReceiverState);

    /// An authenticated, non-replayed ACT was received.
    fn act(&mut self, action: Action);

    /// Optional "attempted reception" indicator: an ACT-shaped frame failed
    /// authentication (spec.md §7). Framing errors never trigger this.
    ///
    /// Default is a no-op; hosts that want the indicator override it.
    fn attempted_reception(&mut self) {}
}

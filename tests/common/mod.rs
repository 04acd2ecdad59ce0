//! Shared fakes for the integration scenarios (spec.md §8): an in-memory
//! [`Bus`], a scheduler whose timers fire only when the test asks them to,
//! and deterministic random sources so the literal values from §8 land on
//! the wire exactly as written.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use openepo::prelude::*;

#[derive(Default)]
struct HubInner {
    queue: VecDeque<(bool, Vec<u8>)>,
    public_subs: Vec<Box<dyn FnMut(&[u8])>>,
    private_subs: Vec<Box<dyn FnMut(&[u8])>>,
    public_sent: Vec<Vec<u8>>,
    private_sent: Vec<Vec<u8>>,
}

/// A simulated two-wire network joining one transmitter and one receiver: a
/// public (radio) bus and a private (line-of-sight) bus.
///
/// Deliveries are queued rather than dispatched inline from [`Bus::send`]:
/// a HELLO sent while a receiver method is still on the stack can, two hops
/// later (HELLO -> BIND -> BOUND), loop back into that same receiver's
/// `RefCell`. Dispatching synchronously from inside `send` would try to
/// borrow it a second time and panic. [`Network::pump`] drains the queue
/// only when called from outside any FSM borrow — after a test action
/// returns — so every delivery happens with a clean call stack.
#[derive(Clone, Default)]
pub struct Network(Rc<RefCell<HubInner>>);

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to the public bus, for injecting it into an FSM or sending
    /// test traffic directly.
    pub fn public(&self) -> RecordingBus {
        RecordingBus {
            hub: self.0.clone(),
            is_public: true,
        }
    }

    /// A handle to the private bus.
    pub fn private(&self) -> RecordingBus {
        RecordingBus {
            hub: self.0.clone(),
            is_public: false,
        }
    }

    /// Deliver every currently queued frame to its bus's subscribers,
    /// including any further frames those subscribers send in turn, until
    /// none remain. Call this after any FSM method that might have put
    /// traffic on a bus.
    pub fn pump(&self) {
        loop {
            let next = self.0.borrow_mut().queue.pop_front();
            let Some((is_public, frame)) = next else {
                break;
            };
            let mut subs = std::mem::take(if is_public {
                &mut self.0.borrow_mut().public_subs
            } else {
                &mut self.0.borrow_mut().private_subs
            });
            for sub in subs.iter_mut() {
                sub(&frame);
            }
            if is_public {
                self.0.borrow_mut().public_subs = subs;
            } else {
                self.0.borrow_mut().private_subs = subs;
            }
        }
    }
}

/// One side of a [`Network`]. `Clone` shares the same underlying hub, so a
/// test can hold a handle to inject or inspect traffic while another is
/// moved into an FSM's constructor.
#[derive(Clone)]
pub struct RecordingBus {
    hub: Rc<RefCell<HubInner>>,
    is_public: bool,
}

impl RecordingBus {
    pub fn sent(&self) -> Vec<Vec<u8>> {
        let hub = self.hub.borrow();
        if self.is_public {
            hub.public_sent.clone()
        } else {
            hub.private_sent.clone()
        }
    }
}

impl Bus for RecordingBus {
    fn send(&mut self, frame: &[u8]) {
        let mut hub = self.hub.borrow_mut();
        if self.is_public {
            hub.public_sent.push(frame.to_vec());
        } else {
            hub.private_sent.push(frame.to_vec());
        }
        hub.queue.push_back((self.is_public, frame.to_vec()));
    }

    fn subscribe(&mut self, handler: Box<dyn FnMut(&[u8])>) -> Cancel {
        let mut hub = self.hub.borrow_mut();
        if self.is_public {
            hub.public_subs.push(handler);
        } else {
            hub.private_subs.push(handler);
        }
        Box::new(|| {})
    }
}

/// A scheduler that only fires when [`Self::fire_timeout_at`]/
/// [`Self::fire_interval`] is called — there is no wall clock in this crate
/// (spec.md §5), so tests drive timers explicitly instead of sleeping.
#[derive(Default)]
pub struct ManualScheduler {
    timeouts: Rc<RefCell<Vec<(u64, Option<Box<dyn FnOnce()>>)>>>,
    intervals: Rc<RefCell<Vec<Box<dyn FnMut()>>>>,
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&mut self, delay_ms: u64, cb: Box<dyn FnOnce()>) -> Cancel {
        self.timeouts.borrow_mut().push((delay_ms, Some(cb)));
        Box::new(|| {})
    }

    fn set_interval(&mut self, _period_ms: u64, cb: Box<dyn FnMut()>) -> Cancel {
        self.intervals.borrow_mut().push(cb);
        Box::new(|| {})
    }
}

/// Lets a test hold onto the same scheduler it handed to an FSM's
/// constructor — `ManualScheduler`'s state lives behind `Rc<RefCell<_>>`
/// fields already, so a shared handle only needs read access to reach them.
impl Scheduler for Rc<ManualScheduler> {
    fn set_timeout(&mut self, delay_ms: u64, cb: Box<dyn FnOnce()>) -> Cancel {
        self.timeouts.borrow_mut().push((delay_ms, Some(cb)));
        Box::new(|| {})
    }

    fn set_interval(&mut self, _period_ms: u64, cb: Box<dyn FnMut()>) -> Cancel {
        self.intervals.borrow_mut().push(cb);
        Box::new(|| {})
    }
}

impl ManualScheduler {
    /// Fire the first still-armed timeout scheduled for exactly `delay_ms`.
    pub fn fire_timeout_at(&self, delay_ms: u64) {
        let mut timeouts = self.timeouts.borrow_mut();
        if let Some((_, slot)) = timeouts.iter_mut().find(|(d, cb)| *d == delay_ms && cb.is_some())
        {
            let cb = slot.take().unwrap();
            drop(timeouts);
            cb();
        }
    }

    /// Fire the most recently registered interval once.
    pub fn fire_interval(&self) {
        if let Some(cb) = self.intervals.borrow_mut().last_mut() {
            cb();
        }
    }
}

/// Replays a fixed byte sequence, wrapping around — enough to script exact
/// session ids/keys/transmitter ids from spec.md §8's literal scenarios.
pub struct ScriptedRandom(pub VecDeque<u8>);

impl ScriptedRandom {
    pub fn new(bytes: &[u8]) -> Self {
        Self(bytes.iter().copied().collect())
    }
}

impl RandomSource for ScriptedRandom {
    fn fill(&mut self, out: &mut [u8]) {
        for b in out.iter_mut() {
            *b = self.0.pop_front().unwrap_or(0);
        }
    }
}

#[derive(Default)]
pub struct RecordingTransmitterHost {
    pub states: Vec<TransmitterState>,
    pub pairing_changes: Vec<bool>,
}

impl TransmitterHost for RecordingTransmitterHost {
    fn state_changed(&mut self, state: TransmitterState) {
        self.states.push(state);
    }
    fn pairing_changed(&mut self, paired: bool) {
        self.pairing_changes.push(paired);
    }
}

#[derive(Default)]
pub struct RecordingReceiverHost {
    pub states: Vec<ReceiverState>,
    pub actions: Vec<Action>,
    pub attempted_receptions: u32,
}

impl ReceiverHost for RecordingReceiverHost {
    fn state_changed(&mut self, state: ReceiverState) {
        self.states.push(state);
    }
    fn act(&mut self, action: Action) {
        self.actions.push(action);
    }
    fn attempted_reception(&mut self) {
        self.attempted_receptions += 1;
    }
}

/// Forwards to a shared [`RecordingTransmitterHost`] so the test keeps its
/// own handle after the host is boxed into the FSM.
pub struct TransmitterHostProxy(pub Rc<RefCell<RecordingTransmitterHost>>);
impl TransmitterHost for TransmitterHostProxy {
    fn state_changed(&mut self, state: TransmitterState) {
        self.0.borrow_mut().state_changed(state);
    }
    fn pairing_changed(&mut self, paired: bool) {
        self.0.borrow_mut().pairing_changed(paired);
    }
}

/// Forwards to a shared [`RecordingReceiverHost`].
pub struct ReceiverHostProxy(pub Rc<RefCell<RecordingReceiverHost>>);
impl ReceiverHost for ReceiverHostProxy {
    fn state_changed(&mut self, state: ReceiverState) {
        self.0.borrow_mut().state_changed(state);
    }
    fn act(&mut self, action: Action) {
        self.0.borrow_mut().act(action);
    }
    fn attempted_reception(&mut self) {
        self.0.borrow_mut().attempted_reception();
    }
}

//! The receiver state machine (C5, spec.md §4.5).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::codec::{
    decode_symbols, encode_symbols, ActBody, BindBody, EncryptedHeader, Frame, HelloBody,
    ProtectionHeader, UnencryptedHeader,
};
use crate::core::{
    Action, Bus, Cancel, InterfaceParameters, InterfaceType, RandomSource, ReceiverHost,
    ReceiverState, Scheduler, MAX_FRAME_SIZE, MSG_TYPE_ACT, MSG_TYPE_BIND, MSG_TYPE_BOUND,
    MSG_TYPE_CONFIGURE, MSG_TYPE_HELLO, MSG_TYPE_UNBIND, PROTECTION_AES128_OCB_TAG64,
    PROTOCOL_VERSION,
};
use crate::governor::{AdmissionLimiter, Holdoff};
#[cfg(test)]
use crate::protection::counter_nonce;
use crate::protection::{self, counter_nonce_for_receiver, ProtectionAlgorithm, SessionKey};
use crate::session::{SessionRecord, SessionStore};

use super::config::ReceiverConfig;
use super::persistence::{PersistedSession, ReceiverPersistence};

/// State held only while `PAIRING`: the candidate identity a matching `BIND`
/// must confirm.
struct PendingPairing {
    session_id: u32,
    session_key: SessionKey,
    candidate_algorithms: Vec<u8>,
}

/// Drives `STARTING`/`IDLE`/`CONFIGURING`/`PAIRING`/`UNPAIRING`, owns the
/// [`SessionStore`], and is the only component that ever sends `HELLO`/
/// `BOUND` (spec.md §4.5).
///
/// Returned wrapped in `Rc<RefCell<_>>` by [`Self::new`] for the same reason
/// as [`crate::transmitter::TransmitterFsm`]: the periodic `HELLO`
/// broadcast and every state timeout fire from outside the call that armed
/// them, and a [`Weak`] back-reference is how they re-enter the FSM without
/// `unsafe`.
pub struct ReceiverFsm {
    self_weak: Weak<RefCell<ReceiverFsm>>,
    config: ReceiverConfig,
    public_bus: Box<dyn Bus>,
    public_bus_cancel: Option<Cancel>,
    private_bus: Box<dyn Bus>,
    scheduler: Box<dyn Scheduler>,
    random: Box<dyn RandomSource>,
    host: Box<dyn ReceiverHost>,
    persistence: Box<dyn ReceiverPersistence>,
    session_store: SessionStore,
    holdoff: Holdoff,
    admission: AdmissionLimiter,
    clock_ms: u64,
    state: ReceiverState,
    state_timer: Option<Cancel>,
    hello_interval: Option<Cancel>,
    pending: Option<PendingPairing>,
    closed: bool,
}

impl ReceiverFsm {
    /// Build a receiver, restoring any persisted sessions and entering
    /// `STARTING`, and subscribing to `public_bus` for `BIND`/`UNBIND`/
    /// `CONFIGURE`/`ACT`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ReceiverConfig,
        mut public_bus: Box<dyn Bus>,
        private_bus: Box<dyn Bus>,
        scheduler: Box<dyn Scheduler>,
        random: Box<dyn RandomSource>,
        host: Box<dyn ReceiverHost>,
        persistence: Box<dyn ReceiverPersistence>,
    ) -> Rc<RefCell<Self>> {
        let mut session_store = SessionStore::new(config.session_capacity);
        for saved in persistence.load_all() {
            let _ = session_store.insert_unique(SessionRecord::new(
                saved.session_id,
                saved.algorithm,
                saved.key,
                saved.last_accepted_seq_no,
            ));
        }
        let admission = AdmissionLimiter::default_for_human_initiated();

        let fsm = Rc::new(RefCell::new(Self {
            self_weak: Weak::new(),
            config,
            public_bus: Box::new(NullBus),
            public_bus_cancel: None,
            private_bus,
            scheduler,
            random,
            host,
            persistence,
            session_store,
            holdoff: Holdoff::new(),
            admission,
            clock_ms: 0,
            state: ReceiverState::Starting,
            state_timer: None,
            hello_interval: None,
            pending: None,
            closed: false,
        }));
        fsm.borrow_mut().self_weak = Rc::downgrade(&fsm);

        let weak = Rc::downgrade(&fsm);
        let cancel = public_bus.subscribe(Box::new(move |frame| {
            if let Some(fsm) = weak.upgrade() {
                fsm.borrow_mut().on_public_frame(frame);
            }
        }));
        {
            let mut inner = fsm.borrow_mut();
            inner.public_bus = public_bus;
            inner.public_bus_cancel = Some(cancel);
        }
        fsm.borrow_mut().enter_starting();
        fsm
    }

    /// The receiver's current lifecycle state.
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Number of currently paired sessions.
    pub fn session_count(&self) -> usize {
        self.session_store.size()
    }

    /// Advance the governor's notion of "now" (spec.md §4.6's admission
    /// limiter needs a millisecond clock; the core itself has none per
    /// spec.md §5, so the host feeds elapsed time in as it runs its loop).
    pub fn note_elapsed(&mut self, delta_ms: u64) {
        self.clock_ms = self.clock_ms.saturating_add(delta_ms);
    }

    fn cancel_state_timer(&mut self) {
        if let Some(mut cancel) = self.state_timer.take() {
            cancel();
        }
    }

    fn cancel_hello_interval(&mut self) {
        if let Some(mut cancel) = self.hello_interval.take() {
            cancel();
        }
    }

    fn enter_starting(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_state_timer();
        self.cancel_hello_interval();
        self.state = ReceiverState::Starting;
        self.host.state_changed(ReceiverState::Starting);
        let weak = self.self_weak.clone();
        let cancel = self.scheduler.set_timeout(
            self.config.starting_min_ms,
            Box::new(move || {
                if let Some(fsm) = weak.upgrade() {
                    fsm.borrow_mut().starting_elapsed();
                }
            }),
        );
        self.state_timer = Some(cancel);
    }

    /// The `STARTING` grace period elapsed; decide `IDLE` vs `CONFIGURING`
    /// depending on whether any sessions survived the restart.
    pub fn starting_elapsed(&mut self) {
        if self.closed || self.state != ReceiverState::Starting {
            return;
        }
        self.enter_idle_or_configuring();
    }

    fn enter_idle_or_configuring(&mut self) {
        if self.session_store.size() > 0 {
            self.go_idle();
        } else {
            self.enter_configuring(self.config.configuring_after_bind_ms);
        }
    }

    fn go_idle(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_state_timer();
        self.state = ReceiverState::Idle;
        self.host.state_changed(ReceiverState::Idle);
    }

    fn enter_configuring(&mut self, window_ms: u64) {
        if self.closed {
            return;
        }
        self.cancel_state_timer();
        self.state = ReceiverState::Configuring;
        self.host.state_changed(ReceiverState::Configuring);
        let weak = self.self_weak.clone();
        let cancel = self.scheduler.set_timeout(
            window_ms,
            Box::new(move || {
                if let Some(fsm) = weak.upgrade() {
                    fsm.borrow_mut().configuring_timed_out(window_ms);
                }
            }),
        );
        self.state_timer = Some(cancel);
    }

    /// A `CONFIGURING` window expired with nothing re-arming it. Goes
    /// `IDLE` if any session survives, otherwise re-arms the same window
    /// (an uncommissioned receiver has nowhere else to go).
    pub fn configuring_timed_out(&mut self, window_ms: u64) {
        if self.closed || self.state != ReceiverState::Configuring {
            return;
        }
        if self.session_store.size() > 0 {
            self.go_idle();
        } else {
            self.enter_configuring(window_ms);
        }
    }

    /// Enter `PAIRING`, mint a candidate `session_id`/key, and begin the
    /// periodic `HELLO` broadcast. Only honored from `CONFIGURING`
    /// (spec.md §4.5).
    pub fn set_pairing(&mut self) {
        if self.closed || self.state != ReceiverState::Configuring {
            return;
        }
        let session_id = self.session_store.fresh_session_id(self.random.as_mut());
        let mut session_key = [0u8; 16];
        self.random.fill(&mut session_key);
        self.pending = Some(PendingPairing {
            session_id,
            session_key: SessionKey::from_bytes(session_key),
            candidate_algorithms: self.config.protection_algorithms.clone(),
        });

        self.cancel_state_timer();
        self.state = ReceiverState::Pairing;
        self.host.state_changed(ReceiverState::Pairing);

        let weak = self.self_weak.clone();
        let cancel = self.scheduler.set_timeout(
            self.config.pairing_timeout_ms,
            Box::new(move || {
                if let Some(fsm) = weak.upgrade() {
                    fsm.borrow_mut().pairing_timed_out();
                }
            }),
        );
        self.state_timer = Some(cancel);

        let weak = self.self_weak.clone();
        let hello_cancel = self.scheduler.set_interval(
            self.config.hello_interval_ms,
            Box::new(move || {
                if let Some(fsm) = weak.upgrade() {
                    fsm.borrow_mut().send_hello();
                }
            }),
        );
        self.hello_interval = Some(hello_cancel);
    }

    /// `PAIRING`'s 10 s window elapsed with no matching `BIND`.
    pub fn pairing_timed_out(&mut self) {
        if self.closed || self.state != ReceiverState::Pairing {
            return;
        }
        self.cancel_hello_interval();
        self.pending = None;
        self.enter_configuring(self.config.configuring_after_bind_ms);
    }

    fn send_hello(&mut self) {
        if self.closed || self.state != ReceiverState::Pairing {
            return;
        }
        let Some(pending) = &self.pending else {
            return;
        };
        let algorithm_id = pending
            .candidate_algorithms
            .first()
            .copied()
            .unwrap_or(PROTECTION_AES128_OCB_TAG64);
        let nonce_len = ProtectionHeader::nonce_len_for_algorithm(algorithm_id).unwrap_or(4);
        let header = UnencryptedHeader {
            version: PROTOCOL_VERSION,
            msg_type: MSG_TYPE_HELLO,
            session_id: pending.session_id,
            protection: ProtectionHeader {
                algorithm: algorithm_id,
                nonce: vec![0; nonce_len],
            },
        };
        let body = HelloBody {
            protection_algorithms: pending.candidate_algorithms.clone(),
            interfaces: self.config.interfaces.clone(),
            session_key: *pending.session_key.as_bytes(),
        };
        let frame = Frame::new(header, body.encode(), None);
        self.private_bus.send(&encode_symbols(&frame.encode()));
    }

    /// Enter `UNPAIRING`; only honored from `CONFIGURING` (spec.md §4.5).
    pub fn set_unpairing(&mut self) {
        if self.closed || self.state != ReceiverState::Configuring {
            return;
        }
        self.cancel_state_timer();
        self.state = ReceiverState::Unpairing;
        self.host.state_changed(ReceiverState::Unpairing);
        let weak = self.self_weak.clone();
        let cancel = self.scheduler.set_timeout(
            self.config.unpairing_timeout_ms(),
            Box::new(move || {
                if let Some(fsm) = weak.upgrade() {
                    fsm.borrow_mut().unpairing_timed_out();
                }
            }),
        );
        self.state_timer = Some(cancel);
    }

    /// `UNPAIRING`'s window elapsed with no `UNBIND` received.
    pub fn unpairing_timed_out(&mut self) {
        if self.closed || self.state != ReceiverState::Unpairing {
            return;
        }
        self.enter_idle_or_configuring();
    }

    /// Clear every session and timer, and restart from `STARTING` (spec.md
    /// §4.5).
    pub fn factory_reset(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_hello_interval();
        self.pending = None;
        self.session_store.clear();
        self.persistence.clear();
        self.enter_starting();
    }

    fn arm_holdoff(&mut self) {
        self.holdoff.trigger();
        let weak = self.self_weak.clone();
        let duration_ms = Holdoff::duration_ms(self.config.preamble_length_ms);
        self.scheduler.set_timeout(
            duration_ms,
            Box::new(move || {
                if let Some(fsm) = weak.upgrade() {
                    fsm.borrow_mut().holdoff.release();
                }
            }),
        );
    }

    /// A frame arrived on the public (radio) bus.
    fn on_public_frame(&mut self, framed: &[u8]) {
        if self.closed || self.holdoff.is_blocked() {
            return;
        }
        let frame_bytes = match decode_symbols(framed, MAX_FRAME_SIZE) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(?err, "discarding unparseable public-bus frame");
                self.arm_holdoff();
                return;
            }
        };
        let (header, consumed) = match Frame::decode_header(&frame_bytes) {
            Ok(v) => v,
            Err(err) => {
                debug!(?err, "discarding unparseable public-bus frame");
                self.arm_holdoff();
                return;
            }
        };
        let body = &frame_bytes[consumed..];
        match (header.msg_type, self.state) {
            (MSG_TYPE_BIND, ReceiverState::Pairing) => self.handle_bind(&header, body),
            (MSG_TYPE_UNBIND, ReceiverState::Unpairing) => self.handle_unbind(&header, body),
            (MSG_TYPE_ACT, ReceiverState::Idle | ReceiverState::Configuring) => {
                self.handle_act(&header, body)
            }
            (MSG_TYPE_CONFIGURE, ReceiverState::Idle) => self.handle_configure(&header, body),
            _ => {}
        }
    }

    fn handle_bind(&mut self, header: &UnencryptedHeader, body: &[u8]) {
        let Some(pending) = &self.pending else {
            return;
        };
        if header.session_id != pending.session_id {
            return;
        }
        let algorithm = ProtectionAlgorithm::from_id(header.protection.algorithm);
        if !algorithm.is_supported() || !pending.candidate_algorithms.contains(&algorithm.id()) {
            return;
        }
        if body.is_empty() {
            return;
        }
        let Ok((protection_algorithm_type, unenc_consumed)) = BindBody::decode_unencrypted(&body[..1]) else {
            return;
        };
        if protection_algorithm_type != header.protection.algorithm {
            debug!(
                protection_algorithm_type,
                header_algorithm = header.protection.algorithm,
                "BIND's declared algorithm does not match its header, discarding"
            );
            return;
        }
        let key = pending.session_key.clone();
        let frame = Frame::new(
            header.clone(),
            body[..unenc_consumed].to_vec(),
            Some(body[unenc_consumed..].to_vec()),
        );
        let plaintext = match protection::open_frame(&frame, algorithm, &key) {
            Ok(p) => p,
            Err(_) => {
                warn!("BIND failed authentication during PAIRING");
                self.arm_holdoff();
                return;
            }
        };
        let Ok((enc_header, enc_consumed)) = EncryptedHeader::decode(&plaintext) else {
            return;
        };
        if BindBody::decode_encrypted(algorithm.id(), &plaintext[enc_consumed..]).is_err() {
            return;
        }

        let session_id = pending.session_id;
        let seq = enc_header.sequence_number;
        let record = SessionRecord::new(session_id, algorithm, key.clone(), seq);
        if let Err(err) = self.session_store.insert_unique(record) {
            warn!(?err, session_id, "could not install session from BIND");
            return;
        }
        self.persistence.save(&PersistedSession {
            session_id,
            algorithm,
            key: key.clone(),
            last_accepted_seq_no: seq,
        });
        debug!(session_id, seq, "installed new session");

        let nonce_len = algorithm.nonce_len().expect("adopted algorithm is always supported");
        let nonce = counter_nonce_for_receiver(seq, nonce_len);
        match protection::seal_frame(
            MSG_TYPE_BOUND,
            session_id,
            algorithm,
            &key,
            nonce,
            Vec::new(),
            &EncryptedHeader { sequence_number: seq }.encode(),
        ) {
            Ok(bound_frame) => self.private_bus.send(&encode_symbols(&bound_frame.encode())),
            Err(err) => warn!(?err, "failed to seal BOUND"),
        }

        self.cancel_hello_interval();
        self.pending = None;
        self.enter_configuring(self.config.configuring_after_bind_ms);
    }

    /// Authenticate an encrypted frame against an already-paired session,
    /// enforcing replay defense, and advance that session's high-water
    /// mark on success. Returns the plaintext past the encrypted header.
    fn authenticate_and_advance(
        &mut self,
        header: &UnencryptedHeader,
        body: &[u8],
        is_act: bool,
    ) -> Option<Vec<u8>> {
        let session = self.session_store.find(header.session_id)?;
        let algorithm = session.algorithm;
        if algorithm.id() != header.protection.algorithm {
            return None;
        }
        let key = session.key.clone();
        let frame = Frame::new(header.clone(), Vec::new(), Some(body.to_vec()));
        let plaintext = match protection::open_frame(&frame, algorithm, &key) {
            Ok(p) => p,
            Err(_) => {
                self.arm_holdoff();
                if is_act {
                    self.host.attempted_reception();
                }
                return None;
            }
        };
        let (enc_header, consumed) = EncryptedHeader::decode(&plaintext).ok()?;

        let (accepted, last_accepted_seq_no) = {
            let session = self.session_store.find_mut(header.session_id)?;
            if !session.accepts(enc_header.sequence_number) {
                (false, session.last_accepted_seq_no)
            } else {
                session.mark_accepted(enc_header.sequence_number, &header.protection.nonce);
                (true, session.last_accepted_seq_no)
            }
        };
        if !accepted {
            debug!(
                session_id = header.session_id,
                seq = enc_header.sequence_number,
                last_accepted_seq_no,
                "dropping replayed frame"
            );
            return None;
        }
        self.persistence.save(&PersistedSession {
            session_id: header.session_id,
            algorithm,
            key,
            last_accepted_seq_no,
        });
        Some(plaintext[consumed..].to_vec())
    }

    fn handle_act(&mut self, header: &UnencryptedHeader, body: &[u8]) {
        if !self.admission.try_admit(self.clock_ms) {
            return;
        }
        let Some(plaintext) = self.authenticate_and_advance(header, body, true) else {
            return;
        };
        let Ok((act_body, _)) = ActBody::decode_with_length(&plaintext) else {
            return;
        };
        let parameters = if act_body.parameters().is_empty() {
            InterfaceParameters::None
        } else {
            InterfaceParameters::Opaque(act_body.parameters().to_vec())
        };
        self.host.act(Action {
            interface: InterfaceType::from_code(act_body.interface()),
            parameters,
        });
        self.enter_configuring(self.config.configuring_after_act_ms);
    }

    fn handle_configure(&mut self, header: &UnencryptedHeader, body: &[u8]) {
        if self.authenticate_and_advance(header, body, false).is_none() {
            return;
        }
        self.enter_configuring(self.config.configuring_after_bind_ms);
    }

    fn handle_unbind(&mut self, header: &UnencryptedHeader, body: &[u8]) {
        if self.authenticate_and_advance(header, body, false).is_none() {
            return;
        }
        self.session_store.remove(header.session_id);
        self.persistence.remove(header.session_id);
        self.enter_idle_or_configuring();
    }

    /// Cancel pending timers, unsubscribe from the public bus, and stop
    /// reacting to bus deliveries (spec.md §5).
    pub fn close(&mut self) {
        self.cancel_state_timer();
        self.cancel_hello_interval();
        if let Some(mut cancel) = self.public_bus_cancel.take() {
            cancel();
        }
        self.closed = true;
    }
}

/// See [`crate::transmitter::fsm`]'s identically named helper: fills the
/// `public_bus` field for the instant between constructing the
/// `Rc<RefCell<_>>` and moving the real bus in.
struct NullBus;
impl Bus for NullBus {
    fn send(&mut self, _frame: &[u8]) {}
    fn subscribe(&mut self, _handler: Box<dyn FnMut(&[u8])>) -> Cancel {
        Box::new(|| {})
    }
}

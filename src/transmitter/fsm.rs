//! The transmitter state machine (C4, spec.md §4.4).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::codec::{
    decode_symbols, encode_symbols, ActBody, BindBody, EncryptedHeader, Frame, HelloBody,
    UnencryptedHeader,
};
use crate::core::{
    Bus, Cancel, InterfaceParameters, InterfaceType, RandomSource, Scheduler, TransmitterHost,
    TransmitterState, MAX_FRAME_SIZE, MSG_TYPE_ACT, MSG_TYPE_BOUND, MSG_TYPE_CONFIGURE,
    MSG_TYPE_HELLO, MSG_TYPE_UNBIND, TRANSMITTER_ID_SIZE,
};
use crate::governor::BurstPlan;
use crate::protection::{self, counter_nonce, ProtectionAlgorithm, SessionKey};

use super::config::TransmitterConfig;
use super::persistence::{TransmitterKeyMaterial, TransmitterPersistence};

/// Drives `IDLE`/`PAIRING`, the transmitter side of a pairing (spec.md
/// §4.4).
///
/// Returned wrapped in `Rc<RefCell<_>>` by [`Self::new`]: the scheduled
/// pairing timeout and bursted retransmissions, and the private-bus
/// subscription, all need to call back into the FSM from outside the
/// call that armed them, and a [`Weak`] reference to the shared cell is
/// the idiomatic way to do that on a single execution context without
/// `unsafe`. Every collaborator callback upgrades the `Weak` and does
/// nothing if it's gone, which is exactly the "no-op after close"
/// contract spec.md §5 asks for.
pub struct TransmitterFsm {
    self_weak: Weak<RefCell<TransmitterFsm>>,
    config: TransmitterConfig,
    public_bus: Box<dyn Bus>,
    private_bus: Box<dyn Bus>,
    private_bus_cancel: Option<Cancel>,
    scheduler: Box<dyn Scheduler>,
    random: Box<dyn RandomSource>,
    host: Box<dyn TransmitterHost>,
    persistence: Box<dyn TransmitterPersistence>,
    state: TransmitterState,
    transmitter_id: [u8; TRANSMITTER_ID_SIZE],
    key_material: Option<TransmitterKeyMaterial>,
    pairing_timeout: Option<Cancel>,
    burst_timeouts: Vec<Cancel>,
    closed: bool,
}

impl TransmitterFsm {
    /// Build a transmitter, loading any previously persisted key material
    /// and `transmitter_id` (minting a fresh one on first boot), and
    /// subscribing to `private_bus` for `HELLO`/`BOUND`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: TransmitterConfig,
        public_bus: Box<dyn Bus>,
        mut private_bus: Box<dyn Bus>,
        scheduler: Box<dyn Scheduler>,
        mut random: Box<dyn RandomSource>,
        host: Box<dyn TransmitterHost>,
        mut persistence: Box<dyn TransmitterPersistence>,
    ) -> Rc<RefCell<Self>> {
        let key_material = persistence.load();
        let transmitter_id = persistence.load_transmitter_id().unwrap_or_else(|| {
            let mut id = [0u8; TRANSMITTER_ID_SIZE];
            random.fill(&mut id);
            persistence.save_transmitter_id(&id);
            id
        });

        let fsm = Rc::new(RefCell::new(Self {
            self_weak: Weak::new(),
            config,
            public_bus,
            private_bus: Box::new(NullBus),
            private_bus_cancel: None,
            scheduler,
            random,
            host,
            persistence,
            state: TransmitterState::Idle,
            transmitter_id,
            key_material,
            pairing_timeout: None,
            burst_timeouts: Vec::new(),
            closed: false,
        }));
        fsm.borrow_mut().self_weak = Rc::downgrade(&fsm);

        let weak = Rc::downgrade(&fsm);
        let cancel = private_bus.subscribe(Box::new(move |frame| {
            if let Some(fsm) = weak.upgrade() {
                fsm.borrow_mut().on_private_frame(frame);
            }
        }));
        {
            let mut inner = fsm.borrow_mut();
            inner.private_bus = private_bus;
            inner.private_bus_cancel = Some(cancel);
        }
        fsm
    }

    /// The transmitter's current lifecycle state.
    pub fn state(&self) -> TransmitterState {
        self.state
    }

    /// Whether a pairing has been established and not yet torn down by
    /// `unpair()` (spec.md §4.4's "paired and not unbound" guard).
    fn is_bound(&self) -> bool {
        matches!(&self.key_material, Some(m) if !m.unbound)
    }

    /// Enter `PAIRING` from any state, arming the 10 s timeout (spec.md
    /// §4.4). No public traffic is emitted until a HELLO arrives (§8
    /// Invariant 6).
    pub fn set_pairing(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_pairing_timeout();
        self.state = TransmitterState::Pairing;
        self.host.state_changed(TransmitterState::Pairing);

        let weak = self.self_weak.clone();
        let cancel = self.scheduler.set_timeout(
            self.config.pairing_timeout_ms,
            Box::new(move || {
                if let Some(fsm) = weak.upgrade() {
                    fsm.borrow_mut().pairing_timed_out();
                }
            }),
        );
        self.pairing_timeout = Some(cancel);
    }

    fn cancel_pairing_timeout(&mut self) {
        if let Some(mut cancel) = self.pairing_timeout.take() {
            cancel();
        }
    }

    /// Reverts to `IDLE` after [`Self::set_pairing`]'s timeout fires with
    /// no successful `BOUND` (spec.md §4.4). Public for tests that drive a
    /// scripted scheduler directly; real schedulers invoke it through the
    /// closure armed in [`Self::set_pairing`].
    pub fn pairing_timed_out(&mut self) {
        if self.closed || self.state != TransmitterState::Pairing {
            return;
        }
        self.pairing_timeout = None;
        self.state = TransmitterState::Idle;
        self.host.state_changed(TransmitterState::Idle);
    }

    /// A frame arrived on the private (line-of-sight) bus.
    fn on_private_frame(&mut self, framed: &[u8]) {
        if self.closed {
            return;
        }
        let frame_bytes = match decode_symbols(framed, MAX_FRAME_SIZE) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(?err, "discarding unparseable private-bus frame");
                return;
            }
        };
        let Ok((header, consumed)) = Frame::decode_header(&frame_bytes) else {
            return;
        };
        match header.msg_type {
            MSG_TYPE_HELLO if self.state == TransmitterState::Pairing => {
                let Ok((hello, _)) = HelloBody::decode(&frame_bytes[consumed..]) else {
                    return;
                };
                self.handle_hello(header.session_id, &hello);
            }
            MSG_TYPE_BOUND if self.state == TransmitterState::Pairing => {
                self.handle_bound(&header, &frame_bytes[consumed..]);
            }
            _ => {}
        }
    }

    fn handle_hello(&mut self, session_id: u32, hello: &HelloBody) {
        let Some(algorithm) = hello
            .protection_algorithms
            .iter()
            .map(|&id| ProtectionAlgorithm::from_id(id))
            .find(|a| a.is_supported())
        else {
            debug!(session_id, "HELLO offered no supported protection algorithm");
            return;
        };

        let interface_types: Vec<u8> = hello
            .interfaces
            .iter()
            .copied()
            .filter(|i| self.config.capabilities.contains(i))
            .collect();
        if interface_types.is_empty() {
            // Open Question resolution (spec.md §9): ignore and let the
            // PAIRING timer expire rather than sending a useless BIND.
            debug!(session_id, "HELLO shared no common interface, ignoring");
            return;
        }

        let mut material = TransmitterKeyMaterial {
            session_id,
            algorithm,
            key: SessionKey::from_bytes(hello.session_key),
            tx_seq: 0,
            unbound: true,
        };
        material.tx_seq += 1;
        let seq = material.tx_seq;

        let nonce_len = algorithm.nonce_len().expect("is_supported implies known nonce width");
        let nonce = counter_nonce(seq, nonce_len);
        let bind_body = BindBody {
            protection_algorithm_type: algorithm.id(),
            transmitter_id: self.transmitter_id,
            interface_types,
        };
        let mut plaintext = EncryptedHeader { sequence_number: seq }.encode();
        plaintext.extend_from_slice(&bind_body.encode_encrypted());

        let Ok(frame) = protection::seal_frame(
            crate::core::MSG_TYPE_BIND,
            session_id,
            algorithm,
            &material.key,
            nonce,
            bind_body.encode_unencrypted(),
            &plaintext,
        ) else {
            return;
        };

        self.public_bus.send(&encode_symbols(&frame.encode()));
        self.persistence.save(&material);
        self.key_material = Some(material);
        debug!(session_id, "adopted session key from HELLO, sent BIND");
    }

    fn handle_bound(&mut self, header: &UnencryptedHeader, encrypted: &[u8]) {
        let Some(material) = &self.key_material else {
            return;
        };
        if material.session_id != header.session_id {
            return;
        }
        let algorithm = material.algorithm;
        let key = material.key.clone();
        let frame = Frame::new(header.clone(), Vec::new(), Some(encrypted.to_vec()));
        if protection::open_frame(&frame, algorithm, &key).is_err() {
            warn!(session_id = header.session_id, "BOUND failed authentication");
            return;
        }

        if let Some(material) = self.key_material.as_mut() {
            material.unbound = false;
            self.persistence.save(material);
        }
        self.cancel_pairing_timeout();
        self.state = TransmitterState::Idle;
        self.host.pairing_changed(true);
        self.host.state_changed(TransmitterState::Idle);
        debug!(session_id = header.session_id, "pairing confirmed by BOUND");
    }

    /// Request an actuation. Silently does nothing while unpaired or
    /// mid-rebind (spec.md §4.4); emits a bursted `ACT` otherwise.
    pub fn act(&mut self, interface: InterfaceType, parameters: InterfaceParameters) {
        if self.closed || !self.is_bound() {
            return;
        }
        let parameter_bytes = match parameters {
            InterfaceParameters::None => Vec::new(),
            InterfaceParameters::Opaque(bytes) => bytes,
        };
        let body = ActBody::new(interface.code(), parameter_bytes);
        self.send_encrypted_bursted(MSG_TYPE_ACT, &body.encode());
    }

    /// Notify the receiver that this transmitter is no longer claiming its
    /// pairing. The key material is retained: delivery is unconfirmed, and
    /// only `factory_reset()` clears it.
    pub fn unpair(&mut self) {
        if self.closed || self.key_material.is_none() {
            return;
        }
        self.send_encrypted_bursted(MSG_TYPE_UNBIND, &[]);
        if let Some(material) = self.key_material.as_mut() {
            material.unbound = true;
            self.persistence.save(material);
        }
        self.host.pairing_changed(false);
    }

    /// Ask the receiver to re-enter `CONFIGURING` (spec.md §4.4).
    pub fn set_configuring(&mut self) {
        if self.closed || !self.is_bound() {
            return;
        }
        self.send_encrypted_bursted(MSG_TYPE_CONFIGURE, &[]);
    }

    fn send_encrypted_bursted(&mut self, msg_type: u8, body: &[u8]) {
        let Some(material) = self.key_material.as_mut() else {
            return;
        };
        material.tx_seq += 1;
        let seq = material.tx_seq;
        let algorithm = material.algorithm;
        let key = material.key.clone();
        let session_id = material.session_id;
        self.persistence.save(material);

        let nonce_len = algorithm.nonce_len().expect("adopted algorithm is always supported");
        let nonce = counter_nonce(seq, nonce_len);
        let mut plaintext = EncryptedHeader { sequence_number: seq }.encode();
        plaintext.extend_from_slice(body);

        let Ok(frame) =
            protection::seal_frame(msg_type, session_id, algorithm, &key, nonce, Vec::new(), &plaintext)
        else {
            return;
        };
        let bytes = encode_symbols(&frame.encode());
        self.public_bus.send(&bytes);

        // Burst of three per spec.md §4.6; the repeats share the already
        // -incremented sequence number. Timers from a previous bursted
        // send have long since fired by the time another one is armed
        // (inter-burst spacing dwarfs burst duration).
        self.burst_timeouts.clear();
        let plan = BurstPlan::new(self.config.preamble_length_ms);
        for i in 1..plan.repeats {
            let weak = self.self_weak.clone();
            let bytes = bytes.clone();
            let cancel = self.scheduler.set_timeout(
                plan.intra_spacing_ms * i as u64,
                Box::new(move || {
                    if let Some(fsm) = weak.upgrade() {
                        fsm.borrow_mut().public_bus.send(&bytes);
                    }
                }),
            );
            self.burst_timeouts.push(cancel);
        }
    }

    /// Clear all pairing state and mint a fresh `transmitter_id` from the
    /// random source (spec.md §9 Open Question 4).
    pub fn factory_reset(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_pairing_timeout();
        let was_bound = self.is_bound();
        self.key_material = None;
        self.persistence.clear();
        let mut id = [0u8; TRANSMITTER_ID_SIZE];
        self.random.fill(&mut id);
        self.persistence.save_transmitter_id(&id);
        self.transmitter_id = id;
        self.state = TransmitterState::Idle;
        if was_bound {
            self.host.pairing_changed(false);
        }
        self.host.state_changed(TransmitterState::Idle);
    }

    /// Cancel pending timers, unsubscribe from the private bus, and stop
    /// reacting to bus deliveries (spec.md §5).
    pub fn close(&mut self) {
        self.cancel_pairing_timeout();
        for mut cancel in self.burst_timeouts.drain(..) {
            cancel();
        }
        if let Some(mut cancel) = self.private_bus_cancel.take() {
            cancel();
        }
        self.closed = true;
    }
}

/// A [`Bus`] that drops everything; used only to fill the
/// `TransmitterFsm::private_bus` field for the instant between
/// constructing the `Rc<RefCell<_>>` and moving the real bus in once
/// subscription has captured a `Weak` back to it.
struct NullBus;
impl Bus for NullBus {
    fn send(&mut self, _frame: &[u8]) {}
    fn subscribe(&mut self, _handler: Box<dyn FnMut(&[u8])>) -> Cancel {
        Box::new(|| {})
    }
}

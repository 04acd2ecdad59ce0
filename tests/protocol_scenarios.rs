//! End-to-end scenarios from spec.md §8, run against the real
//! `TransmitterFsm`/`ReceiverFsm` pair wired over a shared simulated
//! network.
//!
//! The literal values below (session_id = `0x1122_3344`, session_key =
//! `00112233445566778899AABBCCDDEEFF`, transmitter_id =
//! `A1A2A3A4A5A6A7A8`, ACT at seq 2, UNBIND at seq 3) are spec.md §8's own
//! worked example, reproduced here by scripting the random sources so the
//! FSMs mint exactly those values.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use openepo::prelude::*;

use common::{
    ManualScheduler, Network, ReceiverHostProxy, RecordingBus, RecordingReceiverHost,
    RecordingTransmitterHost, ScriptedRandom, TransmitterHostProxy,
};

const SESSION_KEY: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
];
const TRANSMITTER_ID: [u8; 8] = [0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8];

struct Harness {
    receiver: Rc<RefCell<ReceiverFsm>>,
    receiver_scheduler: Rc<ManualScheduler>,
    receiver_host: Rc<RefCell<RecordingReceiverHost>>,
    transmitter: Rc<RefCell<TransmitterFsm>>,
    transmitter_host: Rc<RefCell<RecordingTransmitterHost>>,
    network: Network,
    public_bus: RecordingBus,
}

fn build_harness() -> Harness {
    let network = Network::new();

    let receiver_host = Rc::new(RefCell::new(RecordingReceiverHost::default()));
    let receiver_scheduler = Rc::new(ManualScheduler::default());

    let session_random = ScriptedRandom::new(
        &[0x11, 0x22, 0x33, 0x44]
            .iter()
            .copied()
            .chain(SESSION_KEY)
            .collect::<Vec<_>>(),
    );

    let receiver = ReceiverFsm::new(
        ReceiverConfig::default(),
        Box::new(network.public()),
        Box::new(network.private()),
        Box::new(Rc::clone(&receiver_scheduler)),
        Box::new(session_random),
        Box::new(ReceiverHostProxy(Rc::clone(&receiver_host))),
        Box::new(InMemoryReceiverPersistence::default()),
    );

    let transmitter_host = Rc::new(RefCell::new(RecordingTransmitterHost::default()));
    let transmitter = TransmitterFsm::new(
        TransmitterConfig::default(),
        Box::new(network.public()),
        Box::new(network.private()),
        Box::new(ManualScheduler::default()),
        Box::new(ScriptedRandom::new(&TRANSMITTER_ID)),
        Box::new(TransmitterHostProxy(Rc::clone(&transmitter_host))),
        Box::new(InMemoryTransmitterPersistence::default()),
    );

    let public_bus = network.public();

    Harness {
        receiver,
        receiver_scheduler,
        receiver_host,
        transmitter,
        transmitter_host,
        network,
        public_bus,
    }
}

/// Drives both FSMs from power-on through a confirmed pairing, leaving the
/// transmitter `Idle`/bound and the receiver `Configuring`.
fn pair(h: &Harness) {
    h.receiver.borrow_mut().starting_elapsed(); // STARTING -> CONFIGURING
    h.network.pump();
    h.receiver.borrow_mut().set_pairing(); // CONFIGURING -> PAIRING
    h.network.pump();
    assert_eq!(h.receiver.borrow().state(), ReceiverState::Pairing);

    h.transmitter.borrow_mut().set_pairing();
    h.network.pump();
    assert_eq!(h.transmitter.borrow().state(), TransmitterState::Pairing);

    // The receiver's periodic HELLO is scripted, not timed; fire it once.
    // Firing it only enqueues the HELLO send — the whole HELLO -> BIND ->
    // BOUND round trip plays out once `pump` drains the queue from outside
    // any FSM borrow.
    h.receiver_scheduler.fire_interval();
    h.network.pump();

    assert_eq!(h.transmitter.borrow().state(), TransmitterState::Idle);
    assert_eq!(h.receiver.borrow().state(), ReceiverState::Configuring);
    assert_eq!(h.receiver.borrow().session_count(), 1);
    assert_eq!(h.transmitter_host.borrow().pairing_changes, vec![true]);

    // The BIND frame's header carries the scripted session id in the
    // clear; checking its hex form against spec.md §8's worked example is
    // more legible than comparing raw byte slices. Decode the symbol
    // stream first since that's what actually went out on the bus.
    let bind_symbols = h.public_bus.sent().first().unwrap().clone();
    let bind_frame = decode_symbols(&bind_symbols, MAX_FRAME_SIZE).unwrap();
    assert!(hex::encode(&bind_frame).contains("11223344"));
}

#[test]
fn happy_path_pairing_then_act_then_unpair() {
    let h = build_harness();
    pair(&h);

    // ACT: the transmitter's tx_seq is 1 after BIND, so the first act()
    // carries seq 2 — spec.md §8's worked example.
    h.transmitter
        .borrow_mut()
        .act(InterfaceType::ButtonAct, InterfaceParameters::None);
    h.network.pump();
    assert_eq!(h.receiver_host.borrow().actions.len(), 1);
    assert_eq!(
        h.receiver_host.borrow().actions[0].interface,
        InterfaceType::ButtonAct
    );

    // UNBIND lands at seq 3 and tears the session down on the receiver.
    h.transmitter.borrow_mut().unpair();
    h.network.pump();
    assert_eq!(h.receiver.borrow().session_count(), 0);
    assert_eq!(
        h.transmitter_host.borrow().pairing_changes,
        vec![true, false]
    );
}

#[test]
fn replayed_act_is_not_delivered_twice() {
    let h = build_harness();
    pair(&h);

    h.transmitter
        .borrow_mut()
        .act(InterfaceType::ButtonAct, InterfaceParameters::None);
    h.network.pump();
    assert_eq!(h.receiver_host.borrow().actions.len(), 1);

    // Resend the exact same bytes the transmitter already put on the bus.
    let last_frame = h.public_bus.sent().last().unwrap().clone();
    let mut bus = h.public_bus.clone();
    bus.send(&last_frame);
    h.network.pump();

    assert_eq!(h.receiver_host.borrow().actions.len(), 1);
}

#[test]
fn bind_outside_pairing_is_discarded() {
    let h = build_harness();
    h.receiver.borrow_mut().starting_elapsed();
    h.network.pump();
    assert_eq!(h.receiver.borrow().state(), ReceiverState::Configuring);

    h.transmitter.borrow_mut().set_pairing();
    h.network.pump();
    h.receiver_scheduler.fire_interval(); // no HELLO was ever sent; no-op.
    h.network.pump();

    // Without a PAIRING receiver, the transmitter's HELLO handler never
    // ran, so no BIND was even produced; confirm no session materialized.
    assert_eq!(h.receiver.borrow().session_count(), 0);
}

#[test]
fn corrupted_act_ciphertext_fails_authentication_and_is_not_delivered() {
    let h = build_harness();
    pair(&h);

    h.transmitter
        .borrow_mut()
        .act(InterfaceType::ButtonAct, InterfaceParameters::None);
    h.network.pump();
    assert_eq!(h.receiver_host.borrow().actions.len(), 1);

    // Corrupt a byte of the decoded frame itself, not the raw symbol stream,
    // so the flip lands in the ciphertext/tag rather than in framing bits.
    let sent = h.public_bus.sent().last().unwrap().clone();
    let mut corrupted = decode_symbols(&sent, MAX_FRAME_SIZE).unwrap();
    *corrupted.last_mut().unwrap() ^= 0xFF;
    let mut bus = h.public_bus.clone();
    bus.send(&encode_symbols(&corrupted));
    h.network.pump();

    assert_eq!(h.receiver_host.borrow().actions.len(), 1);
    assert_eq!(h.receiver_host.borrow().attempted_receptions, 1);
}

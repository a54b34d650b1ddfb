//! End-to-end sequencing through `SequencerService` with recording sinks.

use valve_sequencer::app::commands::AppCommand;
use valve_sequencer::app::events::AppEvent;
use valve_sequencer::app::service::SequencerService;
use valve_sequencer::circuit::CircuitState;
use valve_sequencer::sequencer::SequencerConfig;

use crate::mock_hw::{Call, Recorder, RecordingEvents, Rig};

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_every_output_idle() {
    let rec = Recorder::default();
    let mut svc = SequencerService::new(SequencerConfig {
        max_concurrent_open: 2,
        open_duration_ms: 1000,
    });
    svc.register_circuit("Kitchen", Some(rec.valve(0)), Some(rec.status(0)), Some(rec.motion(0)), false);
    svc.register_circuit("Bath", Some(rec.valve(1)), Some(rec.status(1)), Some(rec.motion(1)), true);

    let mut events = RecordingEvents::default();
    svc.start(&mut events);

    assert_eq!(
        rec.calls(),
        [
            Call::Drive(0, false),
            Call::Status(0, false),
            Call::Motion(0, false),
            Call::Drive(1, true),
            Call::Status(1, false),
            Call::Motion(1, false),
        ]
    );
    assert_eq!(events.0, [AppEvent::Started { circuits: 2 }]);
}

// ── Admission and completion ──────────────────────────────────

#[test]
fn two_circuits_cap_one_open_in_sequence() {
    let mut rig = Rig::new(1, 1000, &[("A", false), ("B", false)]);
    rig.request(0, true);
    rig.request(1, true);

    rig.tick_at(0);
    assert_eq!(rig.state(0), CircuitState::Opening { since: 0 });
    assert_eq!(rig.state(1), CircuitState::Closed);
    assert_eq!(
        rig.rec.calls(),
        [Call::Drive(0, true), Call::Motion(0, true), Call::Aggregate(false)]
    );

    rig.rec.clear();
    rig.tick_at(1000);
    assert!(rig.state(0).is_changing());
    assert_eq!(rig.state(1), CircuitState::Closed);
    assert_eq!(rig.rec.calls(), [Call::Aggregate(false)]);

    rig.rec.clear();
    rig.tick_at(1001);
    assert_eq!(rig.state(0), CircuitState::Open);
    assert_eq!(rig.state(1), CircuitState::Opening { since: 1001 });
    assert_eq!(
        rig.rec.calls(),
        [
            Call::Motion(0, false),
            Call::Status(0, true),
            Call::Drive(1, true),
            Call::Motion(1, true),
            Call::Aggregate(true),
        ]
    );

    rig.tick_at(2002);
    assert_eq!(rig.state(1), CircuitState::Open);
    assert!(rig.svc.any_open());
}

#[test]
fn events_follow_the_sequence() {
    let mut rig = Rig::new(1, 1000, &[("A", false), ("B", false)]);
    let (a, b) = (rig.ids[0], rig.ids[1]);
    rig.request(0, true);
    rig.request(1, true);

    rig.tick_at(0);
    rig.tick_at(1001);
    rig.tick_at(2002);

    assert_eq!(
        rig.events.0,
        [
            AppEvent::Started { circuits: 2 },
            AppEvent::LinkChanged(true),
            AppEvent::OpenStarted(a),
            AppEvent::OpenCompleted(a),
            AppEvent::OpenStarted(b),
            AppEvent::AggregateChanged(true),
            AppEvent::OpenCompleted(b),
        ]
    );
}

#[test]
fn cap_two_opens_pairwise() {
    let mut rig = Rig::new(2, 100, &[("A", false), ("B", false), ("C", false)]);
    for i in 0..3 {
        rig.request(i, true);
    }

    rig.tick_at(0);
    assert!(rig.state(0).is_changing());
    assert!(rig.state(1).is_changing());
    assert_eq!(rig.state(2), CircuitState::Closed);
    assert_eq!(rig.svc.build_telemetry().opening, 2);

    rig.tick_at(101);
    assert_eq!(rig.state(0), CircuitState::Open);
    assert_eq!(rig.state(1), CircuitState::Open);
    assert_eq!(rig.state(2), CircuitState::Opening { since: 101 });
}

// ── Closing ───────────────────────────────────────────────────

#[test]
fn cancel_during_opening_closes_at_once() {
    let mut rig = Rig::new(1, 1000, &[("A", false)]);
    rig.request(0, true);
    rig.tick_at(0);

    rig.request(0, false);
    rig.rec.clear();
    rig.tick_at(500);

    assert_eq!(rig.state(0), CircuitState::Closed);
    assert_eq!(
        rig.rec.calls(),
        [
            Call::Drive(0, false),
            Call::Status(0, false),
            Call::Motion(0, false),
            Call::Aggregate(false),
        ]
    );
    assert_eq!(
        rig.events.0.last(),
        Some(&AppEvent::Closed {
            circuit: rig.ids[0],
            from: CircuitState::Opening { since: 0 },
        })
    );
}

#[test]
fn closing_frees_a_slot_for_the_next_circuit() {
    let mut rig = Rig::new(1, 1000, &[("A", false), ("B", false)]);
    rig.request(0, true);
    rig.request(1, true);
    rig.tick_at(0);

    rig.request(0, false);
    rig.tick_at(10);

    assert_eq!(rig.state(0), CircuitState::Closed);
    assert_eq!(rig.state(1), CircuitState::Opening { since: 10 });
}

#[test]
fn close_all_closes_open_and_opening_circuits() {
    let mut rig = Rig::new(1, 100, &[("A", false), ("B", false)]);
    rig.request(0, true);
    rig.request(1, true);
    rig.tick_at(0);
    rig.tick_at(101);
    assert_eq!(rig.state(0), CircuitState::Open);
    assert!(rig.state(1).is_changing());

    rig.svc.handle_command(AppCommand::CloseAll);
    rig.rec.clear();
    rig.tick_at(150);

    assert_eq!(rig.state(0), CircuitState::Closed);
    assert_eq!(rig.state(1), CircuitState::Closed);
    assert_eq!(rig.rec.last_drive(0), Some(false));
    assert_eq!(rig.rec.last_drive(1), Some(false));
    assert_eq!(rig.rec.last_aggregate(), Some(false));
}

// ── Polarity ──────────────────────────────────────────────────

#[test]
fn inverted_circuit_drives_low_while_energised() {
    let mut rig = Rig::new(1, 100, &[("Inv", true)]);
    rig.request(0, true);

    rig.tick_at(0);
    assert_eq!(rig.rec.last_drive(0), Some(false));

    rig.tick_at(101);
    // Completion does not touch the drive.
    assert_eq!(rig.rec.circuit_calls().iter().filter(|c| matches!(c, Call::Drive(..))).count(), 1);

    rig.request(0, false);
    rig.tick_at(200);
    assert_eq!(rig.rec.last_drive(0), Some(true));
}

// ── Aggregate ─────────────────────────────────────────────────

#[test]
fn aggregate_published_every_tick() {
    let mut rig = Rig::new(1, 100, &[("A", false)]);
    rig.tick_at(0);
    rig.tick_at(1);
    rig.tick_at(2);
    assert_eq!(rig.rec.calls(), [Call::Aggregate(false); 3]);
}

#[test]
fn aggregate_tracks_fully_open_only() {
    let mut rig = Rig::new(1, 100, &[("A", false)]);
    rig.request(0, true);

    rig.tick_at(0);
    assert_eq!(rig.rec.last_aggregate(), Some(false));

    rig.tick_at(101);
    assert_eq!(rig.rec.last_aggregate(), Some(true));

    rig.request(0, false);
    rig.tick_at(102);
    assert_eq!(rig.rec.last_aggregate(), Some(false));
}

// ── Limits ────────────────────────────────────────────────────

#[test]
fn non_positive_cap_never_opens() {
    for cap in [0, -1, i32::MIN] {
        let mut rig = Rig::new(cap, 100, &[("A", false)]);
        rig.request(0, true);
        for now in [0, 1000, 5000] {
            rig.tick_at(now);
        }
        assert_eq!(rig.state(0), CircuitState::Closed);
        assert!(rig.rec.circuit_calls().is_empty());
    }
}

#[test]
fn completion_survives_clock_wraparound() {
    let mut rig = Rig::new(1, 1000, &[("A", false)]);
    rig.request(0, true);

    let start = u32::MAX - 400;
    rig.tick_at(start);
    rig.tick_at(start.wrapping_add(1000));
    assert!(rig.state(0).is_changing());

    rig.tick_at(start.wrapping_add(1001));
    assert_eq!(rig.state(0), CircuitState::Open);
}

#[test]
fn unknown_circuit_command_is_ignored() {
    let mut rig = Rig::new(1, 100, &[("A", false)]);
    let mut other = SequencerService::new(SequencerConfig {
        max_concurrent_open: 1,
        open_duration_ms: 100,
    });
    other.register_circuit("X", None, None, None, false);
    let foreign = other
        .register_circuit("Y", None, None, None, false)
        .expect("registered");

    rig.svc.handle_command(AppCommand::SetCircuit { circuit: foreign, open: true });
    rig.tick_at(0);
    assert_eq!(rig.state(0), CircuitState::Closed);
    assert!(rig.rec.circuit_calls().is_empty());
}

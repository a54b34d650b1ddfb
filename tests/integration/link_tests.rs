//! Command-source reachability: intake is suspended while the link is
//! down, transitions already in flight still complete.

use valve_sequencer::app::commands::AppCommand;
use valve_sequencer::app::events::AppEvent;
use valve_sequencer::circuit::CircuitState;

use crate::mock_hw::{Call, Rig};

#[test]
fn open_request_waits_for_link() {
    let mut rig = Rig::new(1, 100, &[("A", false)]);
    rig.link.set(false);
    rig.request(0, true);

    rig.tick_at(0);
    rig.tick_at(500);
    assert_eq!(rig.state(0), CircuitState::Closed);
    assert_eq!(rig.rec.calls(), [Call::Aggregate(false); 2]);

    rig.link.set(true);
    rig.tick_at(600);
    assert_eq!(rig.state(0), CircuitState::Opening { since: 600 });
}

#[test]
fn opening_completes_while_link_down() {
    let mut rig = Rig::new(1, 100, &[("A", false)]);
    rig.request(0, true);
    rig.tick_at(0);

    rig.link.set(false);
    rig.tick_at(101);
    assert_eq!(rig.state(0), CircuitState::Open);
    assert_eq!(rig.rec.last_aggregate(), Some(true));
}

#[test]
fn withdrawal_is_held_until_link_returns() {
    let mut rig = Rig::new(1, 100, &[("A", false)]);
    rig.request(0, true);
    rig.tick_at(0);
    rig.tick_at(101);
    assert_eq!(rig.state(0), CircuitState::Open);

    rig.link.set(false);
    rig.request(0, false);
    rig.rec.clear();
    rig.tick_at(200);
    assert_eq!(rig.state(0), CircuitState::Open);
    assert!(rig.rec.circuit_calls().is_empty());
    assert!(!rig.svc.desired(rig.ids[0]));

    rig.link.set(true);
    rig.tick_at(300);
    assert_eq!(rig.state(0), CircuitState::Closed);
    assert_eq!(rig.rec.last_drive(0), Some(false));
}

#[test]
fn close_all_while_link_down_applies_on_reconnect() {
    let mut rig = Rig::new(2, 100, &[("A", false), ("B", false)]);
    rig.request(0, true);
    rig.request(1, true);
    rig.tick_at(0);

    rig.link.set(false);
    rig.svc.handle_command(AppCommand::CloseAll);
    rig.tick_at(50);
    assert!(rig.state(0).is_changing());
    assert!(rig.state(1).is_changing());

    rig.link.set(true);
    rig.tick_at(60);
    assert_eq!(rig.state(0), CircuitState::Closed);
    assert_eq!(rig.state(1), CircuitState::Closed);
}

#[test]
fn link_changes_are_reported_once() {
    let mut rig = Rig::new(1, 100, &[("A", false)]);
    rig.tick_at(0);
    rig.tick_at(1);
    rig.link.set(false);
    rig.tick_at(2);
    rig.tick_at(3);
    rig.link.set(true);
    rig.tick_at(4);

    let changes: Vec<_> = rig
        .events
        .0
        .iter()
        .filter_map(|e| match e {
            AppEvent::LinkChanged(up) => Some(*up),
            _ => None,
        })
        .collect();
    assert_eq!(changes, [true, false, true]);
    assert!(rig.svc.build_telemetry().link_up);
}

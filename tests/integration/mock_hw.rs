//! Mock hardware adapters for integration tests.
//!
//! Every valve drive and indicator publish lands in one shared, ordered
//! log so tests can assert on the exact call sequence the service made.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use valve_sequencer::app::events::AppEvent;
use valve_sequencer::app::ports::{ClockPort, EventSink, IndicatorSink, LinkPort, ValveOutput};
use valve_sequencer::app::service::SequencerService;
use valve_sequencer::circuit::CircuitId;
use valve_sequencer::sequencer::SequencerConfig;

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Drive(usize, bool),
    Status(usize, bool),
    Motion(usize, bool),
    Aggregate(bool),
}

#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<Call>>>);

#[allow(dead_code)]
impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Calls excluding the per-tick aggregate publish.
    pub fn circuit_calls(&self) -> Vec<Call> {
        self.0
            .borrow()
            .iter()
            .copied()
            .filter(|c| !matches!(c, Call::Aggregate(_)))
            .collect()
    }

    pub fn last_drive(&self, index: usize) -> Option<bool> {
        self.0.borrow().iter().rev().find_map(|c| match *c {
            Call::Drive(i, level) if i == index => Some(level),
            _ => None,
        })
    }

    pub fn last_aggregate(&self) -> Option<bool> {
        self.0.borrow().iter().rev().find_map(|c| match *c {
            Call::Aggregate(v) => Some(v),
            _ => None,
        })
    }

    pub fn valve(&self, index: usize) -> Box<dyn ValveOutput> {
        Box::new(RecValve { rec: self.clone(), index })
    }

    pub fn status(&self, index: usize) -> Box<dyn IndicatorSink> {
        Box::new(RecIndicator { rec: self.clone(), kind: Kind::Status, index })
    }

    pub fn motion(&self, index: usize) -> Box<dyn IndicatorSink> {
        Box::new(RecIndicator { rec: self.clone(), kind: Kind::Motion, index })
    }

    pub fn aggregate(&self) -> Box<dyn IndicatorSink> {
        Box::new(RecIndicator { rec: self.clone(), kind: Kind::Aggregate, index: 0 })
    }

    fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }
}

struct RecValve {
    rec: Recorder,
    index: usize,
}

impl ValveOutput for RecValve {
    fn drive(&mut self, level: bool) {
        self.rec.push(Call::Drive(self.index, level));
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Status,
    Motion,
    Aggregate,
}

struct RecIndicator {
    rec: Recorder,
    kind: Kind,
    index: usize,
}

impl IndicatorSink for RecIndicator {
    fn publish(&mut self, value: bool) {
        self.rec.push(match self.kind {
            Kind::Status => Call::Status(self.index, value),
            Kind::Motion => Call::Motion(self.index, value),
            Kind::Aggregate => Call::Aggregate(value),
        });
    }
}

// ── Clock / link / events ─────────────────────────────────────

#[derive(Default)]
pub struct ManualClock(Cell<u32>);

#[allow(dead_code)]
impl ManualClock {
    pub fn set(&self, ms: u32) {
        self.0.set(ms);
    }
}

impl ClockPort for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

pub struct ManualLink(Cell<bool>);

#[allow(dead_code)]
impl ManualLink {
    pub fn set(&self, up: bool) {
        self.0.set(up);
    }
}

impl LinkPort for ManualLink {
    fn is_link_up(&self) -> bool {
        self.0.get()
    }
}

#[derive(Default)]
pub struct RecordingEvents(pub Vec<AppEvent>);

impl EventSink for RecordingEvents {
    fn emit(&mut self, event: &AppEvent) {
        self.0.push(event.clone());
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// A started service with recording sinks on every circuit.
pub struct Rig {
    pub svc: SequencerService,
    pub rec: Recorder,
    pub clock: ManualClock,
    pub link: ManualLink,
    pub events: RecordingEvents,
    pub ids: Vec<CircuitId>,
}

#[allow(dead_code)]
impl Rig {
    /// `circuits` is `(name, inverted)` in registration order.  The
    /// recorder is cleared after `start`, so tests see tick calls only.
    pub fn new(cap: i32, open_ms: u32, circuits: &[(&str, bool)]) -> Self {
        let rec = Recorder::default();
        let mut svc = SequencerService::new(SequencerConfig {
            max_concurrent_open: cap,
            open_duration_ms: open_ms,
        });
        let mut ids = Vec::new();
        for (index, (name, inverted)) in circuits.iter().enumerate() {
            let id = svc
                .register_circuit(
                    name,
                    Some(rec.valve(index)),
                    Some(rec.status(index)),
                    Some(rec.motion(index)),
                    *inverted,
                )
                .expect("circuit table full");
            ids.push(id);
        }
        svc.set_aggregate_sink(rec.aggregate());

        let mut events = RecordingEvents::default();
        svc.start(&mut events);
        rec.clear();

        Self {
            svc,
            rec,
            clock: ManualClock::default(),
            link: ManualLink(Cell::new(true)),
            events,
            ids,
        }
    }

    pub fn request(&mut self, index: usize, open: bool) {
        use valve_sequencer::app::commands::AppCommand;
        self.svc.handle_command(AppCommand::SetCircuit { circuit: self.ids[index], open });
    }

    pub fn tick_at(&mut self, now: u32) {
        self.clock.set(now);
        self.svc.tick(&self.clock, &self.link, &mut self.events);
    }

    pub fn state(&self, index: usize) -> valve_sequencer::circuit::CircuitState {
        self.svc
            .circuits()
            .get(self.ids[index])
            .map(|c| c.state())
            .expect("unknown circuit")
    }
}

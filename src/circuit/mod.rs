//! Netlist store and event kernel: the two coupled subsystems described in
//! the crate's top-level documentation. This module owns the flat,
//! index-addressed storage; [`group`] resolves wire-connected pins into
//! propagation groups; [`kernel`] drives the discrete-event simulation.

mod group;
mod kernel;

use std::cell::RefCell;
use std::rc::Rc;

use crate::event_queue::EventQueue;
use crate::types::{Adjacency, GateKind, GroupIndex, PinIndex, PinKind};

/// Owns all pins, lines, and groups by index. [`crate::Pin`] and
/// [`crate::Bus`] are non-owning `(circuit, pin-index)` cursors over this
/// storage, cloning the same `Rc<RefCell<_>>` handle.
#[derive(Debug, Default)]
pub(crate) struct CircuitInner {
    // circuit definition
    pub(crate) pins: Vec<PinKind>,
    pub(crate) pin_states: Vec<bool>,
    pub(crate) changed_pins: Vec<PinIndex>,
    pub(crate) lines: Vec<(PinIndex, PinIndex)>,
    pub(crate) gate_count: usize,

    // propagation groups, built once by prepare()
    pub(crate) group_by_pin: Vec<Option<GroupIndex>>,
    pub(crate) groups: Vec<Vec<PinIndex>>,
    pub(crate) group_up_to_date: Vec<bool>,
    pub(crate) group_values: Vec<bool>,
    pub(crate) inbound: Vec<Adjacency>,
    pub(crate) outbound: Vec<Adjacency>,
    pub(crate) prepared: bool,

    // simulation
    pub(crate) queue: EventQueue,
    pub(crate) simulation_time: i64,
    pub(crate) gate_delays: [i64; GateKind::ALL.len()],
}

impl CircuitInner {
    fn new() -> Self {
        CircuitInner {
            gate_delays: [1; GateKind::ALL.len()],
            ..Default::default()
        }
    }

    fn add_pin(&mut self, kind: PinKind) -> PinIndex {
        self.pins.push(kind);
        self.pin_states.push(false);
        self.pins.len() - 1
    }

    pub(crate) fn gate_delay(&self, kind: GateKind) -> i64 {
        self.gate_delays[kind.index()]
    }
}

/// A circuit under construction or simulation.
///
/// Cheaply `Clone`-able: every clone is a handle to the same underlying
/// netlist (the owning storage lives behind a shared, internally-mutable
/// cell), which is what lets [`crate::Pin`]/[`crate::Bus`] cursors carry a
/// reference to their circuit without borrowing it for their whole
/// lifetime. Two independent `Circuit::new()` calls never share state.
#[derive(Debug, Clone)]
pub struct Circuit(pub(crate) Rc<RefCell<CircuitInner>>);

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit {
    pub fn new() -> Self {
        Circuit(Rc::new(RefCell::new(CircuitInner::new())))
    }

    /// Appends the gate's pins in the fixed input-then-output order and
    /// returns the output pin's index (for the two pseudo-gates
    /// `Connector`/`ExternalOutput`, there is only the one pin, and it is
    /// simultaneously the return value).
    pub fn add_gate(&self, kind: GateKind) -> PinIndex {
        let mut c = self.0.borrow_mut();
        debug_assert!(
            !c.prepared,
            "add_gate called after prepare(); the netlist is immutable once simulation has started"
        );
        let out = match kind {
            GateKind::Connector => c.add_pin(PinKind::Connector),
            GateKind::ExternalOutput => c.add_pin(PinKind::ExternalOutput),
            GateKind::Buf => {
                c.add_pin(PinKind::BufIn);
                let out = c.add_pin(PinKind::BufOut);
                c.gate_count += 1;
                out
            }
            GateKind::Not => {
                c.add_pin(PinKind::NotIn);
                let out = c.add_pin(PinKind::NotOut);
                c.gate_count += 1;
                out
            }
            GateKind::Or => {
                c.add_pin(PinKind::OrA);
                c.add_pin(PinKind::OrB);
                let out = c.add_pin(PinKind::OrOut);
                c.gate_count += 1;
                out
            }
            GateKind::And => {
                c.add_pin(PinKind::AndA);
                c.add_pin(PinKind::AndB);
                let out = c.add_pin(PinKind::AndOut);
                c.gate_count += 1;
                out
            }
            GateKind::Nor => {
                c.add_pin(PinKind::NorA);
                c.add_pin(PinKind::NorB);
                let out = c.add_pin(PinKind::NorOut);
                c.gate_count += 1;
                out
            }
            GateKind::Nand => {
                c.add_pin(PinKind::NandA);
                c.add_pin(PinKind::NandB);
                let out = c.add_pin(PinKind::NandOut);
                c.gate_count += 1;
                out
            }
            GateKind::Xor => {
                c.add_pin(PinKind::XorA);
                c.add_pin(PinKind::XorB);
                let out = c.add_pin(PinKind::XorOut);
                c.gate_count += 1;
                out
            }
            GateKind::DLatch => {
                c.add_pin(PinKind::DLatchData);
                c.add_pin(PinKind::DLatchEnable);
                let out = c.add_pin(PinKind::DLatchOut);
                c.gate_count += 1;
                out
            }
        };
        out
    }

    /// Declares an equipotential wire between two pins. Valid only before
    /// `prepare()` has been called.
    pub fn add_line(&self, a: PinIndex, b: PinIndex) {
        let mut c = self.0.borrow_mut();
        debug_assert!(
            !c.prepared,
            "add_line called after prepare(); the netlist is immutable once simulation has started"
        );
        c.lines.push((a, b));
    }

    /// A fresh connector pin: a passive wire endpoint with no driving gate.
    pub fn connector(&self) -> crate::builder::Pin {
        let index = self.add_gate(GateKind::Connector);
        crate::builder::Pin::at(self.clone(), index)
    }

    /// A fresh externally-driven input port.
    pub fn input(&self) -> crate::builder::Pin {
        let index = self.add_gate(GateKind::ExternalOutput);
        crate::builder::Pin::at(self.clone(), index)
    }

    /// A bus of `size` fresh connector pins.
    pub fn bus(&self, size: usize) -> crate::builder::Bus {
        crate::builder::Bus::connectors(self, size)
    }

    /// A bus of `size` fresh externally-driven input pins.
    pub fn input_bus(&self, size: usize) -> crate::builder::Bus {
        crate::builder::Bus::inputs(self, size)
    }

    /// Overwrites `kind`'s default delay of 1 virtual time unit. Must be
    /// called before the first `simulate()`.
    pub fn set_gate_delay(&self, kind: GateKind, delay: i64) {
        self.0.borrow_mut().gate_delays[kind.index()] = delay;
    }

    /// Switches the event queue's discipline: `true` for time-sorted
    /// dispatch (required when gate delays are heterogeneous and causality
    /// across fan-in branches matters), `false` for FIFO (faster,
    /// sufficient when delays are uniform).
    pub fn set_simulation_mode(&self, sort_queue: bool) {
        self.0.borrow_mut().queue.sort_queue = sort_queue;
    }

    /// Enables deduplication of simultaneous re-enqueues of the same pin.
    /// Not part of the original fixed API surface, but exposed since the
    /// event queue supports it and large buses benefit from it.
    pub fn set_event_dedup(&self, enabled: bool) {
        self.0.borrow_mut().queue.set_dedup(enabled);
    }

    pub fn gate_count(&self) -> usize {
        self.0.borrow().gate_count
    }

    pub fn pin_count(&self) -> usize {
        self.0.borrow().pins.len()
    }

    pub fn line_count(&self) -> usize {
        self.0.borrow().lines.len()
    }

    pub fn simulation_time(&self) -> i64 {
        self.0.borrow().simulation_time
    }

    /// Builds propagation groups and adjacency from the lines declared so
    /// far, then settles the netlist into an initial stable state. Must be
    /// called exactly once, after the netlist is fully built and before any
    /// `simulate()`.
    pub fn prepare(&self) {
        self.0.borrow_mut().prepare();
    }

    /// Advances virtual time by at most `time_units` (or without bound if
    /// `time_units == -1`), draining staged external writes first. Returns
    /// the number of virtual time units actually consumed.
    pub fn simulate(&self, time_units: i64) -> i64 {
        self.0.borrow_mut().simulate(time_units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_gate_allocates_contiguous_pins_and_returns_output() {
        let circuit = Circuit::new();
        let out = circuit.add_gate(GateKind::And);
        assert_eq!(circuit.pin_count(), 3);
        assert_eq!(out, 2);
        assert_eq!(circuit.gate_count(), 1);
    }

    #[test]
    fn pseudo_gates_do_not_count_as_gates() {
        let circuit = Circuit::new();
        circuit.add_gate(GateKind::Connector);
        circuit.add_gate(GateKind::ExternalOutput);
        assert_eq!(circuit.pin_count(), 2);
        assert_eq!(circuit.gate_count(), 0);
    }

    #[test]
    fn empty_netlist_prepare_and_simulate_are_a_no_op() {
        let circuit = Circuit::new();
        circuit.prepare();
        assert_eq!(circuit.simulate(-1), 0);
        assert_eq!(circuit.simulation_time(), 0);
    }
}

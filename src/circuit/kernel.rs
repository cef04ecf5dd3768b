//! The event kernel: `simulate()`'s dispatch loop, gate evaluation, and the
//! wired-OR group cache.

use crate::types::{Adjacency, PinBase, PinIndex, PinKind};

use super::CircuitInner;

impl CircuitInner {
    pub(crate) fn add_pin_to_queue(&mut self, pin: PinIndex, delay: i64, external: bool) {
        let time = self.simulation_time + delay;
        self.queue.add(pin, time, external);
    }

    /// Symmetric to `get_inbound_signal`: propagates a change at `pin`
    /// downstream. `None` -> nothing; a single destination -> enqueue it;
    /// a bus -> enqueue every consumer and invalidate the group's cache
    /// (its wired-OR value may now be stale).
    pub(crate) fn add_outbound_pins_to_queue(&mut self, pin: PinIndex) {
        match self.outbound[pin].clone() {
            Adjacency::None => {}
            Adjacency::Single(dest) => self.add_pin_to_queue(dest, 0, false),
            Adjacency::Multi(dests) => {
                for dest in dests {
                    self.add_pin_to_queue(dest, 0, false);
                }
                if let Some(g) = self.group_by_pin[pin] {
                    self.group_up_to_date[g] = false;
                }
            }
        }
    }

    /// Resolves a pin's logical input: its own state if nothing drives it,
    /// the single source's state if exactly one pin does, or the group's
    /// cached wired-OR value (recomputed on demand) if several do.
    pub(crate) fn get_inbound_signal(&mut self, pin: PinIndex) -> bool {
        match self.inbound[pin].clone() {
            Adjacency::None => self.pin_states[pin],
            Adjacency::Single(source) => self.pin_states[source],
            Adjacency::Multi(_) => {
                let g = self.group_by_pin[pin]
                    .expect("a pin with multi-driver inbound adjacency must belong to a group");
                if self.group_up_to_date[g] {
                    return self.group_values[g];
                }
                let mut value = false;
                for &driver in &self.groups[g] {
                    if driver != pin {
                        value |= self.pin_states[driver];
                        if value {
                            break;
                        }
                    }
                }
                self.group_up_to_date[g] = true;
                self.group_values[g] = value;
                value
            }
        }
    }

    pub(crate) fn simulate(&mut self, time_units: i64) -> i64 {
        debug_assert!(
            self.prepared,
            "simulate() called before prepare(); the netlist has no groups/adjacency yet"
        );
        let changed = std::mem::take(&mut self.changed_pins);
        for pin in changed {
            self.add_pin_to_queue(pin, 0, true);
        }
        self.process_queue(time_units)
    }

    pub(crate) fn process_queue(&mut self, time_units: i64) -> i64 {
        let start = self.simulation_time;
        let end = if time_units == -1 {
            start
        } else {
            start + time_units
        };

        loop {
            let Some(event) = self.queue.peek().copied() else {
                break;
            };
            if time_units != -1 && event.time > end {
                break;
            }
            self.queue.pop();

            if event.time > self.simulation_time {
                self.simulation_time = event.time;
            }

            let pin = event.pin;
            if event.external {
                // External writes bypass evaluation; they only propagate.
                self.add_outbound_pins_to_queue(pin);
                continue;
            }

            let kind = self.pins[pin];
            match kind.base() {
                PinBase::Connector => match kind {
                    PinKind::Connector => {
                        self.pin_states[pin] = self.get_inbound_signal(pin);
                    }
                    PinKind::ExternalOutput => {
                        self.add_outbound_pins_to_queue(pin);
                    }
                    _ => {}
                },
                PinBase::Input => {
                    let old = self.pin_states[pin];
                    let new_value = self.get_inbound_signal(pin);
                    self.pin_states[pin] = new_value;
                    if old != new_value {
                        if let Some((offset, gate)) = kind.output_schedule() {
                            let delay = self.gate_delay(gate);
                            self.add_pin_to_queue(pin + offset, delay, false);
                        }
                    }
                }
                PinBase::Output => {
                    let old = self.pin_states[pin];
                    let new_value = evaluate_output(kind, pin, &self.pin_states);
                    self.pin_states[pin] = new_value;
                    if old != new_value {
                        self.add_outbound_pins_to_queue(pin);
                    }
                }
            }
        }

        if self.simulation_time < end {
            self.simulation_time = end;
        }
        self.simulation_time - start
    }
}

/// The truth table for every `Output`-base pin kind, reading the preceding
/// input pins per the gate's fixed layout. A `D_LATCH` in transparent mode
/// (`enable` low) keeps its previous state rather than being reassigned --
/// that's the memory.
fn evaluate_output(kind: PinKind, pin: PinIndex, states: &[bool]) -> bool {
    match kind {
        PinKind::BufOut => states[pin - 1],
        PinKind::NotOut => !states[pin - 1],
        PinKind::OrOut => states[pin - 2] || states[pin - 1],
        PinKind::AndOut => states[pin - 2] && states[pin - 1],
        PinKind::NorOut => !(states[pin - 2] || states[pin - 1]),
        PinKind::NandOut => !(states[pin - 2] && states[pin - 1]),
        PinKind::XorOut => states[pin - 2] ^ states[pin - 1],
        PinKind::DLatchOut => {
            if states[pin - 1] {
                states[pin - 2]
            } else {
                states[pin]
            }
        }
        _ => unreachable!("evaluate_output called on a non-Output-base pin kind: {kind:?}"),
    }
}

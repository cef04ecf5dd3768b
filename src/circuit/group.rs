//! `prepare()`: the one-shot union-find pass that groups wire-connected
//! pins and derives inbound/outbound adjacency.

use crate::types::{Adjacency, PinBase, PinIndex};

use super::CircuitInner;

impl CircuitInner {
    pub(crate) fn prepare(&mut self) {
        let n = self.pins.len();

        self.inbound = vec![Adjacency::None; n];
        self.outbound = vec![Adjacency::None; n];
        self.group_by_pin = vec![None; n];

        let mut groups: Vec<Vec<PinIndex>> = Vec::new();

        // Union-find over the declared lines.
        for i in 0..self.lines.len() {
            let (a, b) = self.lines[i];
            let ag = self.group_by_pin[a];
            let bg = self.group_by_pin[b];
            match (ag, bg) {
                (None, None) => {
                    let g = groups.len();
                    groups.push(vec![a, b]);
                    self.group_by_pin[a] = Some(g);
                    self.group_by_pin[b] = Some(g);
                }
                (None, Some(g)) => {
                    groups[g].push(a);
                    self.group_by_pin[a] = Some(g);
                }
                (Some(g), None) => {
                    groups[g].push(b);
                    self.group_by_pin[b] = Some(g);
                }
                (Some(ga), Some(gb)) if ga != gb => {
                    let (keep, absorbed) = if groups[ga].len() >= groups[gb].len() {
                        (ga, gb)
                    } else {
                        (gb, ga)
                    };
                    let members = std::mem::take(&mut groups[absorbed]);
                    for &p in &members {
                        self.group_by_pin[p] = Some(keep);
                    }
                    groups[keep].extend(members);
                }
                (Some(_), Some(_)) => {
                    // same group already: a line re-stating an existing connection
                }
            }
        }

        // Project each group's internal pairs into directed drivers -> consumers
        // adjacency.
        for members in &groups {
            for &a in members {
                for &b in members {
                    if a != b {
                        self.add_pin_connection(a, b);
                    }
                }
            }
        }

        // Input-base pins consume; they never drive a group's wired-OR value.
        for members in &mut groups {
            members.retain(|&p| self.pins[p].base() != PinBase::Input);
        }

        self.group_up_to_date = vec![false; groups.len()];
        self.group_values = vec![false; groups.len()];
        self.groups = groups;
        self.prepared = true;

        // Settle: enqueue the whole netlist once and drain it before the
        // clock starts, then reset the virtual clock.
        self.pin_states = vec![false; n];
        for pin in 0..n {
            self.add_pin_to_queue(pin, 0, false);
        }
        self.changed_pins.clear();
        self.process_queue(-1);
        self.simulation_time = 0;
    }

    /// Records `a -> b` in the adjacency maps iff `a` can drive (`Output` or
    /// `Connector` base) and `b` can consume (`Input` or `Connector` base).
    /// This is the "drivers -> consumers" projection within one wire group.
    pub(crate) fn add_pin_connection(&mut self, a: PinIndex, b: PinIndex) {
        let a_base = self.pins[a].base();
        let b_base = self.pins[b].base();
        let b_consumes = matches!(b_base, PinBase::Input | PinBase::Connector);
        let a_drives = matches!(a_base, PinBase::Output | PinBase::Connector);
        if b_consumes && a_drives {
            self.inbound[b].add(a);
            self.outbound[a].add(b);
        }
    }
}

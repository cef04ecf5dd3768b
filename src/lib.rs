//! `icsim` is an event-driven digital logic simulator: build a netlist of
//! gates and wires with the fluent [`Pin`]/[`Bus`] combinators, call
//! [`Circuit::prepare`] once, then advance it in virtual time with
//! [`Circuit::simulate`].
//!
//! ```
//! use icsim::Circuit;
//!
//! let circuit = Circuit::new();
//! let a = circuit.input();
//! let b = circuit.input();
//! let out = a.and(&b);
//! circuit.prepare();
//!
//! a.set_value(true);
//! b.set_value(true);
//! circuit.simulate(-1);
//! assert!(out.get_value());
//! ```
//!
//! The [`analog`] module documents the crate's only nod to the structural,
//! continuous-voltage side of circuit simulation -- it is a degenerate
//! stand-in, not a solver. [`elements`] collects higher-level idioms (latches,
//! decoders) built entirely out of the kernel's primitive gates.

mod circuit;
mod event_queue;
mod types;

pub mod analog;
pub mod builder;
pub mod elements;

pub use builder::{Bus, Pin};
pub use circuit::Circuit;
pub use types::{Adjacency, GateKind, GroupIndex, PinBase, PinIndex, PinKind};

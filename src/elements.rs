//! Reusable combinational/sequential idioms built purely from the kernel's
//! primitive gates, in the vocabulary the CPU demonstration
//! (`demos/cpu8bit.rs`) is built from. These are client-level helpers --
//! nothing here touches `Circuit` internals beyond the public builder API.

use crate::builder::{Bus, Pin};

/// A level-sensitive D-latch built from two cross-coupled `NAND`s, rather
/// than the kernel's native `D_LATCH` gate kind. Registers and memory
/// cells in the CPU demonstration are built from this, matching how the
/// prior art's `Register`/`MemoryBank` compose latches from primitive
/// gates instead of relying on a latch primitive.
pub fn d_latch(data: &Pin, enable: &Pin) -> Pin {
    let s = data.nand(enable);
    let r = data.not().nand(enable);

    let notq = data.connector();
    let q = data.connector();

    r.nand(&q).connect(&notq);
    s.nand(&notq).connect(&q)
}

/// The one-hot line for `bus == value`: ANDs together each bit (or its
/// complement) of `bus` against the corresponding bit of `value`.
pub fn bus_match(bus: &Bus, value: u64) -> Pin {
    let mut active: Option<Pin> = None;
    for i in 0..bus.len() {
        let pin = bus.pin(i);
        let bit = if value & (1 << i) != 0 { pin } else { pin.not() };
        active = Some(match active {
            None => bit,
            Some(acc) => acc.and(&bit),
        });
    }
    active.expect("bus_match requires a non-empty bus")
}

/// A full one-hot address decoder: `2^input.len()` output lines, each high
/// exactly when `input` equals that line's index.
pub fn multiplexer(input: &Bus) -> Bus {
    let size = 1usize << input.len();
    let pins = (0..size)
        .map(|value| bus_match(input, value as u64).index())
        .collect();
    Bus::from_pins(input.circuit(), pins)
}

/// A toggle flip-flop: flips its output every time `toggle` rises, built
/// from two cross-coupled `d_latch`es (master-slave).
pub fn t_latch(toggle: &Pin) -> Pin {
    let q = toggle.connector();
    let master = d_latch(&q, &toggle.not());
    let slave = d_latch(&master, toggle);
    slave.not().connect(&q);
    q.not()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Circuit;

    #[test]
    fn d_latch_holds_value_when_disabled() {
        let circuit = Circuit::new();
        let data = circuit.input();
        let enable = circuit.input();
        let q = d_latch(&data, &enable);
        circuit.prepare();

        data.set_value(true);
        enable.set_value(true);
        circuit.simulate(-1);
        assert!(q.get_value());

        enable.set_value(false);
        circuit.simulate(-1);
        data.set_value(false);
        circuit.simulate(-1);
        assert!(q.get_value(), "output must hold after enable drops");
    }

    #[test]
    fn multiplexer_is_one_hot() {
        let circuit = Circuit::new();
        let bus = circuit.input_bus(2);
        let lines = multiplexer(&bus);
        circuit.prepare();

        for value in 0..4u64 {
            bus.set_value(value);
            circuit.simulate(-1);
            for line in 0..4 {
                assert_eq!(lines.pin(line).get_value(), line as u64 == value);
            }
        }
    }
}

//! Whole-circuit behavioral scenarios, exercising the fluent builder and the
//! event kernel together the way a client would.

use icsim::{Circuit, GateKind};

#[test]
fn and_gate_truth_table() {
    let circuit = Circuit::new();
    let a = circuit.input();
    let b = circuit.input();
    let out = a.and(&b);
    circuit.prepare();

    for (av, bv, expected) in [
        (false, false, false),
        (false, true, false),
        (true, false, false),
        (true, true, true),
    ] {
        a.set_value(av);
        b.set_value(bv);
        circuit.simulate(-1);
        assert_eq!(out.get_value(), expected, "a={av} b={bv}");
    }
}

#[test]
fn rs_latch_via_nor_pair() {
    let circuit = Circuit::new();
    let s = circuit.input();
    let r = circuit.input();
    let sp = circuit.connector();
    let rp = circuit.connector();

    s.nor(&sp).connect(&rp);
    r.nor(&rp).connect(&sp);
    circuit.prepare();

    let sequence = [
        (false, false, false),
        (true, false, true),
        (false, false, true),
        (false, true, false),
        (false, false, false),
        (true, false, true),
        (false, false, true),
    ];
    for (i, (sv, rv, expected)) in sequence.into_iter().enumerate() {
        s.set_value(sv);
        r.set_value(rv);
        circuit.simulate(-1);
        assert_eq!(sp.get_value(), expected, "step {i}: s={sv} r={rv}");
    }
}

#[test]
fn d_latch_classic_cross_couple() {
    let circuit = Circuit::new();
    let d = circuit.input();
    let c = circuit.input();
    let q = icsim::elements::d_latch(&d, &c);
    circuit.prepare();

    let sequence = [
        (false, false, false),
        (true, false, false),
        (true, true, true),
        (false, false, true),
        (true, false, true),
        (false, true, false),
        (true, false, false),
        (false, false, false),
    ];
    for (dv, cv, expected) in sequence {
        d.set_value(dv);
        c.set_value(cv);
        circuit.simulate(-1);
        assert_eq!(q.get_value(), expected, "d={dv} c={cv}");
    }
}

#[test]
fn full_adder_8bit() {
    let circuit = Circuit::new();
    let a = circuit.input_bus(8);
    let b = circuit.input_bus(8);
    let cin = circuit.input();
    let sum = circuit.bus(8);

    let mut carry = cin.clone();
    for i in 0..8 {
        let ai = a.pin(i);
        let bi = b.pin(i);
        ai.xor(&bi).xor(&carry).connect(&sum.pin(i));
        carry = ai.and(&bi).or(&carry.and(&ai.xor(&bi)));
    }
    circuit.prepare();

    a.set_value(0x3c);
    b.set_value(0x5a);
    cin.set_value(false);
    circuit.simulate(-1);

    assert_eq!(sum.get_value(), 0x96);
    assert!(!carry.get_value());
}

#[test]
fn memory_cell_with_address_decode() {
    let circuit = Circuit::new();
    circuit.set_gate_delay(GateKind::DLatch, 3);

    let address = circuit.input_bus(2);
    let data_in = circuit.input();
    let write = circuit.input();
    let clock = circuit.input();
    let read_bus = circuit.connector();

    for addr in 0..4u64 {
        let active = icsim::elements::bus_match(&address, addr);
        let cell = icsim::elements::d_latch(&data_in, &write.and(&clock).and(&active));
        cell.and(&active).connect(&read_bus);
    }
    circuit.prepare();

    write.set_value(true);
    data_in.set_value(true);
    for addr in 0..4u64 {
        address.set_value(addr);
        clock.set_value(true);
        circuit.simulate(-1);
        clock.set_value(false);
        circuit.simulate(-1);
    }

    // every address now holds 1
    for addr in 0..4u64 {
        address.set_value(addr);
        circuit.simulate(-1);
        assert!(read_bus.get_value(), "address {addr} did not hold its written value");
    }

    // overwrite address 0 with 0; the others must be unaffected
    write.set_value(true);
    data_in.set_value(false);
    address.set_value(0);
    clock.set_value(true);
    circuit.simulate(-1);
    clock.set_value(false);
    circuit.simulate(-1);
    write.set_value(false);

    address.set_value(0);
    circuit.simulate(-1);
    assert!(!read_bus.get_value(), "address 0 should now read 0");

    for addr in 1..4u64 {
        address.set_value(addr);
        circuit.simulate(-1);
        assert!(read_bus.get_value(), "address {addr} must be unaffected by writing address 0");
    }
}

#[test]
fn time_budget_across_a_two_hop_chain() {
    let circuit = Circuit::new();
    circuit.set_gate_delay(GateKind::DLatch, 3);

    let a = circuit.input();
    let stage1 = a.and(&a.one());
    let stage2 = stage1.and(&stage1.one());
    circuit.prepare();
    let t0 = circuit.simulation_time();

    a.set_value(true);
    circuit.simulate(1);
    assert!(!stage2.get_value(), "second hop needs a delay beyond the first gate's budget");

    let t1 = circuit.simulation_time();
    circuit.simulate(0);
    assert!(!stage2.get_value(), "a zero-unit budget must not advance anything");
    assert_eq!(circuit.simulation_time(), t1);

    let advanced = circuit.simulate(-1);
    assert!(stage2.get_value());
    assert_eq!(circuit.simulation_time() - t1, advanced);
    assert_eq!(circuit.simulation_time() - t0, 2);
}

/// A fan-out with heterogeneous delays: the same input drives a slow `NOT`
/// (delay 5) and a fast `BUF` (delay 1). Both branches are enqueued at the
/// same instant, `NOT` first (it's wired first), so in FIFO mode the fast
/// branch's event sits *behind* the slow branch's in the queue even though
/// it is due first in virtual time. A budgeted `simulate` that would have
/// time to dispatch the fast branch instead breaks on the slow branch's
/// event and never reaches it -- exactly the causality gap sorted mode
/// exists to close.
fn build_fan_out(circuit: &Circuit) -> (icsim::Pin, icsim::Pin, icsim::Pin) {
    circuit.set_gate_delay(GateKind::Not, 5);
    let a = circuit.input();
    let slow = a.not();
    let fast = a.buf();
    (a, slow, fast)
}

#[test]
fn fifo_mode_blocks_a_due_fast_branch_behind_a_later_slow_one() {
    let circuit = Circuit::new();
    let (a, _slow, fast) = build_fan_out(&circuit);
    circuit.prepare();

    a.set_value(true);
    circuit.simulate(2);

    assert!(
        !fast.get_value(),
        "FIFO dispatches in enqueue order, so the fast branch (due at +1) stays \
         stuck behind the slow branch's later event (+5) even though the \
         2-unit budget had time for it"
    );
}

#[test]
fn sorted_mode_dispatches_the_fast_branch_within_its_time_budget() {
    let circuit = Circuit::new();
    let (a, slow, fast) = build_fan_out(&circuit);
    circuit.set_simulation_mode(true);
    circuit.prepare();

    a.set_value(true);
    circuit.simulate(2);

    assert!(
        fast.get_value(),
        "sorted mode dispatches by time, so the fast branch (due at +1) updates \
         within a 2-unit budget regardless of enqueue order"
    );
    assert!(
        slow.get_value(),
        "the slow branch's event (due at +5) is still outside the 2-unit budget, \
         so its output must hold its pre-change settled value until it fires"
    );

    let drained = circuit.simulate(-1);
    assert!(!slow.get_value(), "draining fully must reach the slow branch and flip it");
    assert!(drained > 0);
}

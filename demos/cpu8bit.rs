//! An 8-bit accumulator CPU built entirely from `icsim`'s gate/pin kernel,
//! proving that the public builder API is enough to assemble a CPU without
//! any help from the crate beyond its primitive gates.
//!
//! This wires up the registers, a recursively-decoded memory bank, a
//! one-hot-decoded control unit and a small ALU, then free-runs the clock
//! for a few cycles and prints the program counter and accumulator. No
//! program loader is included here: feeding a loaded word bank a byte
//! stream is a client concern the kernel itself has no opinion about, so
//! the memory simply boots zeroed and the CPU executes `NOOP` forever,
//! which is enough to observe the fetch/execute cycle and PC increment
//! actually running on real simulated time.

use icsim::elements::{d_latch, multiplexer};
use icsim::{Bus, Circuit, Pin};

const DATA_BUS_SIZE: usize = 8;
const ADDRESS_BUS_SIZE: usize = 16;
const WORD_COUNT: usize = 16;
const REGISTER_COUNT: usize = 12;

/// One byte-wide storage cell clocked off a shared `clock` line, built the
/// same way the kernel's own `d_latch` idiom composes: one latch per bit,
/// gated by `write AND clock`, read back through `read AND clock`.
struct Register {
    read: Pin,
    write: Pin,
    cell: Bus,
}

impl Register {
    fn build(circuit: &Circuit, clock: &Pin, in_bus: &Bus, out_bus: &Bus) -> Register {
        let read = circuit.connector();
        let write = circuit.connector();
        let mut cell = Vec::with_capacity(in_bus.len());
        for i in 0..in_bus.len() {
            let output = d_latch(&in_bus.pin(i), &write.and(clock));
            output.and(&read).and(clock).connect(&out_bus.pin(i));
            cell.push(output.index());
        }
        Register {
            read,
            write,
            cell: Bus::from_pins(circuit, cell),
        }
    }

    /// A double-latched variant (a buffer stage feeding a second latch
    /// opened on the clock's complement): the program counter and
    /// accumulator use this so their output only settles between clock
    /// edges, not mid-cycle.
    fn build_buffered(circuit: &Circuit, clock: &Pin, in_bus: &Bus, out_bus: &Bus) -> Register {
        let read = circuit.connector();
        let write = circuit.connector();
        let mut cell = Vec::with_capacity(in_bus.len());
        for i in 0..in_bus.len() {
            let buffered = d_latch(&in_bus.pin(i), &write.and(clock));
            let output = d_latch(&buffered, &clock.not());
            output.and(&read).and(clock).connect(&out_bus.pin(i));
            cell.push(output.index());
        }
        Register {
            read,
            write,
            cell: Bus::from_pins(circuit, cell),
        }
    }
}

/// A binary-tree of address-decoded latch cells. `level` counts down from
/// the top address bit still being decoded; `level < 0` is the recursion's
/// base case, a leaf word.
///
/// `word_count`'s decode depth is `ceil(log2(word_count))` address bits,
/// capped so the recursion never reads past `address_bus`'s actual width.
fn decode_level(word_count: usize, address_bus_size: usize) -> i64 {
    let bits = (word_count as f64).log2().ceil() as i64;
    (bits - 1).min(address_bus_size as i64 - 1)
}

#[allow(clippy::too_many_arguments)]
fn add_bank(
    circuit: &Circuit,
    address_bus: &Bus,
    data_bus_size: usize,
    level: i64,
    read: &Pin,
    write: &Pin,
    in_bus: &Bus,
    out_bus: &Bus,
) {
    if level < 0 {
        for i in 0..data_bus_size {
            let out = d_latch(&in_bus.pin(i), write);
            out.and(read).connect(&out_bus.pin(i));
        }
        return;
    }

    let pin = address_bus.pin(level as usize);
    let ar = read.and(&pin.not());
    let aw = write.and(&pin.not());
    let br = read.and(&pin);
    let bw = write.and(&pin);

    let bus_a = circuit.bus(data_bus_size);
    let bus_b = circuit.bus(data_bus_size);

    add_bank(circuit, address_bus, data_bus_size, level - 1, &ar, &aw, &in_bus.and(&aw), &bus_a);
    add_bank(circuit, address_bus, data_bus_size, level - 1, &br, &bw, &in_bus.and(&bw), &bus_b);

    bus_a.and(&ar).connect(out_bus);
    bus_b.and(&br).connect(out_bus);
}

struct MemoryBank {
    clock: Pin,
    read: Pin,
    write: Pin,
    address_bus: Bus,
    data_bus: Bus,
}

impl MemoryBank {
    fn build(circuit: &Circuit, address_bus_size: usize, data_bus_size: usize, word_count: usize) -> MemoryBank {
        let clock = circuit.connector();
        let read = circuit.connector();
        let write = circuit.connector();
        let address_bus = circuit.bus(address_bus_size);
        let data_bus = circuit.bus(data_bus_size);

        let level = decode_level(word_count, address_bus_size);
        add_bank(
            circuit,
            &address_bus,
            data_bus_size,
            level,
            &clock.and(&read),
            &clock.and(&write),
            &data_bus,
            &data_bus,
        );

        MemoryBank {
            clock,
            read,
            write,
            address_bus,
            data_bus,
        }
    }
}

/// A ripple-carry adder: `out = a + b + carry_in`, returning carry-out.
fn full_adder(a: &Bus, b: &Bus, out: &Bus, carry_in: &Pin) -> Pin {
    let mut carry = carry_in.clone();
    for i in 0..a.len() {
        let ai = a.pin(i);
        let bi = b.pin(i);
        ai.xor(&bi).xor(&carry).connect(&out.pin(i));
        carry = ai.and(&bi).or(&carry.and(&ai.xor(&bi)));
    }
    carry
}

struct Cpu {
    circuit: Circuit,
    clock: Pin,
    memory: MemoryBank,
    pc: Register,
    inst: Register,
    flag: Register,
    acc: Register,
    addr_l: Register,
    addr_h: Register,
    general: Vec<Register>,
    data_bus: Bus,
    address_bus: Bus,
}

impl Cpu {
    fn build() -> Cpu {
        let circuit = Circuit::new();
        let clock = circuit.connector();

        let memory = MemoryBank::build(&circuit, ADDRESS_BUS_SIZE, DATA_BUS_SIZE, WORD_COUNT);

        let data_bus = circuit.bus(DATA_BUS_SIZE);
        let address_bus = circuit.bus(ADDRESS_BUS_SIZE);
        let inst_bus = circuit.bus(DATA_BUS_SIZE);
        let acc_write_bus = circuit.bus(DATA_BUS_SIZE);
        let pc_write_bus = circuit.bus(ADDRESS_BUS_SIZE);

        let alu_in_a = circuit.bus(DATA_BUS_SIZE);
        let alu_in_b = circuit.bus(DATA_BUS_SIZE);
        let alu_out = circuit.bus(DATA_BUS_SIZE);
        let alu_op_add = circuit.connector();
        let alu_op_sub = circuit.connector();
        let alu_op_and = circuit.connector();
        let alu_op_or = circuit.connector();
        let alu_op_not = circuit.connector();
        let alu_op_xor = circuit.connector();

        let pc = Register::build_buffered(&circuit, &clock, &pc_write_bus, &address_bus);
        let inst = Register::build(&circuit, &clock, &data_bus, &data_bus);
        let flag = Register::build(&circuit, &clock, &data_bus, &data_bus);
        let acc = Register::build_buffered(&circuit, &clock, &acc_write_bus, &data_bus);
        let addr_l = Register::build(&circuit, &clock, &data_bus, &data_bus);
        let addr_h = Register::build(&circuit, &clock, &data_bus, &data_bus);
        let general: Vec<Register> = (0..6).map(|_| Register::build(&circuit, &clock, &data_bus, &data_bus)).collect();

        // fetch/execute cycle toggle: a cross-coupled D-latch pair clocked
        // on `clock`/`clock.not()`, matching `tLatch`'s master/slave shape.
        let execute_cycle = circuit.connector();
        let fetch_cycle = execute_cycle.not();
        fetch_cycle.d_latch(&clock).d_latch(&clock.not()).connect(&execute_cycle);

        let halt_signal = circuit.connector();
        let fetch = fetch_cycle.and(&halt_signal.not());
        let execute = execute_cycle.clone();

        // fetch instruction
        fetch.connect(&memory.read);
        address_bus.and(&fetch).connect(&memory.address_bus);
        memory.data_bus.and(&fetch).connect(&data_bus);
        fetch.and(&memory.clock).connect(&inst.write);
        fetch.connect(&pc.read);

        // increment PC
        let zero = circuit.bus(ADDRESS_BUS_SIZE);
        let inc_out = circuit.bus(ADDRESS_BUS_SIZE);
        full_adder(&address_bus, &zero, &inc_out, &circuit.connector().one());
        inc_out.and(&fetch).connect(&pc_write_bus);
        fetch.connect(&pc.write);

        // decode instruction
        inst.cell.and(&execute).connect(&inst_bus);
        let inst_bus_l = inst_bus.split(0, 2);
        let inst_bus_h = inst_bus.split(1, 2);
        let data_bus_l = data_bus.split(0, 2);
        let data_bus_h = data_bus.split(1, 2);
        let acc_bus_l = acc.cell.split(0, 2);
        let acc_bus_h = acc.cell.split(1, 2);

        let register_selection = multiplexer(&inst_bus_l);
        let opcode_selection = multiplexer(&inst_bus_h);
        let write_to_selected_register = circuit.connector();
        let read_from_selected_register = circuit.connector();

        let mut registers: Vec<&Register> = vec![&pc, &inst, &flag, &acc, &addr_l, &addr_h];
        registers.extend(general.iter());
        debug_assert_eq!(registers.len(), REGISTER_COUNT);
        for (i, reg) in registers.iter().enumerate() {
            register_selection.pin(i).and(&read_from_selected_register).connect(&reg.read);
            register_selection.pin(i).and(&write_to_selected_register).connect(&reg.write);
        }

        let op_ldl = opcode_selection.pin(1).and(&clock).and(&execute);
        let op_ldh = opcode_selection.pin(2).and(&clock).and(&execute);
        let op_ld = opcode_selection.pin(3).and(&clock).and(&execute);
        let op_st = opcode_selection.pin(4).and(&clock).and(&execute);
        let op_mv_acc = opcode_selection.pin(5).and(&clock).and(&execute);
        let op_mv_x = opcode_selection.pin(6).and(&clock).and(&execute);

        let op_add = opcode_selection.pin(7).and(&clock).and(&execute);
        let op_sub = opcode_selection.pin(8).and(&clock).and(&execute);
        let op_and = opcode_selection.pin(9).and(&clock).and(&execute);
        let op_or = opcode_selection.pin(10).and(&clock).and(&execute);
        let op_not = opcode_selection.pin(11).and(&clock).and(&execute);
        let op_xor = opcode_selection.pin(12).and(&clock).and(&execute);

        inst_bus_l.and(&op_ldl).connect(&data_bus_l);
        acc_bus_h.and(&op_ldl).connect(&data_bus_h);

        inst_bus_l.and(&op_ldh).connect(&data_bus_h);
        acc_bus_l.and(&op_ldh).connect(&data_bus_l);

        let op_ld_clocked = op_ld.and(&memory.clock);
        op_ldl.or(&op_ldh).or(&op_ld_clocked).or(&op_mv_x).connect(&acc.write);
        op_st.or(&op_mv_acc).connect(&acc.read);
        op_mv_x.connect(&read_from_selected_register);
        op_mv_acc.connect(&write_to_selected_register);

        op_ld.connect(&memory.read);
        address_bus.and(&op_ld).connect(&memory.address_bus);
        memory.data_bus.and(&op_ld).connect(&data_bus);

        op_st.connect(&memory.write);
        address_bus.and(&op_st).connect(&memory.address_bus);
        data_bus.and(&op_st).connect(&memory.data_bus);

        let addr_select = op_ld.or(&op_st);
        addr_l.cell.and(&addr_select).connect(&address_bus.split(0, 2));
        addr_h.cell.and(&addr_select).connect(&address_bus.split(1, 2));

        // arithmetic
        let acc_write_from_alu = circuit.connector();
        data_bus.and(&acc_write_from_alu.not()).connect(&acc_write_bus);
        alu_out.and(&acc_write_from_alu).connect(&acc_write_bus);

        op_add.connect(&alu_op_add);
        op_sub.connect(&alu_op_sub);
        op_and.connect(&alu_op_and);
        op_or.connect(&alu_op_or);
        op_not.connect(&alu_op_not);
        op_xor.connect(&alu_op_xor);
        let any_alu = op_add
            .or(&op_sub)
            .or(&op_and)
            .or(&op_or)
            .or(&op_not)
            .or(&op_xor);
        any_alu.connect(&acc_write_from_alu);
        any_alu.connect(&acc.write);
        any_alu.connect(&read_from_selected_register);

        acc.cell.and(&any_alu).connect(&alu_in_a);
        data_bus.and(&any_alu).connect(&alu_in_b);

        let op_halt = opcode_selection.pin(0).and(&clock).and(&execute).and(&register_selection.pin(1));
        d_latch(&op_halt, &clock.and(&execute)).connect(&halt_signal);

        build_alu(&circuit, &alu_in_a, &alu_in_b, &alu_out, &alu_op_add, &alu_op_sub, &alu_op_and, &alu_op_or, &alu_op_not, &alu_op_xor);

        Cpu {
            circuit,
            clock,
            memory,
            pc,
            inst,
            flag,
            acc,
            addr_l,
            addr_h,
            general,
            data_bus,
            address_bus,
        }
    }

    fn prepare(&self) {
        self.circuit.prepare();
    }

    /// Pulses the clock low then high, the minimal unit of CPU progress.
    fn step(&self) {
        self.clock.set_value(false);
        self.circuit.simulate(-1);
        self.clock.set_value(true);
        self.circuit.simulate(-1);
    }
}

#[allow(clippy::too_many_arguments)]
fn build_alu(
    circuit: &Circuit,
    alu_in_a: &Bus,
    alu_in_b: &Bus,
    alu_out: &Bus,
    op_add: &Pin,
    op_sub: &Pin,
    op_and: &Pin,
    op_or: &Pin,
    op_not: &Pin,
    op_xor: &Pin,
) {
    let add_out = circuit.bus(DATA_BUS_SIZE);
    full_adder(alu_in_a, alu_in_b, &add_out, &circuit.connector().zero());
    add_out.and(op_add).connect(alu_out);

    // subtraction as two's complement addition: invert B, carry-in high.
    let inverted_b_pins: Vec<usize> = (0..alu_in_b.len()).map(|i| alu_in_b.pin(i).not().index()).collect();
    let inverted_b = Bus::from_pins(circuit, inverted_b_pins);
    let sub_out = circuit.bus(DATA_BUS_SIZE);
    full_adder(alu_in_a, &inverted_b, &sub_out, &circuit.connector().one());
    sub_out.and(op_sub).connect(alu_out);

    let and_out = circuit.bus(DATA_BUS_SIZE);
    for i in 0..alu_in_a.len() {
        alu_in_a.pin(i).and(&alu_in_b.pin(i)).connect(&and_out.pin(i));
    }
    and_out.and(op_and).connect(alu_out);

    let or_out = circuit.bus(DATA_BUS_SIZE);
    for i in 0..alu_in_a.len() {
        alu_in_a.pin(i).or(&alu_in_b.pin(i)).connect(&or_out.pin(i));
    }
    or_out.and(op_or).connect(alu_out);

    let not_out = circuit.bus(DATA_BUS_SIZE);
    for i in 0..alu_in_a.len() {
        alu_in_a.pin(i).not().connect(&not_out.pin(i));
    }
    not_out.and(op_not).connect(alu_out);

    let xor_out = circuit.bus(DATA_BUS_SIZE);
    for i in 0..alu_in_a.len() {
        alu_in_a.pin(i).xor(&alu_in_b.pin(i)).connect(&xor_out.pin(i));
    }
    xor_out.and(op_xor).connect(alu_out);
}

fn main() {
    let cpu = Cpu::build();
    cpu.prepare();

    println!(
        "built: {} gates, {} pins, {} lines",
        cpu.circuit.gate_count(),
        cpu.circuit.pin_count(),
        cpu.circuit.line_count()
    );

    for cycle in 0..8 {
        cpu.step();
        println!(
            "cycle {cycle}: pc={:#06x} acc={:#04x} inst={:#04x}",
            cpu.address_bus.get_value(),
            cpu.acc.cell.get_value(),
            cpu.inst.cell.get_value(),
        );
    }

    let _ = (&cpu.flag, &cpu.addr_l, &cpu.addr_h, &cpu.general, &cpu.data_bus, &cpu.memory);
}

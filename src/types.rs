//! Gate and pin kind enumerations, and the static relationships between them.
//!
//! A gate occupies a contiguous run of pins (`arity` inputs followed by one
//! output). The kernel exploits this layout instead of dispatching through a
//! polymorphic gate object: [`PinKind`] is a closed, `#[repr]`-free
//! enumeration and evaluation is a dense match over it.

/// Index into [`crate::Circuit`]'s flat pin storage.
pub type PinIndex = usize;

/// Index into [`crate::Circuit`]'s flat group storage, assigned by `prepare()`.
pub type GroupIndex = usize;

/// The gate primitives `addGate` can allocate, plus the two pseudo-gates
/// (`Connector`, `ExternalOutput`) that have no evaluated function but still
/// participate in pin allocation and gate-delay lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GateKind {
    /// A passive wire endpoint; one pin, no function.
    Connector,
    /// An externally-driven port; one pin, no function.
    ExternalOutput,
    Buf,
    Not,
    Or,
    And,
    Nor,
    Nand,
    Xor,
    DLatch,
}

impl GateKind {
    /// All variants, in the order used to size the gate-delay table.
    pub const ALL: [GateKind; 10] = [
        GateKind::Connector,
        GateKind::ExternalOutput,
        GateKind::Buf,
        GateKind::Not,
        GateKind::Or,
        GateKind::And,
        GateKind::Nor,
        GateKind::Nand,
        GateKind::Xor,
        GateKind::DLatch,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Number of input pins the gate reads (0 for the pseudo-gates).
    pub fn arity(self) -> usize {
        match self {
            GateKind::Connector | GateKind::ExternalOutput => 0,
            GateKind::Buf | GateKind::Not => 1,
            GateKind::Or | GateKind::And | GateKind::Nor | GateKind::Nand | GateKind::Xor | GateKind::DLatch => 2,
        }
    }

    /// Total pins the gate occupies (`arity` inputs + 1 output, or 1 for the
    /// pseudo-gates which are a single self-contained pin).
    pub fn pin_count(self) -> usize {
        match self {
            GateKind::Connector | GateKind::ExternalOutput => 1,
            other => other.arity() + 1,
        }
    }
}

/// The kind of a single pin. Every gate is a contiguous run of these, in a
/// fixed order: inputs first, then the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinKind {
    Connector,
    ExternalOutput,
    BufIn,
    BufOut,
    NotIn,
    NotOut,
    OrA,
    OrB,
    OrOut,
    AndA,
    AndB,
    AndOut,
    NorA,
    NorB,
    NorOut,
    NandA,
    NandB,
    NandOut,
    XorA,
    XorB,
    XorOut,
    DLatchData,
    DLatchEnable,
    DLatchOut,
    Disabled,
}

/// The three ways the event kernel reacts to a pin, derived from [`PinKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinBase {
    /// Passive wire endpoint.
    Connector,
    /// Consumer: dirties its gate's evaluation when its inbound signal changes.
    Input,
    /// Producer: driven by evaluating its gate's truth function.
    Output,
}

impl PinKind {
    pub fn base(self) -> PinBase {
        use PinKind::*;
        match self {
            Connector | ExternalOutput | Disabled => PinBase::Connector,
            BufIn | NotIn | OrA | OrB | AndA | AndB | NorA | NorB | NandA | NandB | XorA | XorB
            | DLatchData | DLatchEnable => PinBase::Input,
            BufOut | NotOut | OrOut | AndOut | NorOut | NandOut | XorOut | DLatchOut => PinBase::Output,
        }
    }

    /// For an `Input`-base pin, the offset to the gate's output pin and the
    /// gate kind whose delay governs the scheduled re-evaluation. `None` for
    /// pins that don't schedule anything (only reachable for non-`Input` kinds).
    pub(crate) fn output_schedule(self) -> Option<(usize, GateKind)> {
        use PinKind::*;
        Some(match self {
            BufIn => (1, GateKind::Buf),
            NotIn => (1, GateKind::Not),
            OrA => (2, GateKind::Or),
            OrB => (1, GateKind::Or),
            AndA => (2, GateKind::And),
            AndB => (1, GateKind::And),
            NorA => (2, GateKind::Nor),
            NorB => (1, GateKind::Nor),
            NandA => (2, GateKind::Nand),
            NandB => (1, GateKind::Nand),
            XorA => (2, GateKind::Xor),
            XorB => (1, GateKind::Xor),
            DLatchData => (2, GateKind::DLatch),
            DLatchEnable => (1, GateKind::DLatch),
            _ => return None,
        })
    }
}

/// Sparse directed-adjacency encoding for a single pin: most pins drive or
/// are driven by at most one other pin, so the common case avoids
/// allocating a set. `Multi` is the "wired bus" case (fan-out/fan-in >= 2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Adjacency {
    #[default]
    None,
    Single(PinIndex),
    Multi(Vec<PinIndex>),
}

impl Adjacency {
    /// Record `pin` as a neighbor, promoting `None -> Single -> Multi` as
    /// distinct neighbors accumulate. A repeated neighbor is a no-op.
    pub(crate) fn add(&mut self, pin: PinIndex) {
        match self {
            Adjacency::None => *self = Adjacency::Single(pin),
            Adjacency::Single(existing) => {
                if *existing != pin {
                    *self = Adjacency::Multi(vec![*existing, pin]);
                }
            }
            Adjacency::Multi(set) => {
                if !set.contains(&pin) {
                    set.push(pin);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Adjacency::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_promotes_through_states() {
        let mut adj = Adjacency::None;
        assert!(adj.is_empty());
        adj.add(3);
        assert_eq!(adj, Adjacency::Single(3));
        adj.add(3);
        assert_eq!(adj, Adjacency::Single(3), "repeated neighbor is a no-op");
        adj.add(7);
        assert_eq!(adj, Adjacency::Multi(vec![3, 7]));
        adj.add(9);
        assert_eq!(adj, Adjacency::Multi(vec![3, 7, 9]));
    }

    #[test]
    fn gate_arities_match_pin_layout() {
        assert_eq!(GateKind::Buf.pin_count(), 2);
        assert_eq!(GateKind::And.pin_count(), 3);
        assert_eq!(GateKind::DLatch.pin_count(), 3);
        assert_eq!(GateKind::Connector.pin_count(), 1);
    }

    #[test]
    fn pin_base_classification() {
        assert_eq!(PinKind::AndA.base(), PinBase::Input);
        assert_eq!(PinKind::AndOut.base(), PinBase::Output);
        assert_eq!(PinKind::Connector.base(), PinBase::Connector);
        assert_eq!(PinKind::Disabled.base(), PinBase::Connector);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn gate_kind_round_trips_through_ron() {
        let saved = ron::ser::to_string(&GateKind::DLatch).unwrap();
        let loaded: GateKind = ron::de::from_str(&saved).unwrap();
        assert_eq!(loaded, GateKind::DLatch);
    }
}

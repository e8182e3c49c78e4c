//! Single-line gate dumps.
//!
//! ```text
//! {"id":7, "op":"ADD", "MType":"I64", "bitfield":0, "type":"NJS_VALUE", "stamp":0, "mark":0, "in":[[], [], [5, 6], [], []], "out":[9]}
//! ```
//!
//! Empty input slots render as `N`. In preview mode every id is followed by
//! `:OPCODE`. A highlighted input is prefixed with `*`.

use std::fmt::{self, Write};

use tracing::info;

use super::circuit::Circuit;
use super::gate::{GateId, In};
use super::opcode::{EdgeZone, OpCode};

/// Display adapter for one gate.
pub struct GateDump<'a> {
    circuit: &'a Circuit,
    gate: GateId,
    highlight: Option<usize>,
    preview: bool,
}

impl<'a> GateDump<'a> {
    pub fn new(circuit: &'a Circuit, gate: GateId) -> Self {
        GateDump {
            circuit,
            gate,
            highlight: None,
            preview: false,
        }
    }

    /// Mark input slot `idx`.
    pub fn highlight(mut self, idx: usize) -> Self {
        self.highlight = Some(idx);
        self
    }

    /// Follow every id with the opcode of that gate.
    pub fn preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    fn write_id(&self, f: &mut fmt::Formatter<'_>, id: GateId) -> fmt::Result {
        write!(f, "{}", id)?;
        if self.preview {
            write!(f, ":{}", self.circuit.opcode(id))?;
        }
        Ok(())
    }

    fn write_slot(&self, f: &mut fmt::Formatter<'_>, idx: usize, slot: In) -> fmt::Result {
        if self.highlight == Some(idx) {
            f.write_char('*')?;
        }
        match slot {
            Some(id) => self.write_id(f, id),
            None => f.write_char('N'),
        }
    }
}

impl fmt::Display for GateDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gate = self.circuit.gate(self.gate);
        if gate.opcode() == OpCode::Nop {
            return Ok(());
        }
        let meta = self.circuit.gate_meta(self.gate);
        let (mark, stamp) = gate.raw_mark();

        write!(
            f,
            "{{\"id\":{}, \"op\":\"{}\", \"MType\":\"{}\", \"bitfield\":{}, \"type\":\"{}\", \"stamp\":{}, \"mark\":{}, \"in\":[",
            gate.id(),
            gate.opcode(),
            gate.machine_type(),
            meta.try_value().unwrap_or(0),
            gate.gate_type(),
            stamp,
            mark.code(),
        )?;

        for (z, zone) in EdgeZone::ALL.into_iter().enumerate() {
            if z > 0 {
                f.write_str(", ")?;
            }
            f.write_char('[')?;
            for (i, idx) in meta.zone_range(zone).enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                self.write_slot(f, idx, gate.ins()[idx])?;
            }
            f.write_char(']')?;
        }

        f.write_str("], \"out\":[")?;
        for (i, u) in self.circuit.uses(self.gate).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.write_id(f, u.consumer)?;
        }
        f.write_str("]}")
    }
}

impl Circuit {
    /// Dump adapter for `gate`.
    #[inline]
    pub fn dump(&self, gate: GateId) -> GateDump<'_> {
        GateDump::new(self, gate)
    }

    /// Log the dump of `gate` at INFO.
    pub fn print_gate(&self, gate: GateId) {
        if self.opcode(gate) != OpCode::Nop {
            info!("{}", self.dump(gate));
        }
    }

    /// Log every live gate at INFO.
    pub fn print_circuit(&self) {
        for gate in self.gates() {
            self.print_gate(gate);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Whole-circuit checks: edge integrity, acyclic and sound control flow,
//! and acyclic data and depend flow.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::error::IntegrityError;
use crate::ir::circuit::Circuit;
use crate::ir::gate::{GateId, MarkCode, UseRef};
use crate::ir::opcode::OpCode;

/// Every break in the pairing of `In` slots with consumer-list entries.
pub fn integrity_errors(circuit: &Circuit) -> Vec<IntegrityError> {
    let mut errors = Vec::new();
    let total_slots: usize = circuit.gate_ids().map(|g| circuit.num_ins(g)).sum();

    // Walk every consumer list and remember which producer lists each edge.
    let mut listed: FxHashMap<UseRef, GateId> = FxHashMap::default();
    for producer in circuit.gate_ids() {
        let mut prev: Option<UseRef> = None;
        let mut cursor = circuit.gate(producer).first_out();
        let mut steps = 0usize;

        while let Some(at) = cursor {
            steps += 1;
            let Some(consumer) = circuit.get(at.gate) else {
                errors.push(IntegrityError::DanglingUse {
                    producer,
                    gate: at.gate,
                    index: at.slot(),
                });
                break;
            };
            if at.slot() >= consumer.num_ins() || consumer.ins()[at.slot()] != Some(producer) {
                errors.push(IntegrityError::DanglingUse {
                    producer,
                    gate: at.gate,
                    index: at.slot(),
                });
                break;
            }
            let out = consumer.out_at(at.slot());
            if out.prev() != prev || steps > total_slots {
                errors.push(IntegrityError::BrokenLink {
                    producer,
                    gate: at.gate,
                    index: at.slot(),
                });
                break;
            }
            if listed.insert(at, producer).is_some() {
                errors.push(IntegrityError::DuplicateUse {
                    producer,
                    gate: at.gate,
                    index: at.slot(),
                });
            }
            prev = cursor;
            cursor = out.next();
        }
    }

    // Every connected slot must have been seen in its producer's list.
    for gate in circuit.gate_ids() {
        let consumer_live = !circuit.gate(gate).is_deleted();
        for (idx, slot) in circuit.gate(gate).ins().iter().enumerate() {
            let Some(producer) = *slot else {
                continue;
            };
            if !listed.contains_key(&UseRef::new(gate, idx)) {
                errors.push(IntegrityError::MissingUse {
                    gate,
                    index: idx,
                    producer,
                });
            }
            if consumer_live && circuit.gate(producer).is_deleted() {
                errors.push(IntegrityError::DeletedProducer {
                    gate,
                    index: idx,
                    producer,
                });
            }
        }
    }

    errors
}

/// First integrity break, if any.
pub fn check_integrity(circuit: &Circuit) -> Result<(), IntegrityError> {
    match integrity_errors(circuit).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// Marks of one walk, kept beside the circuit so checks stay read-only.
#[derive(Default)]
struct WalkMarks(FxHashMap<GateId, MarkCode>);

impl WalkMarks {
    fn get(&self, gate: GateId) -> MarkCode {
        self.0.get(&gate).copied().unwrap_or_default()
    }

    fn set(&mut self, gate: GateId, mark: MarkCode) {
        self.0.insert(gate, mark);
    }

    /// Iterative depth-first search from `start`.
    ///
    /// Returns the first edge `(gate, next)` that reaches a gate still on the
    /// stack. Gates finished by an earlier call are not entered again.
    fn find_cycle<F>(&mut self, start: GateId, next_of: F) -> Result<(), (GateId, GateId)>
    where
        F: Fn(GateId) -> SmallVec<[GateId; 4]>,
    {
        if self.get(start) != MarkCode::NoMark {
            return Ok(());
        }
        self.set(start, MarkCode::Visited);
        let mut stack = vec![(start, next_of(start))];
        while let Some((gate, pending)) = stack.last_mut() {
            let gate = *gate;
            let Some(next) = pending.pop() else {
                self.set(gate, MarkCode::Finished);
                stack.pop();
                continue;
            };
            match self.get(next) {
                MarkCode::Finished => {}
                MarkCode::Visited => return Err((gate, next)),
                MarkCode::NoMark => {
                    self.set(next, MarkCode::Visited);
                    stack.push((next, next_of(next)));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Control Flow
// =============================================================================

/// Depth-first walk from `STATE_ENTRY` over state edges.
///
/// Successors of `LOOP_BACK` are not followed, so loops are legal. Returns
/// the first edge `(from, to)` that closes any other cycle.
pub fn check_cfg_acyclic(circuit: &Circuit) -> Result<(), (GateId, GateId)> {
    WalkMarks::default().find_cycle(circuit.state_entry(), |g| state_successors(circuit, g))
}

/// Every reachable control gate must only hang off reachable control gates.
///
/// Returns the first `(gate, input)` whose producer is a state gate or
/// `STATE_ENTRY` that no state path from `STATE_ENTRY` reaches.
pub fn check_cfg_sound(circuit: &Circuit) -> Result<(), (GateId, usize)> {
    let reachable = reachable_from_entry(circuit);
    let is_control = |g: GateId| {
        circuit.gate_meta(g).is_state() || circuit.opcode(g) == OpCode::StateEntry
    };

    for gate in circuit.gates().filter(|g| reachable.contains(g)) {
        for (idx, slot) in circuit.gate(gate).ins().iter().enumerate() {
            match *slot {
                Some(pred) if is_control(pred) && !reachable.contains(&pred) => {
                    return Err((gate, idx));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn reachable_from_entry(circuit: &Circuit) -> FxHashSet<GateId> {
    let entry = circuit.state_entry();
    let mut reached = FxHashSet::default();
    reached.insert(entry);
    let mut work = vec![entry];
    while let Some(gate) = work.pop() {
        for next in state_successors(circuit, gate) {
            if reached.insert(next) {
                work.push(next);
            }
        }
    }
    reached
}

fn state_successors(circuit: &Circuit, gate: GateId) -> SmallVec<[GateId; 4]> {
    if circuit.opcode(gate) == OpCode::LoopBack {
        return SmallVec::new();
    }
    circuit
        .uses(gate)
        .filter(|u| u.is_state_edge)
        .map(|u| u.consumer)
        .collect()
}

// =============================================================================
// Data and Depend Flow
// =============================================================================

/// Floating gates must not feed themselves except through a selector.
///
/// Walks inputs backwards from every live schedulable gate and only enters
/// schedulable producers, so `VALUE_SELECTOR` and `DEPEND_SELECTOR` (fixed
/// gates) end the walk. Returns the first `(producer, consumer)` edge that
/// closes a cycle.
pub fn check_flow_acyclic(circuit: &Circuit) -> Result<(), (GateId, GateId)> {
    let schedulable = |g: GateId| circuit.gate_meta(g).is_schedulable();
    let producers = |g: GateId| -> SmallVec<[GateId; 4]> {
        circuit
            .gate(g)
            .ins()
            .iter()
            .flatten()
            .copied()
            .filter(|&p| schedulable(p))
            .collect()
    };

    let mut marks = WalkMarks::default();
    for start in circuit.gates().filter(|&g| schedulable(g)) {
        marks
            .find_cycle(start, &producers)
            .map_err(|(consumer, producer)| (producer, consumer))?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::builder::{ArithmeticBuilder, CircuitBuilder, ControlBuilder, MemoryBuilder};
    use crate::ir::types::MachineType;

    #[test]
    fn test_integrity_holds_after_mutations() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let x = b.arg(MachineType::I64, 0);
        let y = b.arg(MachineType::I64, 1);
        let sum = b.add(MachineType::I64, x, y);
        let product = b.mul(MachineType::I64, sum, x);

        circuit.modify_in(product, 0, y);
        circuit.delete_gate(sum);
        circuit.delete_in(product, 1);
        assert!(integrity_errors(&circuit).is_empty());
    }

    #[test]
    fn test_integrity_reports_consumer_of_deleted_gate() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let x = b.arg(MachineType::I64, 0);
        let y = b.arg(MachineType::I64, 1);
        let sum = b.add(MachineType::I64, x, y);
        let product = b.mul(MachineType::I64, sum, y);

        circuit.delete_gate(sum);
        // `product` still holds its edge to `sum`; only the liveness rule fires.
        let errors = integrity_errors(&circuit);
        assert_eq!(
            errors,
            vec![IntegrityError::DeletedProducer {
                gate: product,
                index: 0,
                producer: sum,
            }]
        );
        assert!(check_integrity(&circuit).is_err());
    }

    #[test]
    fn test_loop_is_acyclic() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let entry = b.state();
        let head = b.loop_begin(entry);
        let cond = b.boolean(true);
        let branch = b.if_branch(head, cond);
        let body = b.if_true(branch);
        b.loop_back(head, body);

        assert_eq!(check_cfg_acyclic(&circuit), Ok(()));
    }

    #[test]
    fn test_cycle_without_loop_back() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let entry = b.state();
        let merge = b.merge(&[entry, entry]);
        let block = b.ordinary_block(merge);
        circuit.modify_in(merge, 1, block);

        assert_eq!(check_cfg_acyclic(&circuit), Err((block, merge)));
        // The walk leaves no marks on the circuit.
        assert_eq!(circuit.get_mark(merge), MarkCode::NoMark);
    }

    #[test]
    fn test_unreachable_control_input_is_unsound() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let entry = b.state();
        let cond = b.boolean(true);
        let block = b.ordinary_block(entry);
        let branch = b.if_branch(entry, cond);
        let on_true = b.if_true(branch);
        let on_false = b.if_false(branch);
        let merge = b.merge(&[block, on_true]);
        assert_eq!(check_cfg_sound(&circuit), Ok(()));

        // The branch now hangs off its own false arm.
        circuit.modify_in(branch, 0, on_false);
        assert_eq!(check_cfg_sound(&circuit), Err((merge, 1)));
    }

    #[test]
    fn test_flow_cycle_without_selector() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let x = b.arg(MachineType::I64, 0);
        let a = b.add(MachineType::I64, x, x);
        let c = b.add(MachineType::I64, a, x);
        assert_eq!(check_flow_acyclic(&circuit), Ok(()));

        circuit.modify_in(a, 0, c);
        assert_eq!(check_flow_acyclic(&circuit), Err((a, c)));
    }

    #[test]
    fn test_depend_cycle_through_loads() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let addr = b.arg(MachineType::Arch, 0);
        let first = b.load(MachineType::I64, addr);
        let second = b.load(MachineType::I64, addr);

        circuit.modify_in(first, 0, second);
        assert_eq!(check_flow_acyclic(&circuit), Err((first, second)));
    }

    #[test]
    fn test_selector_breaks_flow_cycle() {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let entry = b.state();
        let head = b.loop_begin(entry);
        let init = b.int64(0);
        let one = b.int64(1);
        let phi = b.value_selector(MachineType::I64, head, &[init, init]);
        let next = b.add(MachineType::I64, phi, one);

        circuit.modify_in(phi, 2, next);
        assert_eq!(check_flow_acyclic(&circuit), Ok(()));
    }
}

//! End-to-end verifier scenarios on small hand-built circuits.

use circuit_ir::ir::{
    ArithmeticBuilder, Circuit, CircuitBuilder, ControlBuilder, GateId, GateType, ICmpCondition,
    MachineType, MemoryBuilder, OpCode,
};
use circuit_ir::verifier::{verify_circuit, verify_gate, SelectorFlow, VerifyError};
use circuit_ir::VerifierConfig;

fn collect() -> VerifierConfig {
    VerifierConfig::collecting()
}

/// Diamond ending in a value selector over `values`.
fn merge_with_selector(preds: usize, values: usize) -> (Circuit, GateId) {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let blocks: Vec<_> = (0..preds).map(|_| b.ordinary_block(entry)).collect();
    let merge = b.merge(&blocks);
    let inputs: Vec<_> = (0..values).map(|i| b.int64(i as i64)).collect();
    let selector = b.value_selector(MachineType::I64, merge, &inputs);
    (circuit, selector)
}

#[test]
fn selector_width_must_match_merge() {
    let (circuit, selector) = merge_with_selector(3, 2);
    let report = verify_gate(&circuit, selector, &collect());

    assert_eq!(report.diagnostics().len(), 1);
    let d = &report.diagnostics()[0];
    assert_eq!(d.opcode, OpCode::ValueSelector);
    assert_eq!(
        d.error,
        VerifyError::SelectorArity {
            flow: SelectorFlow::Data,
            expected: 3,
            actual: 2,
        }
    );
    assert!(d.error.to_string().contains("(expected:3 actual:2)"));
}

#[test]
fn depend_selector_width_must_match_merge() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let depend = b.depend();
    let left = b.ordinary_block(entry);
    let right = b.ordinary_block(entry);
    let merge = b.merge(&[left, right]);
    let effects = b.depend_selector(merge, &[depend]);

    let report = verify_gate(&circuit, effects, &collect());
    assert_eq!(report.diagnostics().len(), 1);
    assert_eq!(
        report.diagnostics()[0].error,
        VerifyError::SelectorArity {
            flow: SelectorFlow::Depend,
            expected: 2,
            actual: 1,
        }
    );
    assert!(report.diagnostics()[0]
        .to_string()
        .contains("number of depend inputs does not match the merge (expected:2 actual:1)"));
}

#[test]
fn selector_width_matching_merge_passes() {
    let (circuit, selector) = merge_with_selector(3, 3);
    assert!(verify_gate(&circuit, selector, &collect()).is_ok());
}

#[test]
fn if_true_requires_if_branch() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let block = b.ordinary_block(entry);
    let on_true = b.if_true(block);
    b.ordinary_block(on_true);

    let report = verify_gate(&circuit, on_true, &collect());
    assert_eq!(report.diagnostics().len(), 1);
    let d = &report.diagnostics()[0];
    assert_eq!(d.input, Some(0));
    assert_eq!(
        d.error,
        VerifyError::StateProducerMismatch {
            expected: OpCode::IfBranch,
            actual: OpCode::OrdinaryBlock,
        }
    );
    let message = d.to_string();
    assert!(message.contains("IF_BRANCH"));
    assert!(message.contains("ORDINARY_BLOCK"));
}

#[test]
fn loop_begin_back_edge_must_be_loop_back() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let head = b.loop_begin(entry);
    let cond = b.boolean(true);
    let branch = b.if_branch(head, cond);
    let body = b.if_true(branch);
    // Back edge wired straight from the body, skipping LOOP_BACK.
    circuit.new_in(head, 1, body);

    let report = verify_gate(&circuit, head, &collect());
    assert_eq!(report.diagnostics().len(), 1);
    let d = &report.diagnostics()[0];
    assert_eq!(d.input, Some(1));
    assert_eq!(
        d.error,
        VerifyError::StateProducerMismatch {
            expected: OpCode::LoopBack,
            actual: OpCode::IfTrue,
        }
    );
}

#[test]
fn if_branch_condition_must_be_i1_on_every_target() {
    for is_arch64 in [false, true] {
        let mut circuit = Circuit::new();
        let mut b = CircuitBuilder::new(&mut circuit);
        let entry = b.state();
        let cond = b.int32(1);
        let branch = b.if_branch(entry, cond);
        b.if_true(branch);
        b.if_false(branch);

        let config = collect().with_arch64(is_arch64);
        let report = verify_gate(&circuit, branch, &config);
        assert_eq!(report.diagnostics().len(), 1, "arch64 = {is_arch64}");
        assert_eq!(
            report.diagnostics()[0].error,
            VerifyError::MachineTypeMismatch {
                expected: MachineType::I1,
                actual: MachineType::I32,
            }
        );
    }
}

#[test]
fn arch_operand_resolves_per_target() {
    let mut circuit = Circuit::new();
    let address = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
    let depend = circuit.depend_entry();
    let meta = circuit.metas().fixed(OpCode::Load);
    let load = circuit.new_gate(
        meta,
        MachineType::I32,
        &[depend, address],
        GateType::NJS_VALUE,
    );

    assert!(verify_gate(&circuit, load, &collect().with_arch64(true)).is_ok());
    let report = verify_gate(&circuit, load, &collect().with_arch64(false));
    assert_eq!(
        report.diagnostics()[0].error,
        VerifyError::MachineTypeMismatch {
            expected: MachineType::I32,
            actual: MachineType::I64,
        }
    );
}

#[test]
fn duplicate_branch_output_is_reported() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let cond = b.boolean(true);
    let branch = b.if_branch(entry, cond);
    b.if_true(branch);
    b.if_true(branch);

    let report = verify_gate(&circuit, branch, &collect());
    assert!(report.any(|e| matches!(
        e,
        VerifyError::DuplicateBranchOutput {
            opcode: OpCode::IfTrue,
            state_count: 1,
        }
    )));
    assert!(!report.any(|e| matches!(e, VerifyError::StateSuccessorCount { .. })));
}

#[test]
fn duplicate_switch_default_is_reported() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let index = b.arg(MachineType::I32, 0);
    let switch = b.switch_branch(entry, index, 1);
    b.default_case(switch);
    b.default_case(switch);

    let report = verify_gate(&circuit, switch, &collect());
    assert_eq!(report.diagnostics().len(), 1);
    assert_eq!(
        report.diagnostics()[0].error,
        VerifyError::DuplicateBranchOutput {
            opcode: OpCode::DefaultCase,
            state_count: 1,
        }
    );
}

#[test]
fn check_frame_state_input_must_be_frame_state() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let x = b.arg(MachineType::I64, 0);
    let size = b.int64(16);
    let obj = b.heap_alloc(size, 0);
    let index = b.int64(0);
    let check = b.object_type_check(GateType::TAGGED_POINTER, obj, index, x);
    b.load_element(0, obj, index);

    let frame_state_start = circuit.gate_meta(check).frame_state_start();
    assert_eq!(frame_state_start, 4);
    let report = verify_gate(&circuit, check, &collect());
    assert_eq!(report.diagnostics().len(), 1);
    let d = &report.diagnostics()[0];
    assert_eq!(d.input, Some(frame_state_start));
    assert_eq!(d.error, VerifyError::NotFrameState { actual: OpCode::Arg });
}

#[test]
fn nop_with_consumer_fails() {
    let mut circuit = Circuit::new();
    let nop_meta = circuit.metas().fixed(OpCode::Nop);
    let nop = circuit.new_gate(nop_meta, MachineType::I64, &[], GateType::EMPTY);
    let x = circuit.new_arg(MachineType::I64, 0, GateType::NJS_VALUE);
    let add_meta = circuit.metas().fixed(OpCode::Add);
    circuit.new_gate(add_meta, MachineType::I64, &[nop, x], GateType::NJS_VALUE);

    let report = verify_gate(&circuit, nop, &collect());
    assert_eq!(
        report.diagnostics()[0].error,
        VerifyError::NopHasConsumers { count: 1 }
    );
    // NOP gates render nothing.
    assert!(report.diagnostics()[0].dump.is_empty());
}

#[test]
fn empty_input_stops_further_checks() {
    let mut circuit = Circuit::new();
    let meta = circuit.metas().fixed(OpCode::IfTrue);
    let on_true = circuit.new_gate_partial(meta, MachineType::NoValue, &[None], GateType::EMPTY);

    let report = verify_gate(&circuit, on_true, &collect());
    assert_eq!(report.diagnostics().len(), 1);
    assert_eq!(report.diagnostics()[0].error, VerifyError::EmptyInput);
}

#[test]
fn depend_input_must_produce_effects() {
    let mut circuit = Circuit::new();
    let x = circuit.new_arg(MachineType::Arch, 0, GateType::NJS_VALUE);
    let meta = circuit.metas().fixed(OpCode::Load);
    let load = circuit.new_gate(meta, MachineType::I64, &[x, x], GateType::NJS_VALUE);

    let report = verify_gate(&circuit, load, &collect());
    assert!(report.any(|e| *e == VerifyError::NotDependProducer { actual: OpCode::Arg }));
}

#[test]
fn return_must_hang_off_return_list() {
    let mut circuit = Circuit::new();
    let entry = circuit.state_entry();
    let depend = circuit.depend_entry();
    let arg_list = circuit.arg_list();
    let meta = circuit.metas().fixed(OpCode::ReturnVoid);
    let ret = circuit.new_gate(
        meta,
        MachineType::NoValue,
        &[entry, depend, arg_list],
        GateType::EMPTY,
    );

    let report = verify_gate(&circuit, ret, &collect());
    assert_eq!(
        report.diagnostics()[0].error,
        VerifyError::RootMismatch {
            expected: OpCode::ReturnList,
            actual: OpCode::ArgList,
        }
    );
    assert_eq!(report.diagnostics()[0].input, Some(2));
}

#[test]
fn depend_relay_requires_control_case() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let depend = b.depend();
    let merge = b.merge(&[entry]);
    let relay = b.depend_relay(merge, depend);

    let report = verify_gate(&circuit, relay, &collect());
    assert!(report.any(|e| *e == VerifyError::RelayNotOnCase { actual: OpCode::Merge }));
}

#[test]
fn clean_circuit_passes_every_check() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let depend = b.depend();
    let x = b.arg(MachineType::I64, 0);
    let one = b.int64(1);
    let cond = b.boolean(true);
    let branch = b.if_branch(entry, cond);
    let on_true = b.if_true(branch);
    let on_false = b.if_false(branch);
    let inc = b.add(MachineType::I64, x, one);
    let merge = b.merge(&[on_true, on_false]);
    let phi = b.value_selector(MachineType::I64, merge, &[inc, x]);
    let effects = b.depend_selector(merge, &[depend, depend]);
    b.return_value(merge, effects, phi);

    let report = verify_circuit(&circuit, &VerifierConfig::default());
    assert!(report.is_ok());
}

#[test]
fn verify_circuit_reports_control_cycle() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let merge = b.merge(&[entry, entry]);
    let block = b.ordinary_block(merge);
    circuit.modify_in(merge, 1, block);

    let report = verify_circuit(&circuit, &collect());
    assert!(report.any(|e| *e == VerifyError::CfgCycle { from: block, to: merge }));
}

#[test]
fn verify_circuit_reports_data_cycle() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let x = b.arg(MachineType::I64, 0);
    let a = b.add(MachineType::I64, x, x);
    let c = b.add(MachineType::I64, a, x);
    circuit.modify_in(a, 0, c);

    let report = verify_circuit(&circuit, &collect());
    assert_eq!(report.total(), 1, "{}", report.render());
    let d = &report.diagnostics()[0];
    assert_eq!(d.gate, c);
    assert_eq!(d.error, VerifyError::FlowCycle { from: a, to: c });
}

#[test]
fn verify_circuit_accepts_loop_carried_selector() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let depend = b.depend();
    let head = b.loop_begin(entry);
    let init = b.int64(0);
    let one = b.int64(1);
    let phi = b.value_selector(MachineType::I64, head, &[init, init]);
    let next = b.add(MachineType::I64, phi, one);
    let cond = b.icmp(ICmpCondition::Slt, next, one);
    let branch = b.if_branch(head, cond);
    let body = b.if_true(branch);
    let exit = b.if_false(branch);
    b.loop_back(head, body);
    b.return_value(exit, depend, next);
    circuit.modify_in(phi, 2, next);

    let report = verify_circuit(&circuit, &collect());
    assert!(report.is_ok(), "{}", report.render());
}

#[test]
fn verify_circuit_reports_unreachable_control_input() {
    let mut circuit = Circuit::new();
    let mut b = CircuitBuilder::new(&mut circuit);
    let entry = b.state();
    let depend = b.depend();
    let cond = b.boolean(true);
    let block = b.ordinary_block(entry);
    let branch = b.if_branch(entry, cond);
    let on_true = b.if_true(branch);
    let on_false = b.if_false(branch);
    let merge = b.merge(&[block, on_true]);
    b.return_void(merge, depend);
    circuit.modify_in(branch, 0, on_false);

    let report = verify_circuit(&circuit, &collect());
    let d = report
        .diagnostics()
        .iter()
        .find(|d| matches!(d.error, VerifyError::UnreachableStateInput { .. }))
        .expect("unsound CFG reported");
    assert_eq!(d.gate, merge);
    assert_eq!(d.input, Some(1));
    assert_eq!(d.error, VerifyError::UnreachableStateInput { pred: on_true });
    assert!(d.to_string().contains("CFG is not sound"));
}

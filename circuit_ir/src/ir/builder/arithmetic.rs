use super::CircuitBuilder;
use crate::ir::gate::GateId;
use crate::ir::meta::TypedBinaryInfo;
use crate::ir::opcode::{FCmpCondition, ICmpCondition, OpCode, TypedBinOp};
use crate::ir::types::{GateType, MachineType};

/// Builder trait for constants, arithmetic, comparisons and conversions.
pub trait ArithmeticBuilder {
    // Constants
    fn int32(&mut self, value: i32) -> GateId;
    fn int64(&mut self, value: i64) -> GateId;
    fn double(&mut self, value: f64) -> GateId;
    fn boolean(&mut self, value: bool) -> GateId;
    fn const_string(&mut self, literal: &str) -> GateId;

    // Generic Shapes
    fn binary_arith(&mut self, op: OpCode, machine_type: MachineType, lhs: GateId, rhs: GateId) -> GateId;
    fn unary_arith(&mut self, op: OpCode, machine_type: MachineType, value: GateId) -> GateId;

    // Comparisons
    fn icmp(&mut self, cond: ICmpCondition, lhs: GateId, rhs: GateId) -> GateId;
    fn fcmp(&mut self, cond: FCmpCondition, lhs: GateId, rhs: GateId) -> GateId;

    // Typed Operators
    #[allow(clippy::too_many_arguments)]
    fn typed_binary_op(
        &mut self,
        state: GateId,
        depend: GateId,
        lhs: GateId,
        rhs: GateId,
        op: TypedBinOp,
        operand_types: (GateType, GateType),
        result_type: GateType,
    ) -> GateId;

    // Integer and Float Arithmetic
    fn add(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Add, mt, lhs, rhs)
    }

    fn sub(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Sub, mt, lhs, rhs)
    }

    fn mul(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Mul, mt, lhs, rhs)
    }

    fn sdiv(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Sdiv, mt, lhs, rhs)
    }

    fn udiv(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Udiv, mt, lhs, rhs)
    }

    fn smod(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Smod, mt, lhs, rhs)
    }

    fn fdiv(&mut self, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Fdiv, MachineType::F64, lhs, rhs)
    }

    // Bitwise
    fn and(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::And, mt, lhs, rhs)
    }

    fn or(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Or, mt, lhs, rhs)
    }

    fn xor(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Xor, mt, lhs, rhs)
    }

    fn lsl(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Lsl, mt, lhs, rhs)
    }

    fn lsr(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Lsr, mt, lhs, rhs)
    }

    fn asr(&mut self, mt: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        self.binary_arith(OpCode::Asr, mt, lhs, rhs)
    }

    // Conversions
    fn boolean_not(&mut self, value: GateId) -> GateId {
        self.unary_arith(OpCode::Rev, MachineType::I1, value)
    }

    fn zext(&mut self, to: MachineType, value: GateId) -> GateId {
        self.unary_arith(OpCode::Zext, to, value)
    }

    fn sext(&mut self, to: MachineType, value: GateId) -> GateId {
        self.unary_arith(OpCode::Sext, to, value)
    }

    fn trunc(&mut self, to: MachineType, value: GateId) -> GateId {
        self.unary_arith(OpCode::Trunc, to, value)
    }

    fn bitcast(&mut self, to: MachineType, value: GateId) -> GateId {
        self.unary_arith(OpCode::Bitcast, to, value)
    }

    fn tagged_to_int64(&mut self, value: GateId) -> GateId {
        self.unary_arith(OpCode::TaggedToInt64, MachineType::I64, value)
    }

    fn int64_to_tagged(&mut self, value: GateId) -> GateId {
        self.unary_arith(OpCode::Int64ToTagged, MachineType::I64, value)
    }
}

impl ArithmeticBuilder for CircuitBuilder<'_> {
    fn int32(&mut self, value: i32) -> GateId {
        self.circuit
            .constant(MachineType::I32, value as u32 as u64, GateType::NJS_VALUE)
    }

    fn int64(&mut self, value: i64) -> GateId {
        self.circuit
            .constant(MachineType::I64, value as u64, GateType::NJS_VALUE)
    }

    fn double(&mut self, value: f64) -> GateId {
        self.circuit
            .constant(MachineType::F64, value.to_bits(), GateType::NJS_VALUE)
    }

    fn boolean(&mut self, value: bool) -> GateId {
        self.circuit
            .constant(MachineType::I1, u64::from(value), GateType::NJS_VALUE)
    }

    fn const_string(&mut self, literal: &str) -> GateId {
        let meta = self.circuit.metas_mut().const_string(literal);
        self.typed_gate(meta, MachineType::Arch, &[], GateType::NJS_VALUE)
    }

    fn binary_arith(&mut self, op: OpCode, machine_type: MachineType, lhs: GateId, rhs: GateId) -> GateId {
        let meta = self.fixed_meta(op);
        self.typed_gate(meta, machine_type, &[lhs, rhs], GateType::NJS_VALUE)
    }

    fn unary_arith(&mut self, op: OpCode, machine_type: MachineType, value: GateId) -> GateId {
        let meta = self.fixed_meta(op);
        self.typed_gate(meta, machine_type, &[value], GateType::NJS_VALUE)
    }

    fn icmp(&mut self, cond: ICmpCondition, lhs: GateId, rhs: GateId) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::Icmp, cond as u64);
        self.typed_gate(meta, MachineType::I1, &[lhs, rhs], GateType::NJS_VALUE)
    }

    fn fcmp(&mut self, cond: FCmpCondition, lhs: GateId, rhs: GateId) -> GateId {
        let meta = self
            .circuit
            .metas_mut()
            .one_parameter(OpCode::Fcmp, cond as u64);
        self.typed_gate(meta, MachineType::I1, &[lhs, rhs], GateType::NJS_VALUE)
    }

    fn typed_binary_op(
        &mut self,
        state: GateId,
        depend: GateId,
        lhs: GateId,
        rhs: GateId,
        op: TypedBinOp,
        operand_types: (GateType, GateType),
        result_type: GateType,
    ) -> GateId {
        let packed = TypedBinaryInfo::pack(operand_types.0.raw(), operand_types.1.raw());
        let meta = self.circuit.metas_mut().typed_binary(packed, op);
        let gate = self.typed_gate(meta, MachineType::I64, &[state, depend, lhs, rhs], result_type);
        self.state = gate;
        self.depend = gate;
        gate
    }
}

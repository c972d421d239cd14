//! ALU / ALU64 rendering.

use super::DisasmResult;
use super::error::{DisasmError, UnsupportedEncoding};
use crate::bytecode::{AluOp, ArithmeticOpcode, Instruction, RegName, SourceType};

pub(super) fn render(op: ArithmeticOpcode, insn: &Instruction) -> DisasmResult {
    let code = op
        .code()
        .ok_or_else(|| DisasmError::invalid(insn, "undefined arithmetic operation"))?;
    let dst = RegName(insn.dst_reg());

    // DIV and MOD look at the src register *field*, not its runtime value:
    // a zero field prints the divide-by-zero outcome even for the K form.
    let text = match code {
        AluOp::Div if insn.src_reg() == 0 => format!("{dst} = 0"),
        AluOp::Mod if insn.src_reg() == 0 => format!("{dst} = {dst}"),
        AluOp::Neg => format!("{dst} = ~{}", RegName(insn.src_reg())),
        AluOp::End => return Err(UnsupportedEncoding::ByteSwap.into()),
        _ if code.is_shift() => shift(code, op, insn),
        _ => assignment(code, op, insn),
    };
    Ok(text)
}

fn operator(code: AluOp) -> &'static str {
    code.operator().unwrap_or_default()
}

fn assignment(code: AluOp, op: ArithmeticOpcode, insn: &Instruction) -> String {
    let dst = RegName(insn.dst_reg());
    let operator = operator(code);
    match op.source() {
        SourceType::Imm => format!("{dst} {operator}= {}", insn.imm()),
        SourceType::Reg => format!("{dst} {operator}= {}", RegName(insn.src_reg())),
    }
}

fn shift(code: AluOp, op: ArithmeticOpcode, insn: &Instruction) -> String {
    let mask: i32 = if op.is_64bit() { 0x3f } else { 0x1f };
    let dst = RegName(insn.dst_reg());
    let operator = operator(code);
    match op.source() {
        SourceType::Imm => format!("{dst} {operator}= {}", insn.imm() & mask),
        SourceType::Reg => format!("{dst} {operator}= ({} & {mask})", RegName(insn.src_reg())),
    }
}

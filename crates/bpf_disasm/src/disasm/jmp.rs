//! JMP / JMP32 rendering.

use super::DisasmResult;
use super::error::DisasmError;
use crate::bytecode::{Instruction, JmpOp, JumpOpcode, OpcodeClass, RegName, SourceType};

/// `src` field values of a CALL instruction.
const CALL_HELPER: u8 = 0;
const CALL_LOCAL: u8 = 1;
const CALL_HELPER_BTF_ID: u8 = 2;

pub(super) fn render(op: JumpOpcode, insn: &Instruction) -> DisasmResult {
    let code = op
        .code()
        .ok_or_else(|| DisasmError::invalid(insn, "undefined jump operation"))?;

    if matches!(code, JmpOp::Call | JmpOp::Exit) && op.class() == OpcodeClass::Jmp32 {
        return Err(DisasmError::invalid(insn, "call and exit are JMP only"));
    }

    let text = match code {
        JmpOp::Ja => format!("goto {:+}", insn.offset()),
        JmpOp::Exit => "exit".to_string(),
        JmpOp::Call => match insn.src_reg() {
            CALL_HELPER | CALL_HELPER_BTF_ID => format!("call {}", insn.imm()),
            CALL_LOCAL => format!("call {:+}", insn.offset()),
            _ => return Err(DisasmError::invalid(insn, "undefined call kind")),
        },
        _ => {
            let operator = code.operator().unwrap_or_default();
            let dst = RegName(insn.dst_reg());
            match op.source() {
                SourceType::Imm => {
                    format!("if {dst} {operator} {} goto {:+}", insn.imm(), insn.offset())
                }
                SourceType::Reg => format!(
                    "if {dst} {operator} {} goto {:+}",
                    RegName(insn.src_reg()),
                    insn.offset()
                ),
            }
        }
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::super::disassemble;
    use super::*;

    fn text(opcode: u8, dst: u8, src: u8, offset: i16, imm: i32) -> String {
        let insn = Instruction::from_fields(opcode, dst, src, offset, imm).unwrap();
        disassemble(&insn).expect("renders")
    }

    #[test]
    fn reference_words() {
        let cases = [
            (0x850000000e000000, "call 14"),
            (0x8500000001000000, "call 1"),
            (0x8500000002000000, "call 2"),
            (0x5500090000000000, "if r0 != 0 goto +9"),
            (0x0500010000000000, "goto +1"),
        ];
        for (word, expected) in cases {
            assert_eq!(disassemble(&Instruction::new(word).unwrap()).unwrap(), expected);
        }
    }

    #[test]
    fn negative_offsets_keep_one_sign() {
        assert_eq!(text(0x05, 0, 0, -3, 0), "goto -3");
        assert_eq!(text(0x15, 1, 0, -1, 0), "if r1 == 0 goto -1");
    }

    #[test]
    fn conditional_operators() {
        let cases = [
            (0x15, "=="),
            (0x25, ">"),
            (0x35, ">="),
            (0x45, "&"),
            (0x55, "!="),
            (0x65, "s>"),
            (0x75, "s>="),
            (0xa5, "<"),
            (0xb5, "<="),
            (0xc5, "s<"),
            (0xd5, "s<="),
        ];
        for (opcode, operator) in cases {
            assert_eq!(
                text(opcode, 2, 0, 4, -7),
                format!("if r2 {operator} -7 goto +4")
            );
            assert_eq!(
                text(opcode | 0x08, 2, 3, 4, 0),
                format!("if r2 {operator} r3 goto +4")
            );
        }
    }

    #[test]
    fn jmp32_renders_like_jmp() {
        assert_eq!(text(0x16, 1, 0, 2, 5), "if r1 == 5 goto +2");
        assert_eq!(text(0x5e, 1, 2, 2, 0), "if r1 != r2 goto +2");
    }

    #[test]
    fn call_kinds() {
        assert_eq!(text(0x85, 0, 0, 0, 6), "call 6");
        assert_eq!(text(0x85, 0, 2, 0, 1234), "call 1234");
        assert_eq!(text(0x85, 0, 1, 12, -1), "call +12");
        assert_eq!(text(0x85, 0, 1, -12, -1), "call -12");
        let err = disassemble(&Instruction::from_fields(0x85, 0, 3, 0, 0).unwrap()).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn exit() {
        assert_eq!(text(0x95, 0, 0, 0, 0), "exit");
    }

    #[test]
    fn call_and_exit_outside_jmp_are_invalid() {
        for opcode in [0x86, 0x96] {
            let insn = Instruction::from_fields(opcode, 0, 0, 0, 1).unwrap();
            let err = disassemble(&insn).unwrap_err();
            assert!(matches!(err, DisasmError::InvalidOpcode { opcode: o, .. } if o == opcode));
        }
    }

    #[test]
    fn undefined_code_is_invalid() {
        let err = disassemble(&Instruction::from_fields(0xe5, 0, 0, 0, 0).unwrap()).unwrap_err();
        assert!(matches!(err, DisasmError::InvalidOpcode { opcode: 0xe5, .. }));
    }
}

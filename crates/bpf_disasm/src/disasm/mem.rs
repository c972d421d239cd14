//! LD / LDX / ST / STX rendering.

use core::fmt;

use super::DisasmResult;
use super::error::{DisasmError, UnsupportedEncoding};
use crate::bytecode::{
    AtomicOp, ImmSource, Instruction, LoadStoreOpcode, MemMode, MemSize, OpcodeClass, RegName,
};

pub(super) fn render(op: LoadStoreOpcode, insn: &Instruction) -> DisasmResult {
    let mode = op
        .mode()
        .ok_or_else(|| DisasmError::invalid(insn, "undefined memory mode"))?;

    match mode {
        MemMode::Imm => wide_immediate(insn),
        MemMode::Abs => Err(UnsupportedEncoding::LegacyAbsolute.into()),
        MemMode::Ind => Err(UnsupportedEncoding::LegacyIndirect.into()),
        MemMode::Mem => memory(op, insn),
        MemMode::MemSx => sign_extending_load(op, insn),
        MemMode::Atomic => atomic(op, insn),
    }
}

/// Memory operand `(reg + N)` with the offset sign folded into the operator.
struct Address {
    base: RegName,
    offset: i16,
}

impl Address {
    fn new(base: u8, offset: i16) -> Self {
        Self {
            base: RegName(base),
            offset,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operator = if self.offset < 0 { '-' } else { '+' };
        let magnitude = i32::from(self.offset).unsigned_abs();
        write!(f, "({} {} {})", self.base, operator, magnitude)
    }
}

fn wide_immediate(insn: &Instruction) -> DisasmResult {
    // IMM mode instructions cannot be built without their extension word
    let (Some(imm64), Some(next_imm)) = (insn.imm64(), insn.next_imm()) else {
        unreachable!("64-bit immediate load without extension word");
    };
    let source = insn
        .imm_source()
        .ok_or_else(|| DisasmError::invalid(insn, "undefined immediate source"))?;
    let dst = RegName(insn.dst_reg());
    let imm = insn.imm();

    let text = match source {
        ImmSource::Imm64 => format!("{dst} = {imm64} ll"),
        ImmSource::MapByFd => format!("{dst} = map_by_fd({imm})"),
        ImmSource::MapValueByFd => format!("{dst} = map_val(map_by_fd({imm})) + {next_imm}"),
        ImmSource::VariableAddr => format!("{dst} = var_addr({imm})"),
        ImmSource::CodeAddr => format!("{dst} = code_addr({imm})"),
        ImmSource::MapByIndex => format!("{dst} = map_by_idx({imm})"),
        ImmSource::MapValueByIndex => format!("{dst} = map_val(map_by_idx({imm})) + {next_imm}"),
    };
    Ok(text)
}

fn memory(op: LoadStoreOpcode, insn: &Instruction) -> DisasmResult {
    let size = op.size();
    let dst = RegName(insn.dst_reg());
    let src = RegName(insn.src_reg());

    let text = match op.class() {
        OpcodeClass::Stx => {
            let addr = Address::new(insn.dst_reg(), insn.offset());
            format!("*({size} *){addr} = {src}")
        }
        OpcodeClass::St => {
            let addr = Address::new(insn.dst_reg(), insn.offset());
            format!("*({size} *){addr} = {}", insn.imm())
        }
        OpcodeClass::Ldx => {
            let addr = Address::new(insn.src_reg(), insn.offset());
            format!("{dst} = *({size} *){addr}")
        }
        _ => return Err(DisasmError::invalid(insn, "memory mode outside load/store classes")),
    };
    Ok(text)
}

fn sign_extending_load(op: LoadStoreOpcode, insn: &Instruction) -> DisasmResult {
    if op.class() != OpcodeClass::Ldx {
        return Err(DisasmError::invalid(insn, "sign-extending mode outside LDX"));
    }
    let size = op.size().to_string();
    let signed = size.trim_start_matches('u');
    let addr = Address::new(insn.src_reg(), insn.offset());
    Ok(format!("{} = *(s{signed} *){addr}", RegName(insn.dst_reg())))
}

fn atomic(op: LoadStoreOpcode, insn: &Instruction) -> DisasmResult {
    let size = op.size();
    if matches!(size, MemSize::Byte | MemSize::Half) {
        return Err(DisasmError::invalid(insn, "atomic operation on byte or half word"));
    }
    let imm = insn.imm();
    let atomic_op = AtomicOp::from_imm(imm)
        .ok_or_else(|| DisasmError::invalid(insn, "undefined atomic operation"))?;
    if op.class() != OpcodeClass::Stx {
        return Err(DisasmError::invalid(insn, "atomic mode outside STX"));
    }

    let operator = match atomic_op {
        AtomicOp::Xchg => return Err(UnsupportedEncoding::AtomicXchg.into()),
        AtomicOp::Cmpxchg => return Err(UnsupportedEncoding::AtomicCmpxchg.into()),
        _ if AtomicOp::fetches(imm) => {
            return Err(UnsupportedEncoding::AtomicFetch(atomic_op).into());
        }
        other => other.operator().unwrap_or_default(),
    };

    let addr = Address::new(insn.dst_reg(), insn.offset());
    Ok(format!(
        "*({size} *){addr} {operator}= {}",
        RegName(insn.src_reg())
    ))
}

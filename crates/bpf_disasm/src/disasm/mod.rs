//! Disassembly Engine
//!
//! Renders one [`Instruction`] to its textual form, e.g.
//! `*(u32 *)(r10 - 4) = r1`. Dispatch happens on the [`TypedOpcode`] tag
//! picked at decode time; each family has its own renderer.
//!
//! Rendering is a pure function of the instruction, so any number of
//! threads may render instructions of a shared program at once.

mod alu;
pub mod error;
mod jmp;
mod mem;

pub use error::{DisasmError, UnsupportedEncoding};

use crate::bytecode::{Instruction, TypedOpcode};

/// Result of rendering a single instruction.
pub type DisasmResult = Result<String, DisasmError>;

/// Render an instruction.
pub fn disassemble(insn: &Instruction) -> DisasmResult {
    match insn.opcode() {
        TypedOpcode::Arithmetic(op) => alu::render(op, insn),
        TypedOpcode::Jump(op) => jmp::render(op, insn),
        TypedOpcode::LoadStore(op) => mem::render(op, insn),
    }
}

impl Instruction {
    /// Render this instruction. See [`disassemble`].
    #[inline]
    pub fn disassemble(&self) -> DisasmResult {
        disassemble(self)
    }
}

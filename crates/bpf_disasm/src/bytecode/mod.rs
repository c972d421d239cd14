//! eBPF Bytecode Model
//!
//! Field decode, opcode classification and the decoded instruction type.
//!
//! # Architecture
//!
//! - 11 registers (R0-R10)
//! - 64-bit operations with 32-bit variants
//! - 8-byte instruction format
//! - Wide instructions for 64-bit immediates

pub mod codec;
pub mod insn;
pub mod opcode;
pub mod registers;

pub use insn::{Instruction, InstructionError};
pub use opcode::{
    AluOp, ArithmeticOpcode, AtomicOp, ImmSource, JmpOp, JumpOpcode, LoadStoreOpcode, MemMode,
    MemSize, OpcodeClass, OpcodeType, SourceType, TypedOpcode,
};
pub use registers::{InvalidRegister, RegName, Register, RegisterFile, Regs};

//! Decoded BPF Instruction
//!
//! An [`Instruction`] is one 64-bit word, optionally followed by an
//! extension word. The extension is present only for 64-bit immediate
//! loads, where its immediate field carries the upper 32 bits of the value:
//!
//! ```text
//! basic:     | 0x18 | src | dst | 0 | imm (low 32 bits)       |
//! extension: | 0x00 |  0  |  0  | 0 | next_imm (high 32 bits) |
//! ```
//!
//! The opcode is classified once, when the instruction is built, and kept
//! as a [`TypedOpcode`] tag. Construction checks that the extension word is
//! present exactly when the opcode calls for one.

use core::fmt;

use thiserror::Error;

use super::codec;
use super::opcode::{ImmSource, OpcodeClass, TypedOpcode};
use super::registers::{Register, Regs};

/// Extension word present where the opcode forbids it, or missing where it
/// requires one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("opcode {opcode:#04x} needs an extension word")]
    MissingExtension { opcode: u8 },

    #[error("opcode {opcode:#04x} does not take an extension word")]
    UnexpectedExtension { opcode: u8 },
}

/// Single decoded instruction, 64 or 128 bits wide.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    basic: u64,
    extension: Option<u64>,
    opcode: TypedOpcode,
}

impl Instruction {
    /// Size of an instruction word in bytes
    pub const SIZE: usize = 8;

    /// Decode a single-word instruction.
    ///
    /// Fails for 64-bit immediate loads, which need [`Instruction::wide`].
    #[inline]
    pub const fn new(basic: u64) -> Result<Self, InstructionError> {
        Self::decode(basic, None)
    }

    /// Decode a two-word instruction.
    ///
    /// Fails unless the opcode is a 64-bit immediate load.
    #[inline]
    pub const fn wide(basic: u64, extension: u64) -> Result<Self, InstructionError> {
        Self::decode(basic, Some(extension))
    }

    /// Build a single-word instruction from its fields.
    #[inline]
    pub const fn from_fields(
        opcode: u8,
        dst: u8,
        src: u8,
        offset: i16,
        imm: i32,
    ) -> Result<Self, InstructionError> {
        Self::new(codec::pack(opcode, dst, src, offset, imm))
    }

    const fn decode(basic: u64, extension: Option<u64>) -> Result<Self, InstructionError> {
        let opcode = TypedOpcode::decode(codec::opcode(basic));
        match (opcode.requires_extension(), extension.is_some()) {
            (true, false) => Err(InstructionError::MissingExtension {
                opcode: codec::opcode(basic),
            }),
            (false, true) => Err(InstructionError::UnexpectedExtension {
                opcode: codec::opcode(basic),
            }),
            _ => Ok(Self {
                basic,
                extension,
                opcode,
            }),
        }
    }

    /// The first (or only) instruction word.
    #[inline]
    pub const fn basic(&self) -> u64 {
        self.basic
    }

    /// The extension word, if this is a 128-bit instruction.
    #[inline]
    pub const fn extension(&self) -> Option<u64> {
        self.extension
    }

    /// Check if an extension word is attached.
    #[inline]
    pub const fn is_extended(&self) -> bool {
        self.extension.is_some()
    }

    /// Check if the opcode calls for an extension word.
    #[inline]
    pub const fn needs_extension(&self) -> bool {
        self.opcode.requires_extension()
    }

    /// Number of slots the instruction occupies in a program.
    #[inline]
    pub const fn slot_count(&self) -> usize {
        if self.is_extended() { 2 } else { 1 }
    }

    /// Raw opcode byte.
    #[inline]
    pub const fn opcode_byte(&self) -> u8 {
        codec::opcode(self.basic)
    }

    /// The opcode classified at construction.
    #[inline]
    pub const fn opcode(&self) -> TypedOpcode {
        self.opcode
    }

    #[inline]
    pub const fn class(&self) -> OpcodeClass {
        self.opcode.class()
    }

    /// Packed register byte.
    #[inline]
    pub const fn regs(&self) -> Regs {
        Regs(codec::regs(self.basic))
    }

    /// Destination register field.
    #[inline]
    pub const fn dst_reg(&self) -> u8 {
        self.regs().dst_reg()
    }

    /// Source register field.
    #[inline]
    pub const fn src_reg(&self) -> u8 {
        self.regs().src_reg()
    }

    /// Destination register, if the field names one.
    #[inline]
    pub const fn dst(&self) -> Option<Register> {
        Register::from_raw(self.dst_reg())
    }

    /// Source register, if the field names one.
    #[inline]
    pub const fn src(&self) -> Option<Register> {
        Register::from_raw(self.src_reg())
    }

    /// Signed offset used with pointer arithmetic and jumps.
    #[inline]
    pub const fn offset(&self) -> i16 {
        codec::offset(self.basic)
    }

    /// Signed immediate of the basic word.
    #[inline]
    pub const fn imm(&self) -> i32 {
        codec::imm(self.basic)
    }

    /// Immediate of the extension word.
    #[inline]
    pub const fn next_imm(&self) -> Option<i32> {
        match self.extension {
            Some(word) => Some(codec::imm(word)),
            None => None,
        }
    }

    /// Full 64-bit immediate of an extended instruction.
    ///
    /// The extension's immediate forms the high half; the basic immediate
    /// is taken as unsigned for the low half.
    #[inline]
    pub const fn imm64(&self) -> Option<i64> {
        match self.next_imm() {
            Some(high) => Some(((high as i64) << 32) | (self.imm() as u32 as i64)),
            None => None,
        }
    }

    /// How a 64-bit immediate load interprets its immediate.
    ///
    /// The selector lives in the `src` register field.
    #[inline]
    pub const fn imm_source(&self) -> Option<ImmSource> {
        ImmSource::from_raw(self.src_reg())
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Instruction");
        s.field("opcode", &format_args!("{:#04x}", self.opcode_byte()))
            .field("dst", &self.dst_reg())
            .field("src", &self.src_reg())
            .field("offset", &self.offset())
            .field("imm", &self.imm());
        if let Some(next_imm) = self.next_imm() {
            s.field("next_imm", &next_imm);
        }
        s.finish()
    }
}

/// Raw words in hex: 16 digits, or two groups of 16 when extended.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extension {
            Some(extension) => write!(f, "{:016x} {:016x}", self.basic, extension),
            None => write!(f, "{:016x}", self.basic),
        }
    }
}

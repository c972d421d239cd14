//! Loaded BPF Program
//!
//! A [`Program`] is the ordered sequence of instruction slots produced by a
//! loader. A 64-bit immediate load takes two slots: the instruction itself
//! and its extension word. The extension slot keeps its index so that line
//! numbers match word offsets, but it is never rendered on its own.
//!
//! Programs are immutable once built and are `Send + Sync`, so one loaded
//! program can be shared by any number of readers or steppers.

mod error;
pub mod listing;
pub mod loader;

pub use error::{LoadError, LoadResult};
pub use listing::{Listing, ListingOptions, UnsupportedPolicy};
pub use loader::list_sections;

use crate::bytecode::Instruction;
use crate::disasm::DisasmResult;

/// One numbered position in a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Instruction, possibly extended
    Insn(Instruction),
    /// Extension word of the preceding instruction
    Extension(u64),
}

impl Slot {
    /// The instruction in this slot, if any.
    #[inline]
    pub const fn insn(&self) -> Option<&Instruction> {
        match self {
            Self::Insn(insn) => Some(insn),
            Self::Extension(_) => None,
        }
    }
}

/// Ordered, immutable sequence of instruction slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    slots: Vec<Slot>,
}

impl Program {
    /// All slots, extension words included.
    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Instruction at a slot index, `None` past the end or on an
    /// extension slot.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.slots.get(index).and_then(Slot::insn)
    }

    /// Instructions with their slot index, extension slots skipped.
    pub fn instructions(&self) -> impl Iterator<Item = (usize, &Instruction)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.insn().map(|insn| (index, insn)))
    }

    /// Number of instructions, not counting extension slots.
    pub fn insn_count(&self) -> usize {
        self.instructions().count()
    }

    /// Render every instruction.
    ///
    /// Each item carries its own result; an error on one instruction does
    /// not stop the iteration.
    pub fn disassemble(&self) -> impl Iterator<Item = Disassembled<'_>> + '_ {
        self.instructions().map(|(index, insn)| Disassembled {
            index,
            insn,
            text: insn.disassemble(),
        })
    }
}

/// Instructions are well formed by construction, so every extended
/// instruction brings its own extension slot along.
impl FromIterator<Instruction> for Program {
    fn from_iter<I: IntoIterator<Item = Instruction>>(iter: I) -> Self {
        let mut slots = Vec::new();
        for insn in iter {
            slots.push(Slot::Insn(insn));
            if let Some(extension) = insn.extension() {
                slots.push(Slot::Extension(extension));
            }
        }
        Self { slots }
    }
}

/// One rendered instruction of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembled<'a> {
    /// Slot index
    pub index: usize,
    pub insn: &'a Instruction,
    pub text: DisasmResult,
}

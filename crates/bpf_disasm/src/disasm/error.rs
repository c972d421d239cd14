//! Disassembly Errors
//!
//! Two kinds of failure, kept apart on purpose:
//!
//! - [`DisasmError::Unsupported`]: a defined encoding this disassembler does
//!   not render. A listing may print a placeholder and carry on.
//! - [`DisasmError::InvalidOpcode`]: an encoding that names nothing in the
//!   instruction set. The listing stops.

use thiserror::Error;

use crate::bytecode::{AtomicOp, Instruction};

/// Errors that can occur while rendering an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DisasmError {
    /// Defined but unimplemented encoding
    #[error("unsupported encoding: {0}")]
    Unsupported(UnsupportedEncoding),

    /// Encoding outside the instruction set
    #[error("invalid opcode {opcode:#04x} in {word:#018x}: {reason}")]
    InvalidOpcode {
        /// Instruction word
        word: u64,
        /// Opcode byte
        opcode: u8,
        /// What does not decode
        reason: &'static str,
    },
}

impl DisasmError {
    pub(crate) fn invalid(insn: &Instruction, reason: &'static str) -> Self {
        Self::InvalidOpcode {
            word: insn.basic(),
            opcode: insn.opcode_byte(),
            reason,
        }
    }

    /// Check if a caller may skip this instruction and keep going.
    #[inline]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

impl From<UnsupportedEncoding> for DisasmError {
    fn from(encoding: UnsupportedEncoding) -> Self {
        Self::Unsupported(encoding)
    }
}

/// Encodings that are part of the instruction set but not rendered.
///
/// The message doubles as the placeholder text of a listing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsupportedEncoding {
    #[error("legacy BPF packet access (absolute)")]
    LegacyAbsolute,

    #[error("legacy BPF packet access (indirect)")]
    LegacyIndirect,

    #[error("byte swap")]
    ByteSwap,

    #[error("atomic exchange")]
    AtomicXchg,

    #[error("atomic compare and exchange")]
    AtomicCmpxchg,

    #[error("atomic fetch-and-{0}")]
    AtomicFetch(AtomicOp),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverability() {
        assert!(DisasmError::from(UnsupportedEncoding::ByteSwap).is_recoverable());
        let err = DisasmError::invalid(&Instruction::new(0xe700000000000000).unwrap(), "undefined");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn messages() {
        assert_eq!(
            UnsupportedEncoding::LegacyAbsolute.to_string(),
            "legacy BPF packet access (absolute)"
        );
        assert_eq!(
            UnsupportedEncoding::AtomicFetch(AtomicOp::Add).to_string(),
            "atomic fetch-and-add"
        );
        let err = DisasmError::invalid(&Instruction::new(0xe700000000000000).unwrap(), "undefined");
        assert_eq!(
            err.to_string(),
            "invalid opcode 0xe7 in 0xe700000000000000: undefined"
        );
    }
}

//! BPF Program Execution
//!
//! A minimal stepper that runs the arithmetic subset of a program on a
//! register file. Jumps, calls, loads, stores and `exit` are stepped over
//! without effect, so a program only ever stops by running off its end.
//!
//! | Class | Effect |
//! |-------|--------|
//! | ALU / ALU64 | ADD, SUB, MUL, OR, AND, LSH, RSH, XOR, MOV applied |
//! | ALU / ALU64 (other codes) | none |
//! | JMP / JMP32 | none |
//! | LD / LDX / ST / STX | none |

mod stepper;

pub use stepper::{Stepper, StepperState};

use thiserror::Error;

use crate::bytecode::InvalidRegister;

/// Result of a single step.
pub type StepResult = Result<(), StepError>;

/// Errors that can occur while stepping a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepError {
    /// Program counter is at or past the last slot
    #[error("end of program")]
    EndOfProgram,

    /// Register field names no architected register (11-15)
    #[error("invalid register r{0}")]
    InvalidRegister(u8),
}

impl From<InvalidRegister> for StepError {
    fn from(err: InvalidRegister) -> Self {
        Self::InvalidRegister(err.0)
    }
}

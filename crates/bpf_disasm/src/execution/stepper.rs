//! Execution Stepper
//!
//! Single-step state machine over a shared [`Program`].
//!
//! ```text
//!  load_program        execute_step            counter past end
//! ───────────► Ready ───────────────► Running ─────────────────► Halted
//!                ▲                       │                           │
//!                └───────────────────────┴───── load_program ────────┘
//! ```
//!
//! The program is held behind an `Arc` and never mutated; the register file
//! and counter belong to the stepper alone.

use std::sync::Arc;

use super::{StepError, StepResult};
use crate::bytecode::{
    AluOp, ArithmeticOpcode, Instruction, Register, RegisterFile, SourceType, TypedOpcode,
};
use crate::program::{Program, Slot};

/// Stepper lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepperState {
    /// Program attached, nothing executed yet
    #[default]
    Ready,
    /// At least one instruction executed
    Running,
    /// A step ran into the end of the program
    Halted,
}

/// Arithmetic-only program stepper.
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    program: Arc<Program>,
    regs: RegisterFile,
    pc: usize,
    steps: u64,
    state: StepperState,
}

impl Stepper {
    /// Create a stepper with zeroed registers and an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stepper and attach a program.
    pub fn with_program(program: Arc<Program>) -> Self {
        let mut stepper = Self::new();
        stepper.load_program(program);
        stepper
    }

    /// Attach a program and rewind the counter.
    ///
    /// Registers keep their values.
    pub fn load_program(&mut self, program: Arc<Program>) {
        log::debug!("stepper: loaded program with {} slots", program.len());
        self.program = program;
        self.pc = 0;
        self.steps = 0;
        self.state = StepperState::Ready;
    }

    #[inline]
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    /// Slot index of the next instruction.
    #[inline]
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Instructions executed since the program was loaded.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    pub fn state(&self) -> StepperState {
        self.state
    }

    #[inline]
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Mutable access to the registers, e.g. to seed arguments.
    #[inline]
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// Peek at the instruction under the counter.
    pub fn next_instruction(&self) -> Result<&Instruction, StepError> {
        match self.program.slots().get(self.pc) {
            Some(Slot::Insn(insn)) => Ok(insn),
            Some(Slot::Extension(_)) => unreachable!("program counter on an extension slot"),
            None => Err(StepError::EndOfProgram),
        }
    }

    /// Execute the instruction under the counter and advance past it.
    ///
    /// On error nothing changes except the state, which becomes
    /// [`StepperState::Halted`] at the end of the program.
    pub fn execute_step(&mut self) -> StepResult {
        let insn = match self.next_instruction() {
            Ok(insn) => *insn,
            Err(err) => {
                self.state = StepperState::Halted;
                return Err(err);
            }
        };

        match insn.opcode() {
            TypedOpcode::Arithmetic(op) => self.execute_alu(op, &insn)?,
            TypedOpcode::Jump(_) | TypedOpcode::LoadStore(_) => {
                log::trace!("pc {}: {} stepped over", self.pc, insn.class());
            }
        }

        self.pc += insn.slot_count();
        self.steps += 1;
        self.state = StepperState::Running;
        Ok(())
    }

    /// Step until the end of the program.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64, StepError> {
        let start = self.steps;
        loop {
            match self.execute_step() {
                Ok(()) => {}
                Err(StepError::EndOfProgram) => return Ok(self.steps - start),
                Err(err) => return Err(err),
            }
        }
    }

    fn execute_alu(&mut self, op: ArithmeticOpcode, insn: &Instruction) -> StepResult {
        let Some(code) = op.code() else {
            return Ok(());
        };
        if !is_executed(code) {
            log::trace!("pc {}: alu op {code} stepped over", self.pc);
            return Ok(());
        }

        let dst = Register::try_from(insn.dst_reg())?;
        let src_val = match op.source() {
            SourceType::Imm => i64::from(insn.imm()),
            SourceType::Reg => self.regs.get(Register::try_from(insn.src_reg())?),
        };
        let dst_val = self.regs.get(dst);

        let result = if op.is_64bit() {
            alu64(code, dst_val as u64, src_val as u64)
        } else {
            // Zero-extend 32-bit results
            u64::from(alu32(code, dst_val as u32, src_val as u32))
        };

        log::trace!("pc {}: {dst} = {:#x}", self.pc, result);
        self.regs.set(dst, result as i64);
        Ok(())
    }
}

const fn is_executed(code: AluOp) -> bool {
    matches!(
        code,
        AluOp::Add
            | AluOp::Sub
            | AluOp::Mul
            | AluOp::Or
            | AluOp::And
            | AluOp::Lsh
            | AluOp::Rsh
            | AluOp::Xor
            | AluOp::Mov
    )
}

fn alu64(code: AluOp, dst: u64, src: u64) -> u64 {
    match code {
        AluOp::Add => dst.wrapping_add(src),
        AluOp::Sub => dst.wrapping_sub(src),
        AluOp::Mul => dst.wrapping_mul(src),
        AluOp::Or => dst | src,
        AluOp::And => dst & src,
        AluOp::Lsh => dst << (src & 0x3f),
        AluOp::Rsh => dst >> (src & 0x3f),
        AluOp::Xor => dst ^ src,
        AluOp::Mov => src,
        _ => dst,
    }
}

fn alu32(code: AluOp, dst: u32, src: u32) -> u32 {
    match code {
        AluOp::Add => dst.wrapping_add(src),
        AluOp::Sub => dst.wrapping_sub(src),
        AluOp::Mul => dst.wrapping_mul(src),
        AluOp::Or => dst | src,
        AluOp::And => dst & src,
        AluOp::Lsh => dst << (src & 0x1f),
        AluOp::Rsh => dst >> (src & 0x1f),
        AluOp::Xor => dst ^ src,
        AluOp::Mov => src,
        _ => dst,
    }
}

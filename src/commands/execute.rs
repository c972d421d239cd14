//! Execute command.

use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use bpf_disasm::disasm::DisasmError;
use bpf_disasm::execution::{StepError, Stepper};
use bpf_disasm::program::Program;
use colored::Colorize;

/// Step through a program, printing each instruction and the registers
/// after it.
pub fn execute(program: Arc<Program>) -> Result<()> {
    let width = program.len().saturating_sub(1).to_string().len();
    let mut stepper = Stepper::with_program(program);
    let mut out = BufWriter::new(io::stdout().lock());

    loop {
        let pc = stepper.pc();
        let insn = match stepper.next_instruction() {
            Ok(insn) => *insn,
            Err(StepError::EndOfProgram) => break,
            Err(err) => return Err(err.into()),
        };

        let text = match insn.disassemble() {
            Ok(text) => text,
            Err(DisasmError::Unsupported(encoding)) => encoding.to_string(),
            Err(err) => {
                out.flush()?;
                return Err(err).with_context(|| format!("Failed to decode slot {pc}"));
            }
        };
        writeln!(out, "{} {pc:0width$}: {text}", "=>".cyan())?;

        if let Err(err) = stepper.execute_step() {
            out.flush()?;
            return Err(err).with_context(|| format!("Failed to execute slot {pc}"));
        }
        writeln!(out, "{}", stepper.registers())?;
    }

    out.flush()?;
    log::debug!("executed {} instructions", stepper.steps());
    Ok(())
}

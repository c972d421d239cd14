//! CLI command implementations.

pub mod disassemble;
pub mod execute;

use std::fs;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use bpf_disasm::program::{Program, list_sections};
use colored::Colorize;

use crate::config::{Config, InputFormat};

/// Load the program and run the selected command.
pub fn run(config: &Config, verbose: bool) -> Result<()> {
    let program = load_program(config)?;

    if verbose {
        eprintln!(
            "{} {} ({} slots, {} instructions)",
            "Loaded".cyan().bold(),
            config.file.display(),
            program.len(),
            program.insn_count()
        );
    }

    if config.execute {
        execute::execute(Arc::new(program))
    } else {
        disassemble::disassemble(&program, &config.listing)
    }
}

/// Load a program in the configured format.
///
/// ELF input without a section name fails, listing the sections it has.
pub fn load_program(config: &Config) -> Result<Program> {
    let path = &config.file;
    match (config.format, config.section.as_deref()) {
        (InputFormat::Ascii, _) => Program::from_ascii_file(path)
            .with_context(|| format!("Failed to load ASCII program: {}", path.display())),
        (InputFormat::Elf, Some(section)) => Program::from_elf_file(path, section)
            .with_context(|| format!("Failed to load section {section} of {}", path.display())),
        (InputFormat::Elf, None) => {
            let data =
                fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
            let sections = list_sections(&data)
                .with_context(|| format!("Failed to parse ELF file: {}", path.display()))?;
            bail!(
                "ELF input needs a section name, available sections: {}",
                sections.join(", ")
            )
        }
    }
}

/// Check if an error comes from writing to a closed pipe.
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_pipe_is_detected_through_context() {
        let err = anyhow::Error::from(io::Error::from(io::ErrorKind::BrokenPipe))
            .context("Failed to write output");
        assert!(is_broken_pipe(&err));

        let err = anyhow::anyhow!("section not found");
        assert!(!is_broken_pipe(&err));
    }
}

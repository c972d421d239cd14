//! Disassemble command.

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use bpf_disasm::program::{ListingOptions, Program};

/// Print the listing of a program to stdout.
///
/// Lines before a fatal instruction are printed before the error is
/// returned.
pub fn disassemble(program: &Program, options: &ListingOptions) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());

    for line in program.listing_lines(options) {
        match line {
            Ok(line) => writeln!(out, "{line}")?,
            Err(err) => {
                out.flush()?;
                return Err(err).context("Disassembly stopped");
            }
        }
    }

    out.flush()?;
    Ok(())
}

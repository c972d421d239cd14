//! Program Listing
//!
//! Formats a program one line per instruction:
//!
//! ```text
//! 07: 1801000000000000 0000000000000000 r1 = 0 ll
//! 09: 8500000001000000 call 1
//! ^^  ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ ^^^^^^^^^
//! |   raw words (optional)              rendered text
//! slot index (optional, zero-padded)
//! ```
//!
//! Extension slots produce no line but keep their index, so numbering
//! follows word offsets. What each line contains is decided by an explicit
//! [`ListingOptions`] value.

use super::{Program, Slot};
use crate::bytecode::Instruction;
use crate::disasm::DisasmError;

/// What to do with an instruction that decodes but cannot be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Print a description of the encoding in place of the text
    #[default]
    Placeholder,
    /// Stop the listing with the error
    Abort,
}

/// Listing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    /// Prefix each line with its slot index
    pub line_numbers: bool,
    /// Prefix each line with the raw instruction words
    pub raw_bytes: bool,
    pub on_unsupported: UnsupportedPolicy,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            line_numbers: true,
            raw_bytes: true,
            on_unsupported: UnsupportedPolicy::default(),
        }
    }
}

/// Iterator over the lines of a program listing.
///
/// Yields at most one error, after which it is exhausted. Invalid opcodes
/// always end the listing; unsupported encodings end it only under
/// [`UnsupportedPolicy::Abort`].
#[derive(Debug)]
pub struct Listing<'a> {
    slots: core::iter::Enumerate<core::slice::Iter<'a, Slot>>,
    width: usize,
    options: ListingOptions,
    failed: bool,
}

impl<'a> Listing<'a> {
    fn new(program: &'a Program, options: ListingOptions) -> Self {
        let width = program.len().saturating_sub(1).to_string().len();
        Self {
            slots: program.slots().iter().enumerate(),
            width,
            options,
            failed: false,
        }
    }

    fn line(&self, index: usize, insn: &Instruction) -> Result<String, DisasmError> {
        let text = match insn.disassemble() {
            Ok(text) => text,
            Err(DisasmError::Unsupported(encoding))
                if self.options.on_unsupported == UnsupportedPolicy::Placeholder =>
            {
                log::debug!("slot {index}: {encoding}, printing placeholder");
                encoding.to_string()
            }
            Err(err) => return Err(err),
        };

        let mut line = String::new();
        if self.options.line_numbers {
            line.push_str(&format!("{index:0width$}: ", width = self.width));
        }
        if self.options.raw_bytes {
            line.push_str(&format!("{insn} "));
        }
        line.push_str(&text);
        Ok(line)
    }
}

impl Iterator for Listing<'_> {
    type Item = Result<String, DisasmError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (index, insn) = self
            .slots
            .by_ref()
            .find_map(|(index, slot)| slot.insn().map(|insn| (index, insn)))?;

        let line = self.line(index, insn);
        if let Err(err) = &line {
            log::debug!("listing stopped at slot {index}: {err}");
            self.failed = true;
        }
        Some(line)
    }
}

impl Program {
    /// Lazily format the listing.
    pub fn listing_lines(&self, options: &ListingOptions) -> Listing<'_> {
        Listing::new(self, *options)
    }

    /// Format the whole listing, failing on the first error.
    pub fn listing(&self, options: &ListingOptions) -> Result<Vec<String>, DisasmError> {
        self.listing_lines(options).collect()
    }
}

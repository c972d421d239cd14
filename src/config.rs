//! CLI configuration.

use std::path::PathBuf;

use bpf_disasm::program::{ListingOptions, UnsupportedPolicy};
use clap::ValueEnum;

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// ELF object; words are read big-endian from the named section
    Elf,
    /// Hex dump of 16-digit words, whitespace ignored
    Ascii,
}

/// Everything a command needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub file: PathBuf,
    pub section: Option<String>,
    pub format: InputFormat,
    pub listing: ListingOptions,
    pub execute: bool,
}

/// Map the display flags to listing options.
pub fn listing_options(bytes: bool, number: bool, strict: bool) -> ListingOptions {
    ListingOptions {
        line_numbers: number,
        raw_bytes: bytes,
        on_unsupported: if strict {
            UnsupportedPolicy::Abort
        } else {
            UnsupportedPolicy::Placeholder
        },
    }
}

//! Program Loading Errors

use std::io;

use thiserror::Error;

/// Errors that can occur while loading a program.
///
/// Loading errors always surface to the caller; nothing here is skipped
/// or patched over.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input length is not a whole number of words
    #[error("input length {len} is not a multiple of {width}")]
    MalformedEncoding { len: usize, width: usize },

    /// 64-bit immediate load at the end of the stream
    #[error("instruction {opcode:#04x} at slot {slot} is missing its extension word")]
    MissingExtensionWord { slot: usize, opcode: u8 },

    /// ASCII word that is not 16 hex digits
    #[error("invalid hex word {text:?} at offset {offset}")]
    InvalidHexWord { offset: usize, text: String },

    /// Requested ELF section does not exist
    #[error("section {section:?} not found, available sections: {}", .available.join(", "))]
    SectionNotFound {
        section: String,
        available: Vec<String>,
    },

    #[error("malformed ELF file: {0}")]
    Elf(#[from] elf::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

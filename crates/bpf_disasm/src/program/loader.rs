//! Program Loaders
//!
//! Every input format is reduced to a stream of 64-bit words, which is then
//! scanned left to right to attach extension words to the instructions that
//! need them. The pairing has to finish before any rendering starts, since
//! whether a word is an extension depends on the word before it.
//!
//! # Input Formats
//!
//! | Format | Unit | Byte order |
//! |--------|------|------------|
//! | Word stream | `u64` | n/a |
//! | Raw bytes / ELF section | 8 bytes | big-endian |
//! | ASCII | 16 hex digits, whitespace ignored | text |

use std::fs;
use std::path::Path;

use elf::ElfBytes;
use elf::endian::AnyEndian;

use super::{LoadError, LoadResult, Program, Slot};
use crate::bytecode::{Instruction, codec};

/// Hex digits per ASCII word.
const ASCII_WORD_WIDTH: usize = 16;

impl Program {
    /// Build a program from instruction words.
    pub fn from_words<I>(words: I) -> LoadResult<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        pair_words(words.into_iter().map(Ok))
    }

    /// Build a program from big-endian instruction bytes.
    pub fn from_be_bytes(data: &[u8]) -> LoadResult<Self> {
        if data.len() % Instruction::SIZE != 0 {
            return Err(LoadError::MalformedEncoding {
                len: data.len(),
                width: Instruction::SIZE,
            });
        }

        let words = data.chunks_exact(Instruction::SIZE).map(|chunk| {
            let mut bytes = [0u8; Instruction::SIZE];
            bytes.copy_from_slice(chunk);
            Ok(u64::from_be_bytes(bytes))
        });
        pair_words(words)
    }

    /// Build a program from ASCII hex text.
    ///
    /// Whitespace is stripped first; the rest must be whole 16-digit words.
    pub fn from_ascii(text: &[u8]) -> LoadResult<Self> {
        let digits: Vec<u8> = text
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();

        if digits.len() % ASCII_WORD_WIDTH != 0 {
            return Err(LoadError::MalformedEncoding {
                len: digits.len(),
                width: ASCII_WORD_WIDTH,
            });
        }

        let words = digits
            .chunks_exact(ASCII_WORD_WIDTH)
            .enumerate()
            .map(|(i, chunk)| parse_hex_word(i * ASCII_WORD_WIDTH, chunk));
        pair_words(words)
    }

    /// Read and load an ASCII hex file.
    pub fn from_ascii_file(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        log::debug!("loading ASCII program from {}", path.display());
        Self::from_ascii(&fs::read(path)?)
    }

    /// Load the named section of an ELF image.
    pub fn from_elf(data: &[u8], section: &str) -> LoadResult<Self> {
        let file = ElfBytes::<AnyEndian>::minimal_parse(data)?;

        let Some(header) = file.section_header_by_name(section)? else {
            return Err(LoadError::SectionNotFound {
                section: section.to_string(),
                available: section_names(&file)?,
            });
        };

        let (bytes, compression) = file.section_data(&header)?;
        if compression.is_some() {
            log::warn!("section {section} is compressed, decoding raw bytes");
        }
        log::debug!("section {section}: {} bytes", bytes.len());
        Self::from_be_bytes(bytes)
    }

    /// Read an ELF file and load one of its sections.
    pub fn from_elf_file(path: impl AsRef<Path>, section: &str) -> LoadResult<Self> {
        let path = path.as_ref();
        log::debug!("loading section {section} from {}", path.display());
        Self::from_elf(&fs::read(path)?, section)
    }
}

/// Names of all sections of an ELF image, in header order.
///
/// The unnamed null section is left out.
pub fn list_sections(data: &[u8]) -> LoadResult<Vec<String>> {
    let file = ElfBytes::<AnyEndian>::minimal_parse(data)?;
    section_names(&file)
}

fn section_names(file: &ElfBytes<'_, AnyEndian>) -> LoadResult<Vec<String>> {
    let (headers, strtab) = file.section_headers_with_strtab()?;
    let (Some(headers), Some(strtab)) = (headers, strtab) else {
        return Ok(Vec::new());
    };

    let mut names = Vec::new();
    for header in headers.iter() {
        let name = strtab.get(header.sh_name as usize)?;
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

fn parse_hex_word(offset: usize, chunk: &[u8]) -> LoadResult<u64> {
    let invalid = || LoadError::InvalidHexWord {
        offset,
        text: String::from_utf8_lossy(chunk).into_owned(),
    };

    // from_str_radix would also take a leading '+'
    if !chunk.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid());
    }
    let text = std::str::from_utf8(chunk).map_err(|_| invalid())?;
    u64::from_str_radix(text, 16).map_err(|_| invalid())
}

/// Attach extension words, scanning strictly left to right.
fn pair_words<I>(words: I) -> LoadResult<Program>
where
    I: IntoIterator<Item = LoadResult<u64>>,
{
    let mut words = words.into_iter();
    let mut slots = Vec::new();

    while let Some(word) = words.next() {
        let basic = word?;
        if let Ok(insn) = Instruction::new(basic) {
            slots.push(Slot::Insn(insn));
            continue;
        }

        let slot = slots.len();
        let missing = || LoadError::MissingExtensionWord {
            slot,
            opcode: codec::opcode(basic),
        };
        let extension = match words.next() {
            Some(Ok(extension)) => extension,
            Some(Err(err)) => {
                log::debug!("extension word for slot {slot} unreadable: {err}");
                return Err(missing());
            }
            None => return Err(missing()),
        };

        log::trace!("slot {slot}: paired {basic:016x} with extension {extension:016x}");
        let insn = Instruction::wide(basic, extension).map_err(|_| missing())?;
        slots.push(Slot::Insn(insn));
        slots.push(Slot::Extension(extension));
    }

    log::debug!("loaded program with {} slots", slots.len());
    Ok(Program { slots })
}

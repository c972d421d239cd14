//! Loader Tests
//!
//! ELF images are assembled by hand: a null section, a code section and the
//! section name table, little-endian ELF64. Files for the path-based
//! loaders are written below cargo's per-target scratch directory.

use std::fs;
use std::path::PathBuf;

use bpf_disasm::bytecode::Instruction;
use bpf_disasm::program::{ListingOptions, LoadError, Program, list_sections};

const EHDR_SIZE: usize = 64;
const SHDR_SIZE: usize = 64;

const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;
const SHF_ALLOC_EXECINSTR: u64 = 0x6;

/// Section header fields in file order.
struct SectionHeader {
    name: u32,
    kind: u32,
    flags: u64,
    offset: u64,
    size: u64,
    align: u64,
}

impl SectionHeader {
    const NULL: Self = Self {
        name: 0,
        kind: 0,
        flags: 0,
        offset: 0,
        size: 0,
        align: 0,
    };

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.name.to_le_bytes());
        out.extend_from_slice(&self.kind.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes()); // sh_addr
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // sh_link
        out.extend_from_slice(&0u32.to_le_bytes()); // sh_info
        out.extend_from_slice(&self.align.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes()); // sh_entsize
    }
}

/// Build an ELF64 object with one code section holding `code`.
fn elf_image(section: &str, code: &[u8]) -> Vec<u8> {
    // "\0<section>\0.shstrtab\0"
    let mut shstrtab = vec![0u8];
    let code_name = shstrtab.len() as u32;
    shstrtab.extend_from_slice(section.as_bytes());
    shstrtab.push(0);
    let strtab_name = shstrtab.len() as u32;
    shstrtab.extend_from_slice(b".shstrtab\0");

    let code_offset = EHDR_SIZE;
    let strtab_offset = code_offset + code.len();
    let shoff = (strtab_offset + shstrtab.len()).next_multiple_of(8);

    let mut image = Vec::new();
    image.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
    image.extend_from_slice(&[0; 8]);
    image.extend_from_slice(&1u16.to_le_bytes()); // e_type: REL
    image.extend_from_slice(&247u16.to_le_bytes()); // e_machine: BPF
    image.extend_from_slice(&1u32.to_le_bytes()); // e_version
    image.extend_from_slice(&0u64.to_le_bytes()); // e_entry
    image.extend_from_slice(&0u64.to_le_bytes()); // e_phoff
    image.extend_from_slice(&(shoff as u64).to_le_bytes());
    image.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    image.extend_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
    image.extend_from_slice(&56u16.to_le_bytes()); // e_phentsize
    image.extend_from_slice(&0u16.to_le_bytes()); // e_phnum
    image.extend_from_slice(&(SHDR_SIZE as u16).to_le_bytes());
    image.extend_from_slice(&3u16.to_le_bytes()); // e_shnum
    image.extend_from_slice(&2u16.to_le_bytes()); // e_shstrndx
    assert_eq!(image.len(), EHDR_SIZE);

    image.extend_from_slice(code);
    image.extend_from_slice(&shstrtab);
    image.resize(shoff, 0);

    SectionHeader::NULL.write(&mut image);
    SectionHeader {
        name: code_name,
        kind: SHT_PROGBITS,
        flags: SHF_ALLOC_EXECINSTR,
        offset: code_offset as u64,
        size: code.len() as u64,
        align: 8,
    }
    .write(&mut image);
    SectionHeader {
        name: strtab_name,
        kind: SHT_STRTAB,
        flags: 0,
        offset: strtab_offset as u64,
        size: shstrtab.len() as u64,
        align: 1,
    }
    .write(&mut image);

    image
}

fn be_bytes(words: &[u64]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

const SAMPLE: [u64; 4] = [
    0xb701000000000000, // r1 = 0
    0x1801000000000000, // r1 = 0 ll
    0x0000000000000000, //   extension
    0x9500000000000000, // exit
];

#[test]
fn elf_section_loads() {
    let image = elf_image("xdp", &be_bytes(&SAMPLE));
    let program = Program::from_elf(&image, "xdp").expect("load");

    assert_eq!(program.len(), 4);
    assert_eq!(program.insn_count(), 3);
    assert_eq!(program.get(1), Some(&Instruction::wide(0x1801000000000000, 0).unwrap()));

    let options = ListingOptions {
        raw_bytes: false,
        ..Default::default()
    };
    assert_eq!(
        program.listing(&options).unwrap(),
        ["0: r1 = 0", "1: r1 = 0 ll", "3: exit"]
    );
}

#[test]
fn elf_sections_are_listed() {
    let image = elf_image(".text", &be_bytes(&SAMPLE));
    assert_eq!(list_sections(&image).unwrap(), [".text", ".shstrtab"]);
}

#[test]
fn elf_missing_section_names_alternatives() {
    let image = elf_image(".text", &be_bytes(&SAMPLE));
    match Program::from_elf(&image, "socket") {
        Err(LoadError::SectionNotFound { section, available }) => {
            assert_eq!(section, "socket");
            assert_eq!(available, [".text", ".shstrtab"]);
        }
        other => panic!("expected SectionNotFound, got {other:?}"),
    }
}

#[test]
fn elf_section_length_must_be_word_multiple() {
    let mut code = be_bytes(&SAMPLE);
    code.truncate(30);
    let image = elf_image(".text", &code);
    let err = Program::from_elf(&image, ".text").unwrap_err();
    assert!(matches!(err, LoadError::MalformedEncoding { len: 30, width: 8 }));
}

#[test]
fn elf_section_missing_extension() {
    let image = elf_image(".text", &be_bytes(&SAMPLE[..2]));
    let err = Program::from_elf(&image, ".text").unwrap_err();
    assert!(matches!(
        err,
        LoadError::MissingExtensionWord { slot: 1, opcode: 0x18 }
    ));
}

#[test]
fn elf_file_on_disk() {
    let path = scratch_file("loaders_sample.o", &elf_image(".text", &be_bytes(&SAMPLE)));
    let program = Program::from_elf_file(&path, ".text").expect("load");
    assert_eq!(program.insn_count(), 3);
}

#[test]
fn ascii_file_on_disk() {
    let text = "b701000000000000\n1801000000000000\n0000000000000000\n9500000000000000\n";
    let path = scratch_file("loaders_sample.txt", text.as_bytes());
    let program = Program::from_ascii_file(&path).expect("load");
    assert_eq!(program, Program::from_words(SAMPLE).unwrap());
}

#[test]
fn ascii_file_length_check() {
    let path = scratch_file("loaders_short.txt", b"b701000000000000\n95000000\n");
    let err = Program::from_ascii_file(&path).unwrap_err();
    assert!(matches!(err, LoadError::MalformedEncoding { len: 24, width: 16 }));
}

#[test]
fn missing_file_is_io_error() {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("does-not-exist.txt");
    let err = Program::from_ascii_file(&path).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn elf_and_ascii_agree() {
    let image = elf_image(".text", &be_bytes(&SAMPLE));
    let ascii: String = SAMPLE.iter().map(|w| format!("{w:016x}\n")).collect();
    assert_eq!(
        Program::from_elf(&image, ".text").unwrap(),
        Program::from_ascii(ascii.as_bytes()).unwrap()
    );
}

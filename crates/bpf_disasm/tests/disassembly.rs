//! End-to-end disassembly of a small program that looks up and updates a
//! map keyed by the current pid. Every line of the listing is checked.

use std::sync::Arc;
use std::thread;

use bpf_disasm::bytecode::{AtomicOp, Instruction, OpcodeClass, TypedOpcode};
use bpf_disasm::disasm::{DisasmError, UnsupportedEncoding, disassemble};
use bpf_disasm::program::{ListingOptions, Program, UnsupportedPolicy};

const PROGRAM: &str = "
    b701000000000000
    631afcff00000000
    850000000e000000
    bf06000000000000
    636af8ff00000000
    bfa2000000000000
    07020000fcffffff
    1801000000000000
    0000000000000000
    8500000001000000
    5500090000000000
    bfa3000000000000
    07030000f8ffffff
    b704000000000000
    8500000002000000
    0500010000000000
    0701000044332211
";

const EXPECTED: [&str; 16] = [
    "00: b701000000000000 r1 = 0",
    "01: 631afcff00000000 *(u32 *)(r10 - 4) = r1",
    "02: 850000000e000000 call 14",
    "03: bf06000000000000 r6 = r0",
    "04: 636af8ff00000000 *(u32 *)(r10 - 8) = r6",
    "05: bfa2000000000000 r2 = r10",
    "06: 07020000fcffffff r2 += -4",
    "07: 1801000000000000 0000000000000000 r1 = 0 ll",
    "09: 8500000001000000 call 1",
    "10: 5500090000000000 if r0 != 0 goto +9",
    "11: bfa3000000000000 r3 = r10",
    "12: 07030000f8ffffff r3 += -8",
    "13: b704000000000000 r4 = 0",
    "14: 8500000002000000 call 2",
    "15: 0500010000000000 goto +1",
    "16: 0701000044332211 r1 += 287454020",
];

fn load() -> Program {
    Program::from_ascii(PROGRAM.as_bytes()).expect("valid program")
}

#[test]
fn full_listing() {
    let lines = load().listing(&ListingOptions::default()).unwrap();
    assert_eq!(lines, EXPECTED);
}

#[test]
fn one_extended_instruction_drops_one_line() {
    let program = load();
    assert_eq!(program.len(), 17);

    let lines = program.listing(&ListingOptions::default()).unwrap();
    assert_eq!(lines.len(), program.len() - 1);
}

#[test]
fn listing_without_prefixes() {
    let options = ListingOptions {
        line_numbers: false,
        raw_bytes: false,
        on_unsupported: UnsupportedPolicy::Placeholder,
    };
    let lines = load().listing(&options).unwrap();
    assert_eq!(lines[7], "r1 = 0 ll");
    assert_eq!(lines[8], "call 1");
}

#[test]
fn decoding_is_pure() {
    for (_, insn) in load().instructions() {
        let again = match insn.extension() {
            Some(ext) => Instruction::wide(insn.basic(), ext),
            None => Instruction::new(insn.basic()),
        }
        .unwrap();
        assert_eq!(*insn, again);
        assert_eq!(disassemble(insn), disassemble(&again));
    }
}

#[test]
fn opcode_view_follows_class() {
    for (_, insn) in load().instructions() {
        let class = insn.class();
        match insn.opcode() {
            TypedOpcode::Arithmetic(_) => assert!(class.is_alu()),
            TypedOpcode::Jump(_) => assert!(class.is_jump()),
            TypedOpcode::LoadStore(_) => assert!(matches!(
                class,
                OpcodeClass::Ld | OpcodeClass::Ldx | OpcodeClass::St | OpcodeClass::Stx
            )),
        }
    }
}

#[test]
fn unsupported_lines_keep_the_listing_going() {
    let program = Program::from_words([
        0xb701000000000000, // r1 = 0
        0x2000000000000000, // ld abs
        0x4000000000000000, // ld ind
        0xdb12000001000000, // atomic fetch-and-add
        0xdc01000020000000, // byte swap
        0x9500000000000000, // exit
    ])
    .unwrap();

    let results: Vec<_> = program.disassemble().map(|d| d.text).collect();
    let expected: [Result<String, DisasmError>; 4] = [
        Err(UnsupportedEncoding::LegacyAbsolute.into()),
        Err(UnsupportedEncoding::LegacyIndirect.into()),
        Err(UnsupportedEncoding::AtomicFetch(AtomicOp::Add).into()),
        Err(UnsupportedEncoding::ByteSwap.into()),
    ];
    assert_eq!(results[1..5], expected);

    let lines = program.listing(&ListingOptions::default()).unwrap();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "1: 2000000000000000 legacy BPF packet access (absolute)");
    assert_eq!(lines[3], "3: db12000001000000 atomic fetch-and-add");
    assert_eq!(lines[5], "5: 9500000000000000 exit");
}

#[test]
fn strict_listing_stops_at_unsupported() {
    let program = Program::from_words([0x2000000000000000, 0x9500000000000000]).unwrap();
    let options = ListingOptions {
        on_unsupported: UnsupportedPolicy::Abort,
        ..Default::default()
    };
    assert_eq!(
        program.listing(&options),
        Err(DisasmError::Unsupported(UnsupportedEncoding::LegacyAbsolute))
    );
}

#[test]
fn concurrent_readers_see_the_same_text() {
    let program = Arc::new(load());
    let expected = program.listing(&ListingOptions::default()).unwrap();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let program = Arc::clone(&program);
                scope.spawn(move || program.listing(&ListingOptions::default()).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

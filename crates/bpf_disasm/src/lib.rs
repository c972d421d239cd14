//! eBPF Bytecode Decoder and Disassembler
//!
//! This crate turns raw eBPF instruction words into readable text and can
//! step through the arithmetic subset of a program on a register file.
//!
//! # Modules
//!
//! - [`bytecode`] - Instruction word layout, opcode classes and registers
//! - [`disasm`] - Per-instruction text rendering
//! - [`program`] - Loaded programs, word stream / ASCII / ELF loaders, listings
//! - [`execution`] - Arithmetic-only execution stepper
//!
//! # Quick Start
//!
//! ```
//! use bpf_disasm::program::{ListingOptions, Program};
//!
//! let program = Program::from_words([0xb701000000000000, 0x0701000044332211]).unwrap();
//! let lines = program.listing(&ListingOptions::default()).unwrap();
//! assert_eq!(lines[0], "0: b701000000000000 r1 = 0");
//! assert_eq!(lines[1], "1: 0701000044332211 r1 += 287454020");
//! ```
//!
//! # Concurrency
//!
//! A [`Program`](program::Program) is immutable once loaded and can be
//! shared behind an `Arc` by any number of readers. Each
//! [`Stepper`](execution::Stepper) owns its own registers and counter.

pub mod bytecode;
pub mod disasm;
pub mod execution;
pub mod program;

//! eBPF Bytecode Disassembler
//!
//! Prints one line per instruction of an eBPF program read from an ELF
//! section or an ASCII hex dump, or steps through its arithmetic.

mod commands;
mod config;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use env_logger::Env;

use config::{Config, InputFormat};

#[derive(Parser)]
#[command(name = "dbpf")]
#[command(version)]
#[command(about = "Disassemble eBPF bytecode", long_about = None)]
struct Cli {
    /// ELF object or ASCII hex dump
    file: PathBuf,

    /// ELF section holding the program
    section: Option<String>,

    /// Input format
    #[arg(short = 't', long = "type", value_enum, default_value_t = InputFormat::Elf)]
    format: InputFormat,

    /// Print the raw instruction words
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    bytes: bool,

    /// Print slot numbers
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true"
    )]
    number: bool,

    /// Stop at the first unsupported instruction instead of printing a placeholder
    #[arg(long)]
    strict: bool,

    /// Step through the program, dumping registers after each instruction
    #[arg(short, long)]
    execute: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            listing: config::listing_options(self.bytes, self.number, self.strict),
            file: self.file,
            section: self.section,
            format: self.format,
            execute: self.execute,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let verbose = cli.verbose;
    match commands::run(&cli.into_config(), verbose) {
        Err(err) if commands::is_broken_pipe(&err) => Ok(()),
        other => other,
    }
}

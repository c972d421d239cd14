//! BPF Registers
//!
//! eBPF has 11 64-bit registers (R0-R10):
//! - R0: Return value from functions and BPF program exit
//! - R1-R5: Function arguments (caller-saved)
//! - R6-R9: Callee-saved registers
//! - R10: Frame pointer
//!
//! Register fields in an instruction are 4 bits wide, so the raw values
//! 11-15 can be encoded even though they name no register.

use core::fmt;

/// BPF register identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Return value / scratch register
    R0 = 0,
    /// Argument 1 / scratch (context pointer at entry)
    R1 = 1,
    /// Argument 2 / scratch
    R2 = 2,
    /// Argument 3 / scratch
    R3 = 3,
    /// Argument 4 / scratch
    R4 = 4,
    /// Argument 5 / scratch
    R5 = 5,
    /// Callee-saved
    R6 = 6,
    /// Callee-saved
    R7 = 7,
    /// Callee-saved
    R8 = 8,
    /// Callee-saved
    R9 = 9,
    /// Frame pointer
    R10 = 10,
}

impl Register {
    /// Total number of BPF registers
    pub const COUNT: usize = 11;

    /// All registers in numbering order.
    pub const ALL: [Register; Register::COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
        Self::R8,
        Self::R9,
        Self::R10,
    ];

    /// Try to create a register from a raw value.
    ///
    /// Returns `None` if the value is not a valid register (>= 11).
    #[inline]
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            8 => Some(Self::R8),
            9 => Some(Self::R9),
            10 => Some(Self::R10),
            _ => None,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", *self as u8)
    }
}

impl TryFrom<u8> for Register {
    type Error = InvalidRegister;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_raw(value).ok_or(InvalidRegister(value))
    }
}

/// Error returned when trying to create a register from an invalid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid register: {0}")]
pub struct InvalidRegister(pub u8);

/// Packed register byte: source in the high nibble, destination in the low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Regs(pub u8);

impl Regs {
    /// Source register field (0-15).
    #[inline]
    pub const fn src_reg(self) -> u8 {
        (self.0 & 0xf0) >> 4
    }

    /// Destination register field (0-15).
    #[inline]
    pub const fn dst_reg(self) -> u8 {
        self.0 & 0x0f
    }
}

/// Register name as printed in disassembly.
///
/// Raw fields 11-15 print as `r11`..`r15`; the listing shows what the
/// bytecode says rather than rejecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegName(pub u8);

impl fmt::Display for RegName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Register file containing all 11 registers as signed 64-bit values.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    values: [i64; Register::COUNT],
}

impl RegisterFile {
    /// Create a new register file with all registers initialized to zero.
    #[inline]
    pub const fn new() -> Self {
        Self {
            values: [0; Register::COUNT],
        }
    }

    /// Get the value of a register.
    #[inline]
    pub fn get(&self, reg: Register) -> i64 {
        self.values[reg as usize]
    }

    /// Set the value of a register.
    #[inline]
    pub fn set(&mut self, reg: Register, value: i64) {
        self.values[reg as usize] = value;
    }

    /// Get the return value (R0).
    #[inline]
    pub fn return_value(&self) -> i64 {
        self.get(Register::R0)
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterFile")
            .field("r0", &format_args!("{:#018x}", self.values[0]))
            .field("r1", &format_args!("{:#018x}", self.values[1]))
            .field("r2", &format_args!("{:#018x}", self.values[2]))
            .field("r3", &format_args!("{:#018x}", self.values[3]))
            .field("r4", &format_args!("{:#018x}", self.values[4]))
            .field("r5", &format_args!("{:#018x}", self.values[5]))
            .field("r6", &format_args!("{:#018x}", self.values[6]))
            .field("r7", &format_args!("{:#018x}", self.values[7]))
            .field("r8", &format_args!("{:#018x}", self.values[8]))
            .field("r9", &format_args!("{:#018x}", self.values[9]))
            .field("r10 (fp)", &format_args!("{:#018x}", self.values[10]))
            .finish()
    }
}

/// Register dump: `Regs: r0=0 r1=0 ... r10=0`.
impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Regs:")?;
        for reg in Register::ALL {
            write!(f, " {}={}", reg, self.get(reg))?;
        }
        Ok(())
    }
}

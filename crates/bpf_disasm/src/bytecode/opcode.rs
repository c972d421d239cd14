//! BPF Opcode Classification
//!
//! eBPF instructions use an 8-bit opcode with the following structure:
//!
//! ```text
//! arithmetic and jump classes:
//! +----------------+--------+--------------------+
//! |    4 bits      | 1 bit  |      3 bits        |
//! |   operation    | source |   instruction      |
//! |    code        |  type  |     class          |
//! +----------------+--------+--------------------+
//!
//! load and store classes:
//! +----------+----------+--------------------+
//! |  3 bits  |  2 bits  |      3 bits        |
//! |   mode   |   size   |  instruction class |
//! +----------+----------+--------------------+
//! ```
//!
//! The same byte is read through one of three views depending on its class.
//! [`TypedOpcode::decode`] picks the view once; each view only exposes the
//! accessors that make sense for it.

use core::fmt;

/// Instruction class (bits 0-2 of opcode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpcodeClass {
    /// Non-standard load operations (64-bit immediate, legacy packet access)
    Ld = 0x00,
    /// Load into register operations
    Ldx = 0x01,
    /// Store from immediate operations
    St = 0x02,
    /// Store from register operations
    Stx = 0x03,
    /// 32-bit arithmetic operations
    Alu32 = 0x04,
    /// 64-bit jump operations
    Jmp = 0x05,
    /// 32-bit jump operations
    Jmp32 = 0x06,
    /// 64-bit arithmetic operations
    Alu64 = 0x07,
}

impl OpcodeClass {
    /// Extract instruction class from opcode.
    ///
    /// The eight classes cover the whole 3-bit space, so this never fails.
    #[inline]
    pub const fn from_opcode(opcode: u8) -> Self {
        match opcode & 0x07 {
            0x00 => Self::Ld,
            0x01 => Self::Ldx,
            0x02 => Self::St,
            0x03 => Self::Stx,
            0x04 => Self::Alu32,
            0x05 => Self::Jmp,
            0x06 => Self::Jmp32,
            0x07 => Self::Alu64,
            _ => unreachable!(),
        }
    }

    /// Whether this class belongs to the load/store or the arithmetic/jump family.
    #[inline]
    pub const fn op_type(self) -> OpcodeType {
        match self {
            Self::Ld | Self::Ldx | Self::St | Self::Stx => OpcodeType::LoadAndStore,
            Self::Alu32 | Self::Jmp | Self::Jmp32 | Self::Alu64 => OpcodeType::ArithmeticAndJump,
        }
    }

    /// Check if this is an ALU class.
    #[inline]
    pub const fn is_alu(self) -> bool {
        matches!(self, Self::Alu32 | Self::Alu64)
    }

    /// Check if this is a jump class.
    #[inline]
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::Jmp | Self::Jmp32)
    }
}

impl fmt::Display for OpcodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ld => "ld",
            Self::Ldx => "ldx",
            Self::St => "st",
            Self::Stx => "stx",
            Self::Alu32 => "alu",
            Self::Jmp => "jmp",
            Self::Jmp32 => "jmp32",
            Self::Alu64 => "alu64",
        };
        write!(f, "{}", s)
    }
}

/// The two opcode families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeType {
    LoadAndStore,
    ArithmeticAndJump,
}

/// Source type (bit 3 of opcode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SourceType {
    /// Source is the 32-bit immediate ("K")
    Imm = 0x00,
    /// Source is the `src` register ("X")
    Reg = 0x08,
}

impl SourceType {
    /// Extract source type from opcode.
    #[inline]
    pub const fn from_opcode(opcode: u8) -> Self {
        if opcode & 0x08 != 0 {
            Self::Reg
        } else {
            Self::Imm
        }
    }
}

/// ALU operation codes (bits 4-7 of opcode for ALU class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AluOp {
    /// dst += src
    Add = 0x00,
    /// dst -= src
    Sub = 0x10,
    /// dst *= src
    Mul = 0x20,
    /// dst = (src != 0) ? (dst / src) : 0
    Div = 0x30,
    /// dst |= src
    Or = 0x40,
    /// dst &= src
    And = 0x50,
    /// dst <<= (src & mask)
    Lsh = 0x60,
    /// dst >>= (src & mask)
    Rsh = 0x70,
    /// dst = ~src
    Neg = 0x80,
    /// dst = (src != 0) ? (dst % src) : dst
    Mod = 0x90,
    /// dst ^= src
    Xor = 0xa0,
    /// dst = src
    Mov = 0xb0,
    /// Sign extending dst >>= (src & mask)
    Arsh = 0xc0,
    /// Byte swap
    End = 0xd0,
}

impl AluOp {
    /// Extract ALU operation from opcode.
    ///
    /// Returns `None` for the two unassigned codes (0xe0, 0xf0).
    #[inline]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode & 0xf0 {
            0x00 => Some(Self::Add),
            0x10 => Some(Self::Sub),
            0x20 => Some(Self::Mul),
            0x30 => Some(Self::Div),
            0x40 => Some(Self::Or),
            0x50 => Some(Self::And),
            0x60 => Some(Self::Lsh),
            0x70 => Some(Self::Rsh),
            0x80 => Some(Self::Neg),
            0x90 => Some(Self::Mod),
            0xa0 => Some(Self::Xor),
            0xb0 => Some(Self::Mov),
            0xc0 => Some(Self::Arsh),
            0xd0 => Some(Self::End),
            _ => None,
        }
    }

    /// Operator text used in `dst OP= src` renderings.
    ///
    /// `Mov` is plain assignment and renders with an empty operator.
    #[inline]
    pub const fn operator(self) -> Option<&'static str> {
        match self {
            Self::Add => Some("+"),
            Self::Sub => Some("-"),
            Self::Mul => Some("*"),
            Self::Div => Some("/"),
            Self::Or => Some("|"),
            Self::And => Some("&"),
            Self::Lsh => Some("<<"),
            Self::Rsh => Some(">>"),
            Self::Mod => Some("%"),
            Self::Xor => Some("^"),
            Self::Mov => Some(""),
            Self::Arsh => Some("s>>"),
            Self::Neg | Self::End => None,
        }
    }

    /// Check if this is a shift operation.
    #[inline]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Lsh | Self::Rsh | Self::Arsh)
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Or => "or",
            Self::And => "and",
            Self::Lsh => "lsh",
            Self::Rsh => "rsh",
            Self::Neg => "neg",
            Self::Mod => "mod",
            Self::Xor => "xor",
            Self::Mov => "mov",
            Self::Arsh => "arsh",
            Self::End => "end",
        };
        write!(f, "{}", s)
    }
}

/// Jump operation codes (bits 4-7 of opcode for JMP class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JmpOp {
    /// PC += offset
    Ja = 0x00,
    /// PC += offset if dst == src
    Jeq = 0x10,
    /// PC += offset if dst > src (unsigned)
    Jgt = 0x20,
    /// PC += offset if dst >= src (unsigned)
    Jge = 0x30,
    /// PC += offset if dst & src
    Jset = 0x40,
    /// PC += offset if dst != src
    Jne = 0x50,
    /// PC += offset if dst > src (signed)
    Jsgt = 0x60,
    /// PC += offset if dst >= src (signed)
    Jsge = 0x70,
    /// Helper or program-local function call
    Call = 0x80,
    /// Return
    Exit = 0x90,
    /// PC += offset if dst < src (unsigned)
    Jlt = 0xa0,
    /// PC += offset if dst <= src (unsigned)
    Jle = 0xb0,
    /// PC += offset if dst < src (signed)
    Jslt = 0xc0,
    /// PC += offset if dst <= src (signed)
    Jsle = 0xd0,
}

impl JmpOp {
    /// Extract jump operation from opcode.
    ///
    /// Returns `None` for the two unassigned codes (0xe0, 0xf0).
    #[inline]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode & 0xf0 {
            0x00 => Some(Self::Ja),
            0x10 => Some(Self::Jeq),
            0x20 => Some(Self::Jgt),
            0x30 => Some(Self::Jge),
            0x40 => Some(Self::Jset),
            0x50 => Some(Self::Jne),
            0x60 => Some(Self::Jsgt),
            0x70 => Some(Self::Jsge),
            0x80 => Some(Self::Call),
            0x90 => Some(Self::Exit),
            0xa0 => Some(Self::Jlt),
            0xb0 => Some(Self::Jle),
            0xc0 => Some(Self::Jslt),
            0xd0 => Some(Self::Jsle),
            _ => None,
        }
    }

    /// Comparison operator for conditional jumps.
    #[inline]
    pub const fn operator(self) -> Option<&'static str> {
        match self {
            Self::Jeq => Some("=="),
            Self::Jgt => Some(">"),
            Self::Jge => Some(">="),
            Self::Jset => Some("&"),
            Self::Jne => Some("!="),
            Self::Jsgt => Some("s>"),
            Self::Jsge => Some("s>="),
            Self::Jlt => Some("<"),
            Self::Jle => Some("<="),
            Self::Jslt => Some("s<"),
            Self::Jsle => Some("s<="),
            Self::Ja | Self::Call | Self::Exit => None,
        }
    }
}

impl fmt::Display for JmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ja => "ja",
            Self::Jeq => "jeq",
            Self::Jgt => "jgt",
            Self::Jge => "jge",
            Self::Jset => "jset",
            Self::Jne => "jne",
            Self::Jsgt => "jsgt",
            Self::Jsge => "jsge",
            Self::Call => "call",
            Self::Exit => "exit",
            Self::Jlt => "jlt",
            Self::Jle => "jle",
            Self::Jslt => "jslt",
            Self::Jsle => "jsle",
        };
        write!(f, "{}", s)
    }
}

/// Memory access size (bits 3-4 of opcode for memory class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MemSize {
    /// 32-bit word
    Word = 0x00,
    /// 16-bit half word
    Half = 0x08,
    /// 8-bit byte
    Byte = 0x10,
    /// 64-bit double word
    DWord = 0x18,
}

impl MemSize {
    /// Extract memory size from opcode.
    #[inline]
    pub const fn from_opcode(opcode: u8) -> Self {
        match opcode & 0x18 {
            0x00 => Self::Word,
            0x08 => Self::Half,
            0x10 => Self::Byte,
            _ => Self::DWord,
        }
    }
}

/// Unsigned size qualifier, as in `*(u32 *)`.
impl fmt::Display for MemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Byte => "u8",
            Self::Half => "u16",
            Self::Word => "u32",
            Self::DWord => "u64",
        };
        write!(f, "{}", s)
    }
}

/// Memory access mode (bits 5-7 of opcode for memory class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MemMode {
    /// 64-bit immediate load
    Imm = 0x00,
    /// Legacy packet access (absolute)
    Abs = 0x20,
    /// Legacy packet access (indirect)
    Ind = 0x40,
    /// Regular load and store
    Mem = 0x60,
    /// Sign-extending load
    MemSx = 0x80,
    /// Atomic read-modify-write
    Atomic = 0xc0,
}

impl MemMode {
    /// Extract memory mode from opcode.
    ///
    /// Returns `None` for the unassigned modes (0xa0, 0xe0).
    #[inline]
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode & 0xe0 {
            0x00 => Some(Self::Imm),
            0x20 => Some(Self::Abs),
            0x40 => Some(Self::Ind),
            0x60 => Some(Self::Mem),
            0x80 => Some(Self::MemSx),
            0xc0 => Some(Self::Atomic),
            _ => None,
        }
    }
}

/// Atomic operation codes (in imm field for atomic memory operations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AtomicOp {
    /// Atomic add
    Add = 0x00,
    /// Atomic or
    Or = 0x40,
    /// Atomic and
    And = 0x50,
    /// Atomic xor
    Xor = 0xa0,
    /// Atomic exchange (always fetches)
    Xchg = 0xe0,
    /// Atomic compare and exchange (always fetches)
    Cmpxchg = 0xf0,
}

impl AtomicOp {
    /// Modifier bit: the operation also loads the old value back into `src`.
    pub const FETCH: i32 = 0x01;

    /// Extract atomic operation from immediate value, ignoring the fetch bit.
    ///
    /// Any bit outside the operation code and the fetch modifier makes the
    /// immediate invalid.
    #[inline]
    pub const fn from_imm(imm: i32) -> Option<Self> {
        match imm & !Self::FETCH {
            0x00 => Some(Self::Add),
            0x40 => Some(Self::Or),
            0x50 => Some(Self::And),
            0xa0 => Some(Self::Xor),
            0xe0 => Some(Self::Xchg),
            0xf0 => Some(Self::Cmpxchg),
            _ => None,
        }
    }

    /// Check if the immediate carries the fetch modifier.
    #[inline]
    pub const fn fetches(imm: i32) -> bool {
        imm & Self::FETCH != 0
    }

    /// Operator text for the fetch-free read-modify-write forms.
    #[inline]
    pub const fn operator(self) -> Option<&'static str> {
        match self {
            Self::Add => Some("+"),
            Self::Or => Some("|"),
            Self::And => Some("&"),
            Self::Xor => Some("^"),
            Self::Xchg | Self::Cmpxchg => None,
        }
    }
}

impl fmt::Display for AtomicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Or => "or",
            Self::And => "and",
            Self::Xor => "xor",
            Self::Xchg => "xchg",
            Self::Cmpxchg => "cmpxchg",
        };
        write!(f, "{}", s)
    }
}

/// Source of a 64-bit immediate load, carried in the `src` register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ImmSource {
    /// dst = imm64
    Imm64 = 0x0,
    /// dst = map_by_fd(imm)
    MapByFd = 0x1,
    /// dst = map_val(map_by_fd(imm)) + next_imm
    MapValueByFd = 0x2,
    /// dst = var_addr(imm)
    VariableAddr = 0x3,
    /// dst = code_addr(imm)
    CodeAddr = 0x4,
    /// dst = map_by_idx(imm)
    MapByIndex = 0x5,
    /// dst = map_val(map_by_idx(imm)) + next_imm
    MapValueByIndex = 0x6,
}

impl ImmSource {
    #[inline]
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0x0 => Some(Self::Imm64),
            0x1 => Some(Self::MapByFd),
            0x2 => Some(Self::MapValueByFd),
            0x3 => Some(Self::VariableAddr),
            0x4 => Some(Self::CodeAddr),
            0x5 => Some(Self::MapByIndex),
            0x6 => Some(Self::MapValueByIndex),
            _ => None,
        }
    }
}

/// Opcode of an ALU or ALU64 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArithmeticOpcode(u8);

impl ArithmeticOpcode {
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn class(self) -> OpcodeClass {
        OpcodeClass::from_opcode(self.0)
    }

    #[inline]
    pub const fn source(self) -> SourceType {
        SourceType::from_opcode(self.0)
    }

    #[inline]
    pub const fn code(self) -> Option<AluOp> {
        AluOp::from_opcode(self.0)
    }

    /// `true` for ALU64, `false` for the 32-bit ALU class.
    #[inline]
    pub const fn is_64bit(self) -> bool {
        matches!(self.class(), OpcodeClass::Alu64)
    }
}

/// Opcode of a JMP or JMP32 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JumpOpcode(u8);

impl JumpOpcode {
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn class(self) -> OpcodeClass {
        OpcodeClass::from_opcode(self.0)
    }

    #[inline]
    pub const fn source(self) -> SourceType {
        SourceType::from_opcode(self.0)
    }

    #[inline]
    pub const fn code(self) -> Option<JmpOp> {
        JmpOp::from_opcode(self.0)
    }
}

/// Opcode of an LD, LDX, ST or STX instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadStoreOpcode(u8);

impl LoadStoreOpcode {
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn class(self) -> OpcodeClass {
        OpcodeClass::from_opcode(self.0)
    }

    #[inline]
    pub const fn mode(self) -> Option<MemMode> {
        MemMode::from_opcode(self.0)
    }

    #[inline]
    pub const fn size(self) -> MemSize {
        MemSize::from_opcode(self.0)
    }
}

/// An opcode byte tagged with the one interpretation its class allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedOpcode {
    Arithmetic(ArithmeticOpcode),
    Jump(JumpOpcode),
    LoadStore(LoadStoreOpcode),
}

impl TypedOpcode {
    /// Classify an opcode byte.
    #[inline]
    pub const fn decode(opcode: u8) -> Self {
        match OpcodeClass::from_opcode(opcode) {
            OpcodeClass::Alu32 | OpcodeClass::Alu64 => Self::Arithmetic(ArithmeticOpcode(opcode)),
            OpcodeClass::Jmp | OpcodeClass::Jmp32 => Self::Jump(JumpOpcode(opcode)),
            OpcodeClass::Ld | OpcodeClass::Ldx | OpcodeClass::St | OpcodeClass::Stx => {
                Self::LoadStore(LoadStoreOpcode(opcode))
            }
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        match self {
            Self::Arithmetic(op) => op.raw(),
            Self::Jump(op) => op.raw(),
            Self::LoadStore(op) => op.raw(),
        }
    }

    #[inline]
    pub const fn class(self) -> OpcodeClass {
        OpcodeClass::from_opcode(self.raw())
    }

    /// Check if the instruction is followed by an extension word carrying
    /// the upper half of a 64-bit immediate.
    #[inline]
    pub const fn requires_extension(self) -> bool {
        match self {
            Self::LoadStore(op) => matches!(op.mode(), Some(MemMode::Imm)),
            Self::Arithmetic(_) | Self::Jump(_) => false,
        }
    }
}

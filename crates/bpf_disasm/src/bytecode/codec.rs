//! Instruction Word Fields
//!
//! A 64-bit instruction word, as read from the byte stream in big-endian
//! order, has the following layout:
//!
//! ```text
//!  63      56 55  52 51  48 47           32 31                         0
//! +----------+------+------+---------------+----------------------------+
//! |  opcode  | src  | dst  | offset (LE)   |      immediate (LE)        |
//! +----------+------+------+---------------+----------------------------+
//! ```
//!
//! The offset and immediate bytes are stored little-endian inside the word,
//! so their bytes are masked out one by one and reassembled.

/// Opcode byte (bits 63-56).
#[inline]
pub const fn opcode(word: u64) -> u8 {
    ((word & 0xFF00_0000_0000_0000) >> 56) as u8
}

/// Register byte (bits 55-48): source register in the high nibble,
/// destination register in the low nibble.
#[inline]
pub const fn regs(word: u64) -> u8 {
    ((word & 0x00FF_0000_0000_0000) >> 48) as u8
}

/// Signed 16-bit offset (bits 47-32, little-endian).
#[inline]
pub const fn offset(word: u64) -> i16 {
    let low = (word & 0x0000_FF00_0000_0000) >> 40;
    let high = (word & 0x0000_00FF_0000_0000) >> 24;
    (low | high) as u16 as i16
}

/// Signed 32-bit immediate (bits 31-0, little-endian).
#[inline]
pub const fn imm(word: u64) -> i32 {
    let b0 = (word & 0x0000_0000_FF00_0000) >> 24;
    let b1 = (word & 0x0000_0000_00FF_0000) >> 8;
    let b2 = (word & 0x0000_0000_0000_FF00) << 8;
    let b3 = (word & 0x0000_0000_0000_00FF) << 24;
    (b0 | b1 | b2 | b3) as u32 as i32
}

/// Pack fields into a word; the inverse of the accessors above.
#[inline]
pub const fn pack(opcode: u8, dst: u8, src: u8, offset: i16, imm: i32) -> u64 {
    let regs = ((src & 0x0f) << 4) | (dst & 0x0f);
    let offset = u16::from_le_bytes((offset as u16).to_be_bytes());
    let imm = u32::from_le_bytes((imm as u32).to_be_bytes());
    ((opcode as u64) << 56) | ((regs as u64) << 48) | ((offset as u64) << 32) | imm as u64
}

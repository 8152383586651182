//! Bit-order correction for outbound bytes.
//!
//! Bits are appended to the accumulator in reception order, so the first bit of a
//! byte lands in its least significant position. The serial peripheral shifts its
//! register out MSB-first. Reversing each byte before it is loaded makes the host
//! observe the bits in the order the reader sent them.
//!
//! The reversal is a 256-entry lookup table built at compile time, which keeps the
//! transfer-complete handler to a single indexed load.

/// Lookup table mapping each byte to its bit-reversed value.
pub static REVERSED: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = swap_bits(i as u8);
        i += 1;
    }
    table
}

/// Reverses the bit order of `byte` (bit 0 ↔ 7, 1 ↔ 6, 2 ↔ 5, 3 ↔ 4).
pub const fn swap_bits(byte: u8) -> u8 {
    let b = (byte & 0xf0) >> 4 | (byte & 0x0f) << 4;
    let b = (b & 0xcc) >> 2 | (b & 0x33) << 2;
    (b & 0xaa) >> 1 | (b & 0x55) << 1
}

/// Reverses the bit order of `byte` through [`REVERSED`].
#[inline]
pub fn reverse(byte: u8) -> u8 {
    REVERSED[usize::from(byte)]
}

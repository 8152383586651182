//! Bit accumulator for a single Wiegand frame.
//!
//! A [`Frame`] pairs the bit counter with a 64-bit accumulator. Bit *i* of the frame
//! (in reception order) is stored at accumulator position *i*; positions at or above
//! the counter are always zero while bits are being appended.
//!
//! After finalization the counter is reset but the accumulator keeps the payload,
//! which the transmitter drains a byte at a time with [`Frame::take_byte`].

use heapless::Vec;

use crate::bitorder::reverse;
use crate::consts::{MAX_FRAME_BITS, MAX_PAYLOAD_BYTES};
use crate::parity::strip_parity;

/// Counter and accumulator for the frame currently being received or drained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    buffer: u64,
    counter: u8,
    overflowed: bool,
}

impl Frame {
    /// Creates an empty frame.
    pub const fn new() -> Self {
        Self {
            buffer: 0,
            counter: 0,
            overflowed: false,
        }
    }

    /// Number of bits appended since the frame started.
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Raw accumulator contents.
    pub fn buffer(&self) -> u64 {
        self.buffer
    }

    /// Whether more than [`MAX_FRAME_BITS`] bits arrived for this frame.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Appends one bit.
    ///
    /// The first bit of a frame clears whatever a previous frame left undrained, so
    /// the accumulator is zero at every position the new frame can reach.
    ///
    /// # Returns
    /// `false` if the frame is already full and the bit was dropped.
    pub fn push(&mut self, bit: bool) -> bool {
        if self.counter == 0 {
            self.buffer = 0;
            self.overflowed = false;
        }
        if self.counter >= MAX_FRAME_BITS {
            self.overflowed = true;
            return false;
        }
        if bit {
            self.buffer |= 1u64 << self.counter;
        }
        self.counter += 1;
        true
    }

    /// Drops the frame entirely.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Removes the leading and trailing parity bits in place.
    pub fn strip_parity(&mut self) {
        self.buffer = strip_parity(self.buffer, self.counter);
    }

    /// Resets the counter and leaves the accumulator to be drained.
    pub fn finish(&mut self) {
        self.counter = 0;
        self.overflowed = false;
    }

    /// Takes the low byte of the accumulator and shifts it out.
    pub fn take_byte(&mut self) -> u8 {
        let byte = (self.buffer & 0xff) as u8;
        self.buffer >>= 8;
        byte
    }

    /// Returns the next `count` bytes as the host will receive them, without draining.
    ///
    /// Each byte is bit-order corrected. `count` is capped at [`MAX_PAYLOAD_BYTES`].
    pub fn peek_bytes(&self, count: usize) -> Vec<u8, MAX_PAYLOAD_BYTES> {
        let mut bytes = Vec::new();
        let mut buffer = self.buffer;
        for _ in 0..count.min(MAX_PAYLOAD_BYTES) {
            if bytes.push(reverse((buffer & 0xff) as u8)).is_err() {
                break;
            }
            buffer >>= 8;
        }
        bytes
    }
}

//! Constants used across the Wiegand decoder and the serial re-encoder.
//!
//! ## Key Concepts
//!
//! - **Frame capacity**: the accumulator is a single `u64`, so a frame holds at most
//!   64 bits. Longer frames are discarded at timeout.
//! - **Frame timeout**: the inter-bit gap after which the accumulated bits are treated
//!   as a complete frame. Wiegand readers pulse every 1-2 ms, so 50 ms comfortably
//!   delimits frames without an explicit end marker.
//! - **Payload bytes**: at most 8 bytes follow the length prefix on the serial side.

/// Maximum number of bits a single frame may carry.
pub const MAX_FRAME_BITS: u8 = 64;

/// Maximum number of payload bytes clocked out after the length prefix.
pub const MAX_PAYLOAD_BYTES: usize = (MAX_FRAME_BITS as usize) / 8;

/// Default inter-bit timeout, in milliseconds, that delimits a frame.
pub const DEFAULT_FRAME_TIMEOUT_MS: u16 = 50;

/// Default timer clock prescaler for the frame countdown.
pub const DEFAULT_PRESCALER: u32 = 256;

/// Default CPU clock in Hz (factory setting of the ATtiny44/84 family).
pub const DEFAULT_F_CPU: u32 = 1_000_000;

/// Bit length of the standard 26-bit access-control format (H10301).
pub const STANDARD_FRAME_BITS: u8 = 26;

//! # wiegand-spi
//!
//! A portable, no_std Rust bridge from the two-wire Wiegand interface used by
//! access-control card readers to a synchronous serial (SPI slave) link toward a host
//! controller, with an out-of-band "data ready" line.
//!
//! The bridge is implemented as three interrupt handlers sharing one state struct:
//! - a **bit sampler** run on every edge of either data line
//! - a **frame timer** run when no bit arrived for a full inter-bit timeout
//! - a **serial transmitter** run each time the host clocked out a byte
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` |
//! | `timer-isr` (default) | `critical_section` protected global bridge and ISR helper macros |
//! | `delay-loop`          | Polling loop over `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Wire formats
//!
//! - **Input**: Wiegand frames of up to 64 bits. A frame ends when no bit arrives for
//!   the configured timeout (50 ms by default).
//! - **Output**: the frame's bit count, then the payload bytes in reception order with
//!   parity bits removed for 26-bit style formats. The ready line is active from frame
//!   completion until the host clocks out the first byte.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wiegand_spi::driver::{BridgeConfig, WiegandBridge};
//!
//! wiegand_spi::init_wiegand_bridge!(PA0, PA1, PB2, Timer0, Usi);
//!
//! fn main() {
//!     let bridge = WiegandBridge::new(d0, d1, ready, timer0, usi, BridgeConfig::default()).unwrap();
//!     wiegand_spi::setup_wiegand_bridge!(bridge);
//!     // enable interrupts and idle
//! }
//!
//! #[interrupt]
//! fn PCINT0() {
//!     let _ = wiegand_spi::wiegand_line_change!();
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - The host must read a frame within one frame timeout of the ready line going
//!   active, or a new card swipe will supersede it.
//! - Only one bridge instance should be active at a time in interrupt-driven mode.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

#[macro_use]
mod fmt;

pub mod bitorder;
pub mod consts;
pub mod driver;
pub mod error;
pub mod frame;
pub mod line;
pub mod parity;
pub mod serial;
#[cfg(test)]
pub(crate) mod testing;
pub mod timer;

pub use driver::{BridgeConfig, FrameOutcome, LineEvent, WiegandBridge};
pub use error::BridgeError;

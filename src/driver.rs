//! Wiegand to SPI-slave bridge driver.
//!
//! This module provides the [`WiegandBridge`] struct, which decodes the Wiegand pulse
//! train from a card reader and re-encodes each frame as a length-prefixed byte
//! stream clocked out by a host over a synchronous serial slave peripheral.
//!
//! The bridge is driven entirely by three handlers, each meant to be called from the
//! interrupt that triggers it:
//!
//! - [`on_line_change`](WiegandBridge::on_line_change): either data line changed level
//! - [`on_frame_timeout`](WiegandBridge::on_frame_timeout): the frame countdown expired
//! - [`on_transfer_complete`](WiegandBridge::on_transfer_complete): the host clocked out a byte
//!
//! All shared state lives in the bridge, so a handler only ever runs with exclusive
//! access. See [`crate::timer`] for wrapping the bridge in a `critical_section` mutex.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use wiegand_spi::driver::{BridgeConfig, WiegandBridge};
//! use wiegand_spi::serial::SerialSlave;
//! use wiegand_spi::timer::SoftCountdown;
//!
//! # struct Usi;
//! # impl SerialSlave for Usi {
//! #     type Error = ();
//! #     fn load(&mut self, _byte: u8) -> Result<(), ()> { Ok(()) }
//! #     fn acknowledge(&mut self) -> Result<(), ()> { Ok(()) }
//! # }
//! # let d0 = Pin::new(&[]);
//! # let d1 = Pin::new(&[]);
//! # let ready = Pin::new(&[PinTransaction::set(PinState::Low)]);
//! let mut bridge = WiegandBridge::new(
//!     d0,
//!     d1,
//!     ready,
//!     SoftCountdown::new(500),
//!     Usi,
//!     BridgeConfig::default(),
//! )
//! .unwrap();
//! assert!(!bridge.is_ready());
//! # bridge.d0.done();
//! # bridge.d1.done();
//! # bridge.ready.done();
//! ```
//!
//! ## Frame lifecycle
//!
//! ```text
//! IDLE -> ACCUMULATING -> (timeout) -> FINALIZED -> DRAINING -> IDLE
//!              |                          |
//!              +-> DISCARDED (odd, empty, |
//!                  overflow)              +-> superseded by a new first bit
//! ```

use embedded_hal::digital::{InputPin, OutputPin};
use heapless::Vec;

use crate::bitorder::reverse;
use crate::consts::MAX_PAYLOAD_BYTES;
use crate::error::BridgeError;
use crate::frame::Frame;
use crate::line::{DataLine, LineState, classify};
use crate::parity::{FrameRule, ParityPolicy};
use crate::serial::{SerialSlave, TxPhase};
use crate::timer::Countdown;

/// Wiring and frame handling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// The data line whose pulse encodes a `1` bit.
    pub one_line: DataLine,
    /// Drive the ready line low while a frame is waiting instead of high.
    pub ready_inverted: bool,
    /// Frame validation and parity stripping rules.
    pub policy: ParityPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            one_line: DataLine::D1,
            ready_inverted: false,
            policy: ParityPolicy::STANDARD,
        }
    }
}

/// Result of handling a line change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LineEvent {
    /// A bit was appended to the frame.
    Bit(bool),
    /// A bit pulse arrived but the frame is already full. The frame will be discarded.
    Overflow,
    /// Both lines went low. The countdown was paused and the frame kept.
    Disconnected,
    /// Both lines are high. Nothing to do.
    Released,
}

/// Why a frame was dropped at timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DiscardReason {
    /// The bit count is not a length the parity policy accepts.
    Malformed,
    /// More bits arrived than the accumulator holds.
    Overflow,
    /// The countdown expired without any bits.
    Empty,
}

/// Result of handling a frame timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameOutcome {
    /// The frame was staged for transmission and the ready line raised.
    Finalized {
        /// Bit count sent as the length prefix.
        bits: u8,
    },
    /// The frame was dropped without raising the ready line.
    Discarded(DiscardReason),
}

/// Running counts of frame outcomes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    /// Frames staged for the host.
    pub frames_good: u16,
    /// Frames dropped at timeout (malformed, empty, overflowed or not stageable).
    pub frames_bad: u16,
    /// Staged frames dropped because a new frame started before the host read them.
    pub frames_superseded: u16,
}

/// A Wiegand receiver re-encoding frames for a host over a serial slave peripheral.
///
/// ## Type Parameters
///
/// - `D0`, `D1`: [`InputPin`]s for the Wiegand DATA0 and DATA1 lines (idle high)
/// - `RDY`: [`OutputPin`] signalling the host that a frame is waiting
/// - `TMR`: the frame [`Countdown`]
/// - `SPI`: the [`SerialSlave`] the host clocks bytes out of
///
/// ## Serial framing
///
/// For each finalized frame the host reads, while the ready line is active:
///
/// ```text
/// [bit count] [payload 0] [payload 1] ... [payload n-1]
/// ```
///
/// where `n = ceil(data_bits / 8)` and `data_bits` excludes stripped parity bits. Each
/// payload byte carries the frame bits in reception order, MSB first. Reads beyond the
/// payload return zero.
#[derive(Debug)]
pub struct WiegandBridge<D0, D1, RDY, TMR, SPI>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    /// DATA0 line
    pub d0: D0,
    /// DATA1 line
    pub d1: D1,
    /// Ready output
    pub ready: RDY,
    /// Frame countdown
    pub countdown: TMR,
    /// Outbound serial peripheral
    pub serial: SPI,
    /// Frame counters
    pub stats: BridgeStats,
    config: BridgeConfig,
    frame: Frame,
    staged_length: u8,
    ready_raised: bool,
    phase: TxPhase,
    last_levels: Option<(bool, bool)>,
}

impl<D0, D1, RDY, TMR, SPI> WiegandBridge<D0, D1, RDY, TMR, SPI>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    /// Creates a new bridge.
    ///
    /// The countdown is stopped and the ready line driven inactive.
    ///
    /// # Errors
    /// [`BridgeError::ReadyLine`] if the ready line cannot be driven.
    pub fn new(
        d0: D0,
        d1: D1,
        ready: RDY,
        countdown: TMR,
        serial: SPI,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let mut bridge = Self {
            d0,
            d1,
            ready,
            countdown,
            serial,
            stats: BridgeStats::default(),
            config,
            frame: Frame::new(),
            staged_length: 0,
            ready_raised: false,
            phase: TxPhase::Idle,
            last_levels: None,
        };
        bridge.countdown.stop();
        bridge.write_ready(false)?;
        Ok(bridge)
    }

    /// The configuration the bridge was created with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Whether a finalized frame is waiting for the host.
    pub fn is_ready(&self) -> bool {
        self.ready_raised
    }

    /// Bits accumulated in the frame currently being received.
    pub fn bit_count(&self) -> u8 {
        self.frame.counter()
    }

    /// Raw accumulator contents.
    pub fn accumulator(&self) -> u64 {
        self.frame.buffer()
    }

    /// Length prefix of the most recently finalized frame.
    pub fn staged_length(&self) -> u8 {
        self.staged_length
    }

    /// Where the transmitter is in the current frame.
    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    /// Payload bytes of the staged frame as the host will read them.
    ///
    /// Returns `None` unless a finalized frame is waiting.
    pub fn staged_payload(&self) -> Option<Vec<u8, MAX_PAYLOAD_BYTES>> {
        if !self.ready_raised {
            return None;
        }
        let len = self.config.policy.payload_len(self.staged_length);
        Some(self.frame.peek_bytes(len))
    }

    /// Pin-change handler: samples both data lines and updates the frame.
    ///
    /// # Errors
    /// [`BridgeError::LineRead`] if a line cannot be read, [`BridgeError::ReadyLine`]
    /// if a superseded frame's ready signal cannot be cleared. In the latter case the
    /// old frame is still dropped and the bit starts a new one.
    pub fn on_line_change(&mut self) -> Result<LineEvent, BridgeError> {
        let (d0_low, d1_low) = self.read_lines()?;
        self.sample(d0_low, d1_low)
    }

    /// Polling variant of [`on_line_change`](Self::on_line_change).
    ///
    /// Reads both lines and only runs the sampler when their levels differ from the
    /// previous sample.
    ///
    /// # Errors
    /// As [`on_line_change`](Self::on_line_change).
    pub fn poll_lines(&mut self) -> Result<Option<LineEvent>, BridgeError> {
        let levels = self.read_lines()?;
        if self.last_levels == Some(levels) {
            return Ok(None);
        }
        self.sample(levels.0, levels.1).map(Some)
    }

    /// Frame-timeout handler: validates the accumulated frame and stages it.
    ///
    /// On success the length prefix is loaded into the serial peripheral before the
    /// ready line is raised, so the first byte the host clocks out is always the bit
    /// count.
    ///
    /// # Errors
    /// [`BridgeError::Serial`] or [`BridgeError::ReadyLine`] on peripheral failure. The
    /// frame is then dropped and counted as bad, leaving the bridge idle.
    pub fn on_frame_timeout(&mut self) -> Result<FrameOutcome, BridgeError> {
        self.countdown.stop();
        let bits = self.frame.counter();

        let rule = self.config.policy.rule_for(bits);
        let discard = if self.frame.is_overflowed() {
            Some(DiscardReason::Overflow)
        } else if bits == 0 {
            Some(DiscardReason::Empty)
        } else if rule == FrameRule::Reject {
            Some(DiscardReason::Malformed)
        } else {
            None
        };
        if let Some(reason) = discard {
            self.frame.clear();
            self.stats.frames_bad = self.stats.frames_bad.wrapping_add(1);
            debug!("dropped {}-bit frame", bits);
            return Ok(FrameOutcome::Discarded(reason));
        }

        if let Err(err) = self.stage(bits, rule) {
            // Nothing half-staged may survive into the next frame
            self.frame.clear();
            self.staged_length = 0;
            self.phase = TxPhase::Idle;
            self.ready_raised = false;
            self.stats.frames_bad = self.stats.frames_bad.wrapping_add(1);
            warn!("dropped {}-bit frame: {}", bits, err);
            return Err(err);
        }
        self.stats.frames_good = self.stats.frames_good.wrapping_add(1);
        debug!("staged {}-bit frame: {}", bits, self.frame.buffer());
        Ok(FrameOutcome::Finalized { bits })
    }

    /// Transfer-complete handler: loads the next outbound byte.
    ///
    /// Acknowledges the transfer, clears the ready line since the host has started
    /// reading, and loads the next bit-order corrected payload byte. While no frame is
    /// staged ([`TxPhase::Idle`]) a zero is loaded and the frame being received is left
    /// untouched.
    ///
    /// # Returns
    /// The byte loaded for the next transfer.
    ///
    /// # Errors
    /// [`BridgeError::Serial`] or [`BridgeError::ReadyLine`] on peripheral failure. The
    /// next byte is loaded even when acknowledging or lowering the ready line failed.
    pub fn on_transfer_complete(&mut self) -> Result<u8, BridgeError> {
        let acked = self.serial.acknowledge().map_err(|_| BridgeError::Serial);
        let lowered = self.set_ready(false);
        let byte = match self.phase {
            TxPhase::Idle => 0,
            TxPhase::AwaitingLength => {
                trace!("length byte {} sent", self.staged_length);
                self.phase = TxPhase::Draining;
                reverse(self.frame.take_byte())
            }
            TxPhase::Draining => reverse(self.frame.take_byte()),
        };
        self.serial.load(byte).map_err(|_| BridgeError::Serial)?;
        acked?;
        lowered?;
        Ok(byte)
    }

    /// Drops any frame in progress or waiting and returns to idle.
    ///
    /// # Errors
    /// [`BridgeError::ReadyLine`] if the ready line cannot be cleared.
    pub fn reset(&mut self) -> Result<(), BridgeError> {
        self.countdown.stop();
        self.frame.clear();
        self.staged_length = 0;
        self.phase = TxPhase::Idle;
        self.set_ready(false)
    }

    fn sample(&mut self, d0_low: bool, d1_low: bool) -> Result<LineEvent, BridgeError> {
        self.last_levels = Some((d0_low, d1_low));
        match classify(d0_low, d1_low, self.config.one_line) {
            LineState::Pulse(bit) => {
                // A new bit wins over a timeout that was about to fire
                self.countdown.stop();
                let mut lowered = Ok(());
                if self.frame.counter() == 0 {
                    if self.ready_raised {
                        warn!("frame superseded before the host read it");
                        self.frame.clear();
                        self.stats.frames_superseded =
                            self.stats.frames_superseded.wrapping_add(1);
                        lowered = self.set_ready(false);
                    }
                    self.phase = TxPhase::Idle;
                }
                let stored = self.frame.push(bit);
                self.countdown.start();
                lowered?;
                if stored {
                    trace!("bit {} = {}", self.frame.counter() - 1, bit);
                    Ok(LineEvent::Bit(bit))
                } else {
                    Ok(LineEvent::Overflow)
                }
            }
            LineState::Disconnected => {
                if self.countdown.is_running() {
                    debug!("lines disconnected with {} bits pending", self.frame.counter());
                    self.countdown.stop();
                }
                Ok(LineEvent::Disconnected)
            }
            LineState::Released => Ok(LineEvent::Released),
        }
    }

    fn stage(&mut self, bits: u8, rule: FrameRule) -> Result<(), BridgeError> {
        self.serial.acknowledge().map_err(|_| BridgeError::Serial)?;
        self.serial.load(bits).map_err(|_| BridgeError::Serial)?;
        if rule == FrameRule::StripParity {
            self.frame.strip_parity();
        }
        self.staged_length = bits;
        self.phase = TxPhase::AwaitingLength;
        self.frame.finish();
        self.set_ready(true)
    }

    fn read_lines(&mut self) -> Result<(bool, bool), BridgeError> {
        let d0_low = self
            .d0
            .is_low()
            .map_err(|_| BridgeError::LineRead(DataLine::D0))?;
        let d1_low = self
            .d1
            .is_low()
            .map_err(|_| BridgeError::LineRead(DataLine::D1))?;
        Ok((d0_low, d1_low))
    }

    fn set_ready(&mut self, raised: bool) -> Result<(), BridgeError> {
        if self.ready_raised == raised {
            return Ok(());
        }
        // Tracks the requested level even if the write fails
        self.ready_raised = raised;
        self.write_ready(raised)
    }

    fn write_ready(&mut self, raised: bool) -> Result<(), BridgeError> {
        let high = raised != self.config.ready_inverted;
        let result = if high {
            self.ready.set_high()
        } else {
            self.ready.set_low()
        };
        result.map_err(|_| BridgeError::ReadyLine)
    }
}

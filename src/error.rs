//! Error type for the bridge handlers and configuration helpers.
//!
//! Frame-level conditions (odd length, superseded frames, line noise) are not errors;
//! they are reported through [`FrameOutcome`](crate::driver::FrameOutcome) and
//! [`LineEvent`](crate::driver::LineEvent). Only peripheral failures and invalid
//! configuration surface here.

use thiserror::Error;

use crate::line::DataLine;

/// Errors returned by [`WiegandBridge`](crate::driver::WiegandBridge) and the timer helpers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BridgeError {
    /// A Wiegand data line could not be read.
    #[error("failed to read Wiegand line {0:?}")]
    LineRead(DataLine),
    /// The ready output could not be driven.
    #[error("failed to drive the ready line")]
    ReadyLine,
    /// The serial peripheral rejected a load or acknowledge.
    #[error("serial peripheral error")]
    Serial,
    /// The requested timeout does not fit the countdown compare register.
    #[error("frame timeout needs {ticks} timer ticks, more than the compare register holds")]
    CompareOverflow {
        /// Timer ticks the timeout would need.
        ticks: u32,
    },
    /// A polled countdown was configured with a zero poll interval.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
}

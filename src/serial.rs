//! Synchronous serial output, slave side.
//!
//! The host drives the clock. Each time a full byte has been shifted out the
//! peripheral raises its transfer-complete condition and the bridge loads the next
//! byte. The first byte of every frame is its bit length, followed by the payload.

/// A byte-oriented, externally clocked shift register (SPI slave, USI three-wire mode, ...).
pub trait SerialSlave {
    /// Error type for peripheral operations.
    type Error;

    /// Places `byte` in the shift register for the next transfer.
    fn load(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Clears the transfer-complete indicator so the next transfer can raise it again.
    fn acknowledge(&mut self) -> Result<(), Self::Error>;

    /// Polls for a finished transfer.
    ///
    /// Interrupt-driven peripherals call the bridge from their ISR instead and can
    /// keep the default, which never completes.
    fn poll_complete(&mut self) -> nb::Result<(), Self::Error> {
        Err(nb::Error::WouldBlock)
    }
}

/// Progress of the transmitter through the current frame.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxPhase {
    /// No frame is staged. Transfers clock out zeros and leave the frame being
    /// received alone.
    #[default]
    Idle,
    /// The length byte is loaded and has not been clocked out yet.
    AwaitingLength,
    /// The length byte went out; each transfer now drains one payload byte.
    Draining,
}

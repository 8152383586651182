use crate::driver::{FrameOutcome, LineEvent, WiegandBridge};
use crate::error::BridgeError;
use crate::serial::SerialSlave;
use crate::timer::Countdown;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::{InputPin, OutputPin};

/// A bridge shared between interrupt handlers.
///
/// The 64-bit accumulator is never updated atomically on small targets, so every
/// handler runs inside `critical_section::with`.
pub type SharedBridge<D0, D1, RDY, TMR, SPI> =
    Mutex<RefCell<Option<WiegandBridge<D0, D1, RDY, TMR, SPI>>>>;

/// Used to initialize the global static `WiegandBridge` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutex-protected cell
///
/// # Example
/// ```rust,ignore
/// use wiegand_spi::timer::{SharedBridge, global_bridge_init};
/// use some_hal::{PA0, PA1, PB2, Timer0, Usi};
///
/// static BRIDGE: SharedBridge<PA0, PA1, PB2, Timer0, Usi> = global_bridge_init();
/// ```
pub const fn global_bridge_init<D0, D1, RDY, TMR, SPI>() -> SharedBridge<D0, D1, RDY, TMR, SPI>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    Mutex::new(RefCell::new(None))
}

/// Moves a configured bridge into the global cell.
///
/// Call once from `main()` before enabling the pin-change, timer and serial interrupts.
pub fn global_bridge_setup<D0, D1, RDY, TMR, SPI>(
    global: &SharedBridge<D0, D1, RDY, TMR, SPI>,
    bridge: WiegandBridge<D0, D1, RDY, TMR, SPI>,
) where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    critical_section::with(|cs| {
        let _ = global.borrow(cs).replace(Some(bridge));
    });
}

/// Runs `f` on the global bridge inside a critical section.
///
/// # Returns
/// `None` if the bridge has not been set up yet.
pub fn with_global_bridge<D0, D1, RDY, TMR, SPI, R>(
    global: &SharedBridge<D0, D1, RDY, TMR, SPI>,
    f: impl FnOnce(&mut WiegandBridge<D0, D1, RDY, TMR, SPI>) -> R,
) -> Option<R>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    critical_section::with(|cs| global.borrow(cs).borrow_mut().as_mut().map(f))
}

/// Pin-change interrupt body.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn PCINT0() {
///     let _ = global_line_change(&BRIDGE);
/// }
/// ```
pub fn global_line_change<D0, D1, RDY, TMR, SPI>(
    global: &SharedBridge<D0, D1, RDY, TMR, SPI>,
) -> Option<Result<LineEvent, BridgeError>>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    with_global_bridge(global, |bridge| bridge.on_line_change())
}

/// Timer compare-match interrupt body.
pub fn global_frame_timeout<D0, D1, RDY, TMR, SPI>(
    global: &SharedBridge<D0, D1, RDY, TMR, SPI>,
) -> Option<Result<FrameOutcome, BridgeError>>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    with_global_bridge(global, |bridge| bridge.on_frame_timeout())
}

/// Serial transfer-complete interrupt body.
pub fn global_transfer_complete<D0, D1, RDY, TMR, SPI>(
    global: &SharedBridge<D0, D1, RDY, TMR, SPI>,
) -> Option<Result<u8, BridgeError>>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: Countdown,
    SPI: SerialSlave,
{
    with_global_bridge(global, |bridge| bridge.on_transfer_complete())
}

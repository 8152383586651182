/// Declares a static global `WIEGAND_BRIDGE` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton suitable for interrupt-driven firmware,
/// where the pin-change, timer and serial interrupts all need the same bridge.
///
/// # Arguments
/// - `$d0`, `$d1`: concrete types of the Wiegand data lines (`InputPin`)
/// - `$rdy`: concrete type of the ready line (`OutputPin`)
/// - `$tmr`: concrete type of the frame countdown (`Countdown`)
/// - `$spi`: concrete type of the serial peripheral (`SerialSlave`)
///
/// # Example
/// ```rust,ignore
/// init_wiegand_bridge!(PA0, PA1, PB2, Timer0, Usi);
/// ```
#[macro_export]
macro_rules! init_wiegand_bridge {
    ( $d0:ty, $d1:ty, $rdy:ty, $tmr:ty, $spi:ty ) => {
        pub static WIEGAND_BRIDGE: $crate::critical_section::Mutex<
            core::cell::RefCell<Option<$crate::driver::WiegandBridge<$d0, $d1, $rdy, $tmr, $spi>>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Moves a configured bridge into the global `WIEGAND_BRIDGE`.
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     let bridge = WiegandBridge::new(d0, d1, ready, timer, usi, BridgeConfig::default()).unwrap();
///     setup_wiegand_bridge!(bridge);
/// }
/// ```
///
/// # Notes
/// - Requires `init_wiegand_bridge!` to have been used earlier.
/// - Call before enabling the interrupts that use the bridge.
#[macro_export]
macro_rules! setup_wiegand_bridge {
    ( $bridge:expr ) => {
        $crate::timer::global_bridge_setup(&WIEGAND_BRIDGE, $bridge)
    };
}

/// Runs the pin-change handler on the global `WIEGAND_BRIDGE`.
///
/// Evaluates to `None` if the bridge has not been set up yet.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn PCINT0() {
///     let _ = wiegand_line_change!();
/// }
/// ```
#[macro_export]
macro_rules! wiegand_line_change {
    () => {
        $crate::timer::global_line_change(&WIEGAND_BRIDGE)
    };
}

/// Runs the frame-timeout handler on the global `WIEGAND_BRIDGE`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM0_COMPA() {
///     let _ = wiegand_frame_timeout!();
/// }
/// ```
#[macro_export]
macro_rules! wiegand_frame_timeout {
    () => {
        $crate::timer::global_frame_timeout(&WIEGAND_BRIDGE)
    };
}

/// Runs the transfer-complete handler on the global `WIEGAND_BRIDGE`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn USI_OVF() {
///     let _ = wiegand_transfer_complete!();
/// }
/// ```
#[macro_export]
macro_rules! wiegand_transfer_complete {
    () => {
        $crate::timer::global_transfer_complete(&WIEGAND_BRIDGE)
    };
}

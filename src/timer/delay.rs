use crate::driver::{FrameOutcome, LineEvent, WiegandBridge};
use crate::error::BridgeError;
use crate::serial::SerialSlave;
use crate::timer::PolledCountdown;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// What happened during one [`poll_once`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollEvents {
    /// Sampler result, if the line levels changed.
    pub line: Option<LineEvent>,
    /// Frame timer result, if the countdown expired.
    pub frame: Option<FrameOutcome>,
    /// Byte loaded by the transmitter, if the host finished a transfer.
    pub sent: Option<u8>,
}

/// Runs each handler whose trigger has fired since the last pass.
///
/// The order matches interrupt priority on the reference hardware: lines first, so
/// a fresh bit cancels a countdown that expires on the same tick, then the frame
/// timer, then the serial peripheral.
///
/// # Errors
/// The first peripheral error encountered. Later handlers are skipped for this pass.
pub fn poll_once<D0, D1, RDY, TMR, SPI>(
    bridge: &mut WiegandBridge<D0, D1, RDY, TMR, SPI>,
) -> Result<PollEvents, BridgeError>
where
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: PolledCountdown,
    SPI: SerialSlave,
{
    let mut events = PollEvents {
        line: bridge.poll_lines()?,
        ..PollEvents::default()
    };
    if bridge.countdown.poll_expired() {
        events.frame = Some(bridge.on_frame_timeout()?);
    }
    match bridge.serial.poll_complete() {
        Ok(()) => events.sent = Some(bridge.on_transfer_complete()?),
        Err(nb::Error::WouldBlock) => {}
        Err(nb::Error::Other(_)) => return Err(BridgeError::Serial),
    }
    Ok(events)
}

/// Runs a blocking loop that polls the bridge every `poll_us` microseconds.
///
/// This is for targets where pin-change or serial interrupts are unavailable. The
/// countdown's deadline must be expressed in poll ticks, see
/// [`TimerConfig::poll_ticks`](crate::timer::TimerConfig::poll_ticks). Wiegand pulses
/// are 20-100 µs wide, so `poll_us` has to stay well below that.
///
/// # Example
/// ```rust,ignore
/// use wiegand_spi::timer::{SoftCountdown, TimerConfig, run_bridge_poll_loop};
///
/// let deadline = TimerConfig::default().poll_ticks(10).unwrap();
/// let mut bridge = WiegandBridge::new(d0, d1, ready, SoftCountdown::new(deadline), spi, config).unwrap();
/// run_bridge_poll_loop(&mut bridge, &mut delay, 10);
/// ```
///
/// # Notes
/// - This loop never returns. Errors are logged and polling continues.
pub fn run_bridge_poll_loop<D, D0, D1, RDY, TMR, SPI>(
    bridge: &mut WiegandBridge<D0, D1, RDY, TMR, SPI>,
    delay: &mut D,
    poll_us: u32,
) -> !
where
    D: DelayNs,
    D0: InputPin,
    D1: InputPin,
    RDY: OutputPin,
    TMR: PolledCountdown,
    SPI: SerialSlave,
{
    loop {
        if let Err(err) = poll_once(bridge) {
            warn!("poll failed: {}", err);
        }
        delay.delay_us(poll_us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BridgeConfig;
    use crate::testing::{FakeLine, FakeReady, RecordingSerial, TestBridge, drain, feed};
    use crate::timer::SoftCountdown;

    fn polled_bridge(deadline: u32) -> TestBridge<SoftCountdown> {
        WiegandBridge::new(
            FakeLine::default(),
            FakeLine::default(),
            FakeReady::default(),
            SoftCountdown::new(deadline),
            RecordingSerial::default(),
            BridgeConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_poll_once_samples_changed_lines() {
        let mut bridge = polled_bridge(3);
        bridge.d1.low = true;
        let events = poll_once(&mut bridge).unwrap();
        assert_eq!(events.line, Some(LineEvent::Bit(true)));
        assert_eq!(events.frame, None);

        let events = poll_once(&mut bridge).unwrap();
        assert_eq!(events, PollEvents::default());
    }

    #[test]
    fn test_poll_once_finalizes_after_deadline() {
        let mut bridge = polled_bridge(3);
        feed(&mut bridge, &[1, 0, 1, 1]);

        assert_eq!(poll_once(&mut bridge).unwrap().frame, None);
        assert_eq!(poll_once(&mut bridge).unwrap().frame, None);
        assert_eq!(
            poll_once(&mut bridge).unwrap().frame,
            Some(FrameOutcome::Finalized { bits: 4 })
        );
        assert!(bridge.is_ready());
        assert_eq!(poll_once(&mut bridge).unwrap().frame, None);
    }

    #[test]
    fn test_poll_once_drains_on_completed_transfer() {
        let mut bridge = polled_bridge(1);
        feed(&mut bridge, &[1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(
            poll_once(&mut bridge).unwrap().frame,
            Some(FrameOutcome::Finalized { bits: 8 })
        );

        // Host clocks out the length byte
        bridge.serial.pending = 1;
        let events = poll_once(&mut bridge).unwrap();
        assert_eq!(events.sent, Some(0x80));
        assert!(!bridge.is_ready());
        assert_eq!(bridge.serial.loaded.as_slice(), &[8, 0x80]);
        assert_eq!(drain(&mut bridge, 1).as_slice(), &[0]);
    }
}

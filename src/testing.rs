//! Fake peripherals shared by the unit tests.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};
use heapless::Vec;

use crate::driver::{BridgeConfig, WiegandBridge};
use crate::serial::SerialSlave;
use crate::timer::Countdown;

#[derive(Debug, Default)]
pub(crate) struct FakeLine {
    pub(crate) low: bool,
}

impl ErrorType for FakeLine {
    type Error = Infallible;
}

impl InputPin for FakeLine {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.low)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.low)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeReady {
    pub(crate) high: bool,
    pub(crate) writes: u16,
    /// Makes every write fail.
    pub(crate) broken: bool,
}

impl FakeReady {
    fn drive(&mut self, high: bool) -> Result<(), ErrorKind> {
        if self.broken {
            return Err(ErrorKind::Other);
        }
        self.high = high;
        self.writes += 1;
        Ok(())
    }
}

impl ErrorType for FakeReady {
    type Error = ErrorKind;
}

impl OutputPin for FakeReady {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        self.drive(false)
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        self.drive(true)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeCountdown {
    pub(crate) running: bool,
    pub(crate) starts: u16,
}

impl Countdown for FakeCountdown {
    fn start(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Records every byte loaded into the shift register.
#[derive(Debug, Default)]
pub(crate) struct RecordingSerial {
    pub(crate) loaded: Vec<u8, 64>,
    pub(crate) acks: u16,
    /// Transfers the fake host has clocked but the bridge has not handled yet.
    pub(crate) pending: u16,
    /// Makes every load and acknowledge fail.
    pub(crate) broken: bool,
}

impl SerialSlave for RecordingSerial {
    type Error = ();

    fn load(&mut self, byte: u8) -> Result<(), ()> {
        if self.broken {
            return Err(());
        }
        self.loaded.push(byte).expect("recording full");
        Ok(())
    }

    fn acknowledge(&mut self) -> Result<(), ()> {
        if self.broken {
            return Err(());
        }
        self.acks += 1;
        Ok(())
    }

    fn poll_complete(&mut self) -> nb::Result<(), ()> {
        if self.pending == 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.pending -= 1;
        Ok(())
    }
}

pub(crate) type TestBridge<TMR = FakeCountdown> =
    WiegandBridge<FakeLine, FakeLine, FakeReady, TMR, RecordingSerial>;

pub(crate) fn bridge() -> TestBridge {
    WiegandBridge::new(
        FakeLine::default(),
        FakeLine::default(),
        FakeReady::default(),
        FakeCountdown::default(),
        RecordingSerial::default(),
        BridgeConfig::default(),
    )
    .unwrap()
}

/// Pulses D1 for each `1` and D0 for each `0`, releasing both lines after every bit.
pub(crate) fn feed<TMR: Countdown>(bridge: &mut TestBridge<TMR>, bits: &[u8]) {
    for &bit in bits {
        if bit == 1 {
            bridge.d1.low = true;
        } else {
            bridge.d0.low = true;
        }
        let _ = bridge.on_line_change().unwrap();
        bridge.d0.low = false;
        bridge.d1.low = false;
        let _ = bridge.on_line_change().unwrap();
    }
}

/// Clocks `count` bytes out of the bridge, returning what was loaded for each.
pub(crate) fn drain<TMR: Countdown>(bridge: &mut TestBridge<TMR>, count: usize) -> Vec<u8, 8> {
    let mut bytes = Vec::new();
    for _ in 0..count {
        bytes.push(bridge.on_transfer_complete().unwrap()).unwrap();
    }
    bytes
}

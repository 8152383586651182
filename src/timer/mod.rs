//! Frame countdown and interrupt/poll integration.
//!
//! The frame timer is a one-shot countdown that the sampler restarts on every bit.
//! When it reaches its deadline, no bit has arrived for a full timeout window and the
//! accumulated bits form a frame. The bridge only needs [`Countdown`]; how it maps onto
//! a hardware timer is up to the platform.
//!
//! Two integration styles are provided:
//! - `timer-isr` feature: a `critical_section` protected global bridge and macros to
//!   call the three handlers from interrupt vectors
//! - `delay-loop` feature: a polling loop over [`SoftCountdown`] and
//!   `embedded_hal::delay::DelayNs` for targets without pin-change interrupts
//!
//! Helpers for picking the compare value of a CTC-mode hardware timer:
//!
//! | F_CPU    | PRESCALER | TIMEOUT | COMPARE |
//! |----------|-----------|---------|---------|
//! | 1 MHz    |       256 | 50 ms   |     195 |
//! | 1 MHz    |      1024 | 50 ms   |      49 |
//! | 8 MHz    |      1024 | 50 ms   |     391 |
//! | 16 MHz   |      1024 | 16 ms   |     250 |

use libm::roundf;

use crate::consts::{DEFAULT_FRAME_TIMEOUT_MS, DEFAULT_F_CPU, DEFAULT_PRESCALER};
use crate::error::BridgeError;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// A cancellable one-shot countdown.
pub trait Countdown {
    /// Starts counting from zero, restarting if already running.
    fn start(&mut self);

    /// Stops the countdown. No deadline is reported until it is started again.
    fn stop(&mut self);

    /// Whether the countdown is currently running.
    fn is_running(&self) -> bool;
}

/// A countdown that is advanced by polling rather than by a hardware interrupt.
pub trait PolledCountdown: Countdown {
    /// Advances the countdown by one tick.
    ///
    /// Returns `true` exactly once, on the tick the deadline is reached.
    fn poll_expired(&mut self) -> bool;
}

/// A software countdown counting poll ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftCountdown {
    deadline: u32,
    elapsed: u32,
    running: bool,
}

impl SoftCountdown {
    /// Creates a stopped countdown that expires after `deadline` ticks.
    pub const fn new(deadline: u32) -> Self {
        Self {
            deadline,
            elapsed: 0,
            running: false,
        }
    }

    /// Ticks counted since the last start.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }
}

impl Countdown for SoftCountdown {
    fn start(&mut self) {
        self.elapsed = 0;
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl PolledCountdown for SoftCountdown {
    fn poll_expired(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed >= self.deadline {
            // One-shot: the frame handler stops it as well, but never report twice
            self.running = false;
            return true;
        }
        false
    }
}

/// Clock parameters of the frame countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// CPU clock in Hz.
    pub f_cpu: u32,
    /// Timer clock prescaler (e.g. 64, 256, 1024).
    pub prescaler: u32,
    /// Inter-bit gap, in milliseconds, that ends a frame.
    pub timeout_ms: u16,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            f_cpu: DEFAULT_F_CPU,
            prescaler: DEFAULT_PRESCALER,
            timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
        }
    }
}

impl TimerConfig {
    /// Timer ticks needed for the configured timeout.
    pub fn ticks(&self) -> u32 {
        compute_compare_value(self.f_cpu, self.prescaler, f32::from(self.timeout_ms))
    }

    /// Compare value for a timer register of type `T` (`u8` for 8-bit timers, ...).
    ///
    /// # Errors
    /// [`BridgeError::CompareOverflow`] if the tick count does not fit in `T`.
    pub fn compare_value<T: TryFrom<u32>>(&self) -> Result<T, BridgeError> {
        let ticks = self.ticks();
        T::try_from(ticks).map_err(|_| BridgeError::CompareOverflow { ticks })
    }

    /// Deadline for a [`SoftCountdown`] polled every `poll_us` microseconds.
    ///
    /// # Errors
    /// [`BridgeError::ZeroPollInterval`] if `poll_us` is zero.
    pub fn poll_ticks(&self, poll_us: u32) -> Result<u32, BridgeError> {
        if poll_us == 0 {
            return Err(BridgeError::ZeroPollInterval);
        }
        let timeout_us = u32::from(self.timeout_ms) * 1_000;
        Ok(timeout_us.div_ceil(poll_us))
    }
}

/// Computes the compare value for a CTC-mode timer.
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 64, 256, 1024)
/// - `timeout_ms`: desired countdown in milliseconds
///
/// # Returns
/// - Timer ticks until the deadline, rounded to the nearest integer
pub fn compute_compare_value(f_cpu: u32, prescaler: u32, timeout_ms: f32) -> u32 {
    let ticks_per_second = f_cpu as f32 / prescaler as f32;
    roundf(ticks_per_second * (timeout_ms / 1_000.0)) as u32
}

/// Compile-time compare value calculator.
///
/// Same as [`compute_compare_value`] with whole milliseconds, truncating instead of
/// rounding.
pub const fn const_compare_value(f_cpu: u32, prescaler: u32, timeout_ms: u32) -> u32 {
    ((f_cpu / prescaler) as u64 * timeout_ms as u64 / 1_000) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_value_matches_table() {
        assert_eq!(compute_compare_value(1_000_000, 256, 50.0), 195);
        assert_eq!(compute_compare_value(1_000_000, 1024, 50.0), 49);
        assert_eq!(compute_compare_value(8_000_000, 1024, 50.0), 391);
        assert_eq!(compute_compare_value(16_000_000, 1024, 16.0), 250);
        assert_eq!(const_compare_value(16_000_000, 1024, 16), 250);
    }

    #[test]
    fn test_compare_value_checks_register_width() {
        let config = TimerConfig::default();
        assert_eq!(config.compare_value::<u8>(), Ok(195));

        let fast = TimerConfig {
            f_cpu: 8_000_000,
            prescaler: 1024,
            timeout_ms: 50,
        };
        assert_eq!(
            fast.compare_value::<u8>(),
            Err(BridgeError::CompareOverflow { ticks: 391 })
        );
        assert_eq!(fast.compare_value::<u16>(), Ok(391));
    }

    #[test]
    fn test_poll_ticks() {
        let config = TimerConfig::default();
        assert_eq!(config.poll_ticks(100), Ok(500));
        assert_eq!(config.poll_ticks(3), Ok(16_667));
        assert_eq!(config.poll_ticks(0), Err(BridgeError::ZeroPollInterval));
    }

    #[test]
    fn test_soft_countdown_fires_once() {
        let mut countdown = SoftCountdown::new(3);
        assert!(!countdown.poll_expired());

        countdown.start();
        assert!(countdown.is_running());
        assert!(!countdown.poll_expired());
        assert!(!countdown.poll_expired());
        assert!(countdown.poll_expired());
        assert!(!countdown.is_running());
        assert!(!countdown.poll_expired());
    }

    #[test]
    fn test_soft_countdown_restart_resets_elapsed() {
        let mut countdown = SoftCountdown::new(3);
        countdown.start();
        assert!(!countdown.poll_expired());
        assert!(!countdown.poll_expired());
        countdown.start();
        assert_eq!(countdown.elapsed(), 0);
        assert!(!countdown.poll_expired());
        assert!(!countdown.poll_expired());
        assert!(countdown.poll_expired());
    }

    #[test]
    fn test_stopped_countdown_never_expires() {
        let mut countdown = SoftCountdown::new(1);
        countdown.start();
        countdown.stop();
        assert!(!countdown.poll_expired());
    }
}

//! Wiegand line classification.
//!
//! Both data lines idle high. A reader signals one bit by pulling exactly one line low
//! for a few tens of microseconds. Which line carries the `1` bits is a wiring
//! convention, captured by [`DataLine`].

/// One of the two Wiegand data lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DataLine {
    /// DATA0, conventionally pulsed for a `0` bit.
    D0,
    /// DATA1, conventionally pulsed for a `1` bit.
    D1,
}

/// What the current pair of line levels means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LineState {
    /// Exactly one line is low: a bit pulse carrying the given value.
    Pulse(bool),
    /// Both lines are high. This is the end of a pulse or an idle bus.
    Released,
    /// Both lines are low at once. The reader is disconnected or the lines are shorted.
    Disconnected,
}

/// Classifies a pair of line levels.
///
/// # Arguments
/// - `d0_low`, `d1_low`: whether each line currently reads low
/// - `one_line`: the line whose pulse encodes a `1`
pub fn classify(d0_low: bool, d1_low: bool, one_line: DataLine) -> LineState {
    match (d0_low, d1_low) {
        (true, true) => LineState::Disconnected,
        (false, false) => LineState::Released,
        (true, false) => LineState::Pulse(one_line == DataLine::D0),
        (false, true) => LineState::Pulse(one_line == DataLine::D1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_pulses_follow_wiring() {
        assert_eq!(classify(false, true, DataLine::D1), LineState::Pulse(true));
        assert_eq!(classify(true, false, DataLine::D1), LineState::Pulse(false));
        // Swapped wiring inverts the meaning of each line
        assert_eq!(classify(false, true, DataLine::D0), LineState::Pulse(false));
        assert_eq!(classify(true, false, DataLine::D0), LineState::Pulse(true));
    }

    #[test]
    fn test_both_lines_classified_without_bit() {
        assert_eq!(classify(false, false, DataLine::D1), LineState::Released);
        assert_eq!(classify(true, true, DataLine::D1), LineState::Disconnected);
    }
}

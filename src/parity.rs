//! Frame validation and parity stripping policy.
//!
//! Wiegand frames carry no end marker and no length field, so the only thing known
//! about a frame at timeout is its bit count. The policy maps `bits % 4` to a
//! [`FrameRule`]:
//!
//! | `bits % 4` | Rule                          | Example formats         |
//! |------------|-------------------------------|-------------------------|
//! | 0          | [`FrameRule::Keep`]           | 32-bit, 64-bit raw      |
//! | 1, 3       | [`FrameRule::Reject`]         | not defined on the wire |
//! | 2          | [`FrameRule::StripParity`]    | 26-bit, 34-bit          |
//!
//! Formats with `bits % 4 == 2` wrap the data in a leading even-parity bit and a
//! trailing odd-parity bit. Stripping removes both, leaving `bits - 2` data bits
//! aligned at bit 0 of the accumulator. The parity values themselves are not checked.

/// How a finalized frame of a given length is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameRule {
    /// The frame is malformed and dropped.
    Reject,
    /// The frame is passed through unchanged.
    Keep,
    /// The leading and trailing parity bits are removed.
    StripParity,
}

/// Lookup table from `bits % 4` to [`FrameRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityPolicy {
    rules: [FrameRule; 4],
}

impl ParityPolicy {
    /// The rules used by common access-control readers.
    pub const STANDARD: Self = Self::new([
        FrameRule::Keep,
        FrameRule::Reject,
        FrameRule::StripParity,
        FrameRule::Reject,
    ]);

    /// Creates a policy from a table indexed by `bits % 4`.
    pub const fn new(rules: [FrameRule; 4]) -> Self {
        Self { rules }
    }

    /// Returns the rule for a frame of `bits` bits.
    pub const fn rule_for(&self, bits: u8) -> FrameRule {
        self.rules[(bits % 4) as usize]
    }

    /// Number of data bits left once the rule for `bits` has been applied.
    pub const fn data_bits(&self, bits: u8) -> u8 {
        match self.rule_for(bits) {
            FrameRule::Reject => 0,
            FrameRule::Keep => bits,
            FrameRule::StripParity => bits.saturating_sub(2),
        }
    }

    /// Number of payload bytes the host reads after the length prefix.
    pub const fn payload_len(&self, bits: u8) -> usize {
        self.data_bits(bits).div_ceil(8) as usize
    }
}

impl Default for ParityPolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Removes the leading and trailing parity bits from a `bits`-long accumulator.
///
/// The shift drops the leading bit and moves the trailing one to `bits - 2`, where it
/// is cleared.
pub const fn strip_parity(buffer: u64, bits: u8) -> u64 {
    if bits < 2 {
        return 0;
    }
    (buffer >> 1) & !(1u64 << (bits - 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STANDARD_FRAME_BITS;

    #[test]
    fn test_standard_rules_by_length() {
        let policy = ParityPolicy::default();
        assert_eq!(
            policy.rule_for(STANDARD_FRAME_BITS),
            FrameRule::StripParity
        );
        assert_eq!(policy.rule_for(34), FrameRule::StripParity);
        assert_eq!(policy.rule_for(32), FrameRule::Keep);
        assert_eq!(policy.rule_for(17), FrameRule::Reject);
        assert_eq!(policy.rule_for(35), FrameRule::Reject);
    }

    #[test]
    fn test_payload_len_accounts_for_stripped_bits() {
        let policy = ParityPolicy::default();
        assert_eq!(policy.payload_len(26), 3);
        assert_eq!(policy.payload_len(34), 4);
        assert_eq!(policy.payload_len(38), 5);
        assert_eq!(policy.payload_len(32), 4);
        assert_eq!(policy.payload_len(36), 5);
        assert_eq!(policy.payload_len(64), 8);
        assert_eq!(policy.payload_len(17), 0);
    }

    #[test]
    fn test_strip_parity_drops_both_ends() {
        // 26 bits: parity 1, data all ones, parity 1
        let buffer = (1u64 << 26) - 1;
        let stripped = strip_parity(buffer, 26);
        assert_eq!(stripped, (1u64 << 24) - 1);
    }

    #[test]
    fn test_strip_parity_keeps_data_order() {
        // received 0, 1, 0, 1, 0, 1: parity 0, data 1 0 1 0, parity 1
        let buffer = 0b101010;
        assert_eq!(strip_parity(buffer, 6), 0b0101);
    }

    #[test]
    fn test_custom_policy_overrides_table() {
        let policy = ParityPolicy::new([FrameRule::Keep; 4]);
        assert_eq!(policy.rule_for(17), FrameRule::Keep);
        assert_eq!(policy.payload_len(17), 3);
    }
}

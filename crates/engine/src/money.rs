use std::fmt;

use serde::{Deserialize, Serialize};

/// Money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (monthly amounts,
/// contributions, payouts) to avoid floating-point drift. Positivity is
/// enforced where it matters (a pool's monthly amount); the raw value stays
/// signed so a bad row surfaces as a visible negative instead of wrapping.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked multiplication by a plain factor (returns `None` on overflow).
    ///
    /// Used to compute a pool pot (`monthly_amount * member count`).
    #[must_use]
    pub fn checked_mul(self, factor: i64) -> Option<MoneyCents> {
        self.0.checked_mul(factor).map(MoneyCents)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_cents() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn is_positive_excludes_zero() {
        assert!(MoneyCents::new(1).is_positive());
        assert!(!MoneyCents::ZERO.is_positive());
        assert!(!MoneyCents::new(-1).is_positive());
    }

    #[test]
    fn checked_mul_scales_a_pot() {
        let monthly = MoneyCents::new(10_000);
        assert_eq!(monthly.checked_mul(5), Some(MoneyCents::new(50_000)));
        assert_eq!(MoneyCents::new(i64::MAX).checked_mul(2), None);
    }
}

//! Level-weighted topological height.

use std::fmt;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Height of a deduction in the layered layout.
///
/// Stored as a normalized `Decimal` so that `7.2` computed two different ways
/// compares, hashes and prints identically. Heights are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(Decimal);

impl Height {
    pub const ZERO: Height = Height(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Height(value.normalize())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_integral(&self) -> bool {
        self.0.fract().is_zero()
    }

    /// Largest whole height not above this one.
    pub fn floor(&self) -> Height {
        Height::new(self.0.floor())
    }
}

impl Add<Decimal> for Height {
    type Output = Height;

    /// Saturates at `Decimal::MAX` instead of overflowing.
    fn add(self, rhs: Decimal) -> Height {
        match self.0.checked_add(rhs) {
            Some(sum) => Height::new(sum),
            None => {
                tracing::warn!(height = %self.0, increment = %rhs, "height overflow, saturating");
                Height(Decimal::MAX)
            }
        }
    }
}

impl From<u32> for Height {
    fn from(v: u32) -> Self {
        Height::new(Decimal::from(v))
    }
}

impl From<Decimal> for Height {
    fn from(v: Decimal) -> Self {
        Height::new(v)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalized_equality() {
        assert_eq!(Height::new(dec!(1.0)), Height::new(dec!(1)));
        assert_eq!(Height::new(dec!(1.0)).to_string(), "1");
        assert_eq!((Height::ZERO + dec!(6.6) + dec!(0.6)).to_string(), "7.2");
    }

    #[test]
    fn test_exact_sum() {
        let a = Height::ZERO + dec!(0.1) + dec!(0.2);
        assert_eq!(a, Height::new(dec!(0.3)));
    }

    #[test]
    fn test_add_saturates() {
        let top = Height::new(Decimal::MAX);
        assert_eq!(top + dec!(1), top);
        assert_eq!(top + Decimal::ZERO, top);
    }

    #[test]
    fn test_floor_and_integral() {
        let h = Height::new(dec!(7.2));
        assert!(!h.is_integral());
        assert_eq!(h.floor(), Height::from(7));
        assert!(Height::from(3).is_integral());
    }
}

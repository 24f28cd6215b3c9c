use crate::primitives::Amount;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("percentage {0} is above 100")]
pub struct PercentOutOfRange(pub u8);

/// Whole-number percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percent {
    value: u8,
}

impl Percent {
    pub const TEN: Percent = Percent { value: 10 };

    pub fn new(value: u8) -> Result<Self, PercentOutOfRange> {
        if value > 100 {
            return Err(PercentOutOfRange(value));
        }
        Ok(Percent { value })
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// `floor(amount * value / 100)`, `None` if the intermediate product overflows.
    pub fn of(&self, amount: Amount) -> Option<Amount> {
        amount
            .checked_mul(self.value as u128)
            .map(|scaled| Amount::new(scaled.value() / 100))
    }
}

impl TryFrom<u8> for Percent {
    type Error = PercentOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Percent::new(value)
    }
}

impl From<Percent> for u8 {
    fn from(percent: Percent) -> Self {
        percent.value
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.value)
    }
}

/// Value types shared by the currency ledger and the ticket registry
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a ledger participant (a buyer, the organizer, the registry itself).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AccountId {
    value: String,
}

impl AccountId {
    pub fn new(value: impl Into<String>) -> Self {
        AccountId { value: value.into() }
    }
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        AccountId::new(value)
    }
}

impl FromStr for AccountId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AccountId::new(s))
    }
}

/// Currency amount in indivisible units.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Amount {
    value: u128,
}

impl Amount {
    pub const ZERO: Amount = Amount { value: 0 };

    pub const fn new(value: u128) -> Self {
        Amount { value }
    }
    pub fn value(&self) -> u128 {
        self.value
    }
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.value.checked_add(other.value).map(Amount::new)
    }
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.value.checked_sub(other.value).map(Amount::new)
    }
    pub fn checked_mul(self, factor: u128) -> Option<Amount> {
        self.value.checked_mul(factor).map(Amount::new)
    }
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::new(value as u128)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Amount {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>().map(Amount::new)
    }
}

/// Sequential ticket identifier, the first issued ticket is #1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TicketId {
    value: u64,
}

impl TicketId {
    pub const FIRST: TicketId = TicketId { value: 1 };

    pub const fn new(value: u64) -> Self {
        TicketId { value }
    }
    pub fn value(&self) -> u64 {
        self.value
    }
    /// The identifier issued after `issued` tickets already exist.
    pub fn after(issued: u64) -> Option<TicketId> {
        issued.checked_add(1).map(TicketId::new)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.value)
    }
}

impl FromStr for TicketId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse::<u64>().map(TicketId::new)
    }
}

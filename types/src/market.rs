use crate::fixed::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker of a simulated asset, always upper case.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(ticker: &str) -> Self {
        Self(ticker.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Amount of an asset to buy or sell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Units(Decimal),
    /// As much as the balance affords when buying, every unit held when selling.
    Max,
}

/// Administrative change to a holder's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingAdjustment {
    Add(Decimal),
    /// Removes up to the given quantity, never going below zero.
    Remove(Decimal),
    Set(Decimal),
}

/// Current price of an asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: Decimal,
    /// Price at the start of the retained history.
    pub opening: Decimal,
}

/// An account's holding of one asset, valued at the current price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub price: Decimal,
    pub value: Decimal,
}

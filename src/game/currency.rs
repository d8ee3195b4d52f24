//! # Currencies
//!
//! The five settlement resources and the purse that holds them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A settlement resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    Money,
    Seeds,
    Wood,
    Stone,
    Crop,
}

impl Currency {
    pub const COUNT: usize = 5;

    pub const ALL: [Currency; Currency::COUNT] = [
        Currency::Money,
        Currency::Seeds,
        Currency::Wood,
        Currency::Stone,
        Currency::Crop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Currency::Money => "money",
            Currency::Seeds => "seeds",
            Currency::Wood => "wood",
            Currency::Stone => "stone",
            Currency::Crop => "crop",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A price in one or more currencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub items: Vec<(Currency, i32)>,
}

impl Cost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` of `currency` to the price. Zero amounts are dropped.
    pub fn with(mut self, currency: Currency, amount: i32) -> Self {
        if amount != 0 {
            self.items.push((currency, amount));
        }
        self
    }

    pub fn is_free(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_free() {
            return f.write_str("free");
        }
        let parts: Vec<String> = self
            .items
            .iter()
            .map(|(currency, amount)| format!("{} {}", amount, currency))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Currency counters of a session.
///
/// No floor is enforced; callers check affordability before spending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purse {
    amounts: [i32; Currency::COUNT],
}

impl Purse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, currency: Currency) -> i32 {
        self.amounts[currency.index()]
    }

    pub fn set(&mut self, currency: Currency, amount: i32) {
        self.amounts[currency.index()] = amount;
    }

    /// Adds `delta` (possibly negative) and returns the new amount.
    pub fn add(&mut self, currency: Currency, delta: i32) -> i32 {
        let slot = &mut self.amounts[currency.index()];
        *slot += delta;
        *slot
    }

    pub fn can_afford(&self, cost: &Cost) -> bool {
        cost.items
            .iter()
            .all(|&(currency, amount)| self.get(currency) >= amount)
    }
}

impl std::ops::Index<Currency> for Purse {
    type Output = i32;

    fn index(&self, currency: Currency) -> &i32 {
        &self.amounts[currency.index()]
    }
}

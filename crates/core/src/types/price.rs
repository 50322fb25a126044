//! Price representation using decimal arithmetic.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in euros, the shop's only currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price {
    /// Amount in euros, not cents.
    pub amount: Decimal,
}

impl Price {
    /// Symbol suffixed to displayed amounts.
    pub const SYMBOL: &'static str = "€";

    /// Create a price in euros.
    #[must_use]
    pub const fn eur(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Format for display, e.g. `899.99 €`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2} {}", self.amount.round_dp(2), Self::SYMBOL)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

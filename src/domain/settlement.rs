use std::fmt;

use serde::{Deserialize, Serialize};

/// A directed payment instruction between two participants or two groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settlement {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

impl Settlement {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Renders the instruction with a currency symbol, e.g. `B pays A: ₹100.00`.
    pub fn describe(&self, currency_symbol: &str) -> String {
        format!(
            "{} pays {}: {}{:.2}",
            self.from, self.to, currency_symbol, self.amount
        )
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(""))
    }
}

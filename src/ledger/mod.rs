//! The trip expense ledger and its share/payment sums.

#[allow(clippy::module_inception)]
pub mod ledger;

pub use ledger::Ledger;

//! Net positions per participant, derived fresh from the ledger.

use serde::{Deserialize, Serialize};

use crate::domain::round_cents;
use crate::ledger::Ledger;

/// Paid, owed, and net figures for one participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantBalance {
    pub name: String,
    /// Unrounded sum of the shares this participant owes.
    pub share: f64,
    /// Cash paid out of pocket, rounded to cents.
    pub gross_paid: f64,
    /// `paid - share`, rounded to cents. Positive means the trip owes them.
    pub balance: f64,
    /// `false` when the participant neither paid nor owes anything.
    pub active: bool,
}

/// Balances for every participant in ledger order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceReport {
    pub participants: Vec<ParticipantBalance>,
    pub total_amount: f64,
}

impl BalanceReport {
    pub fn get(&self, name: &str) -> Option<&ParticipantBalance> {
        self.participants.iter().find(|p| p.name == name)
    }

    pub fn balance_of(&self, name: &str) -> f64 {
        self.get(name).map(|p| p.balance).unwrap_or(0.0)
    }

    pub fn balances(&self) -> Vec<(&str, f64)> {
        self.participants
            .iter()
            .map(|p| (p.name.as_str(), p.balance))
            .collect()
    }

    pub fn totals(&self) -> Vec<(&str, f64)> {
        self.participants
            .iter()
            .map(|p| (p.name.as_str(), p.share))
            .collect()
    }

    pub fn gross_spending(&self) -> Vec<(&str, f64)> {
        self.participants
            .iter()
            .map(|p| (p.name.as_str(), p.gross_paid))
            .collect()
    }

    pub fn active_spenders(&self) -> impl Iterator<Item = &ParticipantBalance> {
        self.participants.iter().filter(|p| p.active)
    }
}

pub struct BalanceService;

impl BalanceService {
    pub fn compute_balances(ledger: &Ledger) -> BalanceReport {
        let participants = ledger
            .participants
            .iter()
            .map(|name| {
                let share = ledger.share_of(name);
                let paid = ledger.paid_of(name);
                ParticipantBalance {
                    name: name.clone(),
                    share,
                    gross_paid: round_cents(paid),
                    balance: round_cents(paid - share),
                    active: paid > 0.0 || share > 0.0,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            trip = %ledger.name,
            records = ledger.record_count(),
            participants = participants.len(),
            "computed balances"
        );

        BalanceReport {
            participants,
            total_amount: ledger.total_amount(),
        }
    }
}

//! Turns balances or pairwise debts into payment instructions.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{is_settled, round_cents, Settlement, SETTLEMENT_EPSILON};
use crate::ledger::Ledger;

/// Directed debts keyed by `(debtor, creditor)`.
pub type DirectedFlows = BTreeMap<(String, String), f64>;

pub struct SettlementService;

impl SettlementService {
    /// Greedy netting over final balances (positive = owed money).
    ///
    /// The largest debtor pays the largest creditor until either side runs
    /// out. Equal amounts are ordered by name so repeated runs agree. At most
    /// `n - 1` instructions are produced for `n` unbalanced parties.
    pub fn net_settlements<'a, I>(balances: I) -> Vec<Settlement>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut debtors: Vec<(&str, f64)> = Vec::new();
        let mut creditors: Vec<(&str, f64)> = Vec::new();
        for (name, balance) in balances {
            if balance < -SETTLEMENT_EPSILON {
                debtors.push((name, -balance));
            } else if balance > SETTLEMENT_EPSILON {
                creditors.push((name, balance));
            }
        }
        debtors.sort_by(largest_first);
        creditors.sort_by(largest_first);

        let mut settlements = Vec::new();
        let (mut d, mut c) = (0, 0);
        while d < debtors.len() && c < creditors.len() {
            let pay = debtors[d].1.min(creditors[c].1);
            if pay > SETTLEMENT_EPSILON {
                settlements.push(Settlement::new(
                    debtors[d].0,
                    creditors[c].0,
                    round_cents(pay),
                ));
            }
            debtors[d].1 -= pay;
            creditors[c].1 -= pay;
            if is_settled(debtors[d].1) {
                d += 1;
            }
            if is_settled(creditors[c].1) {
                c += 1;
            }
        }
        settlements
    }

    /// Payer-aware settlement: every eligible participant owes the payer their
    /// share, and each pair is netted against its reverse flow.
    pub fn pairwise_settlements(ledger: &Ledger) -> Vec<Settlement> {
        let mut owes = DirectedFlows::new();
        for record in &ledger.records {
            let Some(share) = record.share_per_head() else {
                continue;
            };
            for debtor in record.eligibility.eligible() {
                if debtor == record.payer {
                    continue;
                }
                *owes
                    .entry((debtor.to_string(), record.payer.clone()))
                    .or_insert(0.0) += share;
            }
        }
        Self::net_directed_flows(&owes)
    }

    /// Nets each unordered pair and emits one instruction in the direction of
    /// the larger flow. Pairs netting to zero at cent precision are dropped.
    pub fn net_directed_flows(flows: &DirectedFlows) -> Vec<Settlement> {
        let pairs: BTreeSet<(&str, &str)> = flows
            .keys()
            .filter(|(from, to)| from != to)
            .map(|(from, to)| {
                if from < to {
                    (from.as_str(), to.as_str())
                } else {
                    (to.as_str(), from.as_str())
                }
            })
            .collect();

        let flow = |from: &str, to: &str| {
            flows
                .get(&(from.to_string(), to.to_string()))
                .copied()
                .unwrap_or(0.0)
        };

        let mut settlements = Vec::new();
        for (a, b) in pairs {
            let diff = flow(a, b) - flow(b, a);
            let amount = round_cents(diff.abs());
            if amount <= 0.0 {
                continue;
            }
            if diff > 0.0 {
                settlements.push(Settlement::new(a, b, amount));
            } else {
                settlements.push(Settlement::new(b, a, amount));
            }
        }
        settlements
    }

    /// Applies `settlements` to `balances`: payers move up, receivers down.
    pub fn apply<'a, I>(balances: I, settlements: &[Settlement]) -> BTreeMap<String, f64>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut remaining: BTreeMap<String, f64> = balances
            .into_iter()
            .map(|(name, balance)| (name.to_string(), balance))
            .collect();
        for settlement in settlements {
            *remaining.entry(settlement.from.clone()).or_insert(0.0) += settlement.amount;
            *remaining.entry(settlement.to.clone()).or_insert(0.0) -= settlement.amount;
        }
        remaining
    }
}

fn largest_first(a: &(&str, f64), b: &(&str, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

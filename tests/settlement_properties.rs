mod common;

use common::ledger_with;
use trip_core::config::TripConfig;
use trip_core::core::services::{BalanceService, SettlementService};
use trip_core::core::TripSummary;
use trip_core::domain::SETTLEMENT_EPSILON;

const PEOPLE: &[&str] = &["A", "B", "C", "D", "E"];

fn busy_ledger() -> trip_core::ledger::Ledger {
    ledger_with(
        PEOPLE,
        &[
            ("A", 300.0, &["A", "B", "C"]),
            ("B", 100.0, &["A", "B", "C", "D", "E"]),
            ("D", 47.5, &["C", "E"]),
            ("E", 12.34, &["A", "D", "E"]),
            ("C", 90.0, &["A", "B"]),
        ],
    )
}

#[test]
fn single_dinner_matches_expected_balances() {
    let ledger = ledger_with(&["A", "B", "C"], &[("A", 300.0, &["A", "B", "C"])]);
    let report = BalanceService::compute_balances(&ledger);

    assert_eq!(report.balance_of("A"), 200.0);
    assert_eq!(report.balance_of("B"), -100.0);
    assert_eq!(report.balance_of("C"), -100.0);

    let lines: Vec<String> = SettlementService::net_settlements(report.balances())
        .iter()
        .map(|s| s.describe("₹"))
        .collect();
    assert_eq!(lines, vec!["B pays A: ₹100.00", "C pays A: ₹100.00"]);
}

#[test]
fn balances_sum_to_zero() {
    let report = BalanceService::compute_balances(&busy_ledger());
    let sum: f64 = report.balances().iter().map(|(_, b)| b).sum();
    // Each balance is rounded to cents, so the sum may drift by half a cent each.
    assert!(sum.abs() <= 0.005 * PEOPLE.len() as f64, "sum was {sum}");
}

#[test]
fn applying_settlements_clears_every_balance() {
    let report = BalanceService::compute_balances(&busy_ledger());
    let settlements = SettlementService::net_settlements(report.balances());

    assert!(settlements.len() < PEOPLE.len());
    assert!(settlements.iter().all(|s| s.amount > SETTLEMENT_EPSILON));

    let remaining = SettlementService::apply(report.balances(), &settlements);
    for (name, balance) in remaining {
        assert!(balance.abs() <= 2.0 * SETTLEMENT_EPSILON, "{name} left with {balance}");
    }
}

#[test]
fn results_are_idempotent() {
    let ledger = busy_ledger();
    let first = TripSummary::compute(&ledger, &TripConfig::default());
    let second = TripSummary::compute(&ledger, &TripConfig::default());
    assert_eq!(first.balances, second.balances);
    assert_eq!(first.settlements, second.settlements);
    assert_eq!(first.pairwise, second.pairwise);
}

#[test]
fn uneven_split_rounds_to_cents() {
    let ledger = ledger_with(&["A", "B", "C"], &[("A", 100.0, &["A", "B", "C"])]);
    let report = BalanceService::compute_balances(&ledger);
    assert_eq!(report.balance_of("A"), 66.67);
    assert_eq!(report.balance_of("B"), -33.33);

    let settlements = SettlementService::net_settlements(report.balances());
    let amounts: Vec<f64> = settlements.iter().map(|s| s.amount).collect();
    assert_eq!(amounts, vec![33.33, 33.33]);
}

#[test]
fn pairwise_settlements_follow_who_paid_for_whom() {
    let ledger = ledger_with(
        &["A", "B", "C"],
        &[("A", 300.0, &["A", "B", "C"]), ("B", 60.0, &["A", "B"])],
    );
    let pairwise = SettlementService::pairwise_settlements(&ledger);
    let lines: Vec<String> = pairwise.iter().map(|s| s.to_string()).collect();
    assert_eq!(lines, vec!["B pays A: 70.00", "C pays A: 100.00"]);
}

#[test]
fn applying_pairwise_settlements_clears_every_balance() {
    let ledger = ledger_with(
        PEOPLE,
        &[
            ("A", 300.0, &["A", "B", "C"]),
            ("B", 100.0, &["A", "B", "C", "D", "E"]),
            ("D", 48.0, &["C", "E"]),
            ("E", 12.0, &["A", "D", "E"]),
            ("C", 90.0, &["A", "B"]),
        ],
    );
    let report = BalanceService::compute_balances(&ledger);
    let pairwise = SettlementService::pairwise_settlements(&ledger);

    assert!(pairwise.iter().all(|s| s.amount > SETTLEMENT_EPSILON));
    let remaining = SettlementService::apply(report.balances(), &pairwise);
    for (name, balance) in remaining {
        assert!(balance.abs() <= SETTLEMENT_EPSILON, "{name} left with {balance}");
    }
}

#[test]
fn share_text_lists_payments_under_trip_title() {
    let ledger = ledger_with(&["A", "B", "C"], &[("A", 300.0, &["A", "B", "C"])]);
    let summary = TripSummary::compute(&ledger, &TripConfig::default());
    insta::assert_snapshot!(summary.share_text("₹"), @r"
    *Trip: Fixture*
    B pays A: ₹100.00
    C pays A: ₹100.00
    ");
}

#[test]
fn settled_trip_produces_no_instructions() {
    let ledger = ledger_with(
        &["A", "B"],
        &[("A", 50.0, &["A", "B"]), ("B", 50.0, &["A", "B"])],
    );
    let summary = TripSummary::compute(&ledger, &TripConfig::default());
    assert!(summary.settlements.is_empty());
    assert!(summary.pairwise.is_empty());
    assert_eq!(summary.share_text("₹"), "*Trip: Fixture*");
}

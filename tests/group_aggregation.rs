mod common;

use common::ledger_with;
use trip_core::core::services::{BalanceService, GroupService, SettlementService};
use trip_core::domain::{AggregationWarning, Group, GroupRoster};

fn dinner_roster() -> (trip_core::ledger::Ledger, GroupRoster) {
    let ledger = ledger_with(&["A", "B", "C"], &[("A", 300.0, &["A", "B", "C"])]);
    let roster: GroupRoster = [
        Group::new("G1", ["A", "B"]),
        Group::new("G2", ["B", "C"]),
    ]
    .into_iter()
    .collect();
    (ledger, roster)
}

#[test]
fn shared_member_is_split_across_groups() {
    let (ledger, roster) = dinner_roster();
    let balances = BalanceService::compute_balances(&ledger);
    let report = GroupService::compute_group_stats(&roster, &balances);

    let g1 = report.get("G1").expect("G1 present");
    let g2 = report.get("G2").expect("G2 present");
    assert_eq!(g1.net_balance, 150.0);
    assert_eq!(g2.net_balance, -150.0);
    assert_eq!(g1.total_gross_paid, 300.0);
    assert_eq!(g2.total_gross_paid, 0.0);
    assert_eq!(g1.total_allocated_share, 150.0);
    assert_eq!(g2.total_allocated_share, 150.0);

    let b_in_g1 = g1.members.iter().find(|m| m.name == "B").unwrap();
    assert_eq!(b_in_g1.divisor, 2);
    assert_eq!(b_in_g1.effective_balance, -50.0);
    assert_eq!(b_in_g1.effective_share, 50.0);
    assert!(report.warnings.is_empty());
}

#[test]
fn payer_in_two_groups_splits_gross_paid() {
    let ledger = ledger_with(&["A", "B", "C"], &[("A", 300.0, &["A", "B", "C"])]);
    let roster: GroupRoster = [
        Group::new("G1", ["A", "B"]),
        Group::new("G2", ["A", "C"]),
    ]
    .into_iter()
    .collect();
    let balances = BalanceService::compute_balances(&ledger);
    let report = GroupService::compute_group_stats(&roster, &balances);

    for name in ["G1", "G2"] {
        let group = report.get(name).expect("group present");
        let a = group.members.iter().find(|m| m.name == "A").unwrap();
        assert_eq!(a.divisor, 2, "{name}");
        assert_eq!(a.effective_gross, 150.0, "{name}");
        assert_eq!(a.effective_share, 50.0, "{name}");
        assert_eq!(a.effective_balance, 100.0, "{name}");
        assert_eq!(group.total_gross_paid, 150.0, "{name}");
        assert_eq!(group.total_allocated_share, 150.0, "{name}");
        assert_eq!(group.net_balance, 0.0, "{name}");
    }
    assert!(GroupService::group_settlements(&report).is_empty());
}

#[test]
fn opposing_inter_group_debts_are_netted() {
    let ledger = ledger_with(
        &["A", "B", "C", "D"],
        &[("A", 100.0, &["A", "C"]), ("D", 80.0, &["D", "B"])],
    );
    let roster: GroupRoster = [
        Group::new("G1", ["A", "B"]),
        Group::new("G2", ["C", "D"]),
    ]
    .into_iter()
    .collect();

    let pairwise = SettlementService::pairwise_settlements(&ledger);
    let individual: Vec<String> = pairwise.iter().map(|s| s.to_string()).collect();
    assert_eq!(individual, vec!["C pays A: 50.00", "B pays D: 40.00"]);

    let inter = GroupService::inter_group_settlements(&pairwise, &roster);
    let lines: Vec<String> = inter.settlements.iter().map(|s| s.describe("₹")).collect();
    assert_eq!(lines, vec!["G2 pays G1: ₹10.00"]);
    assert!(inter.warnings.is_empty());

    let balances = BalanceService::compute_balances(&ledger);
    let stats = GroupService::compute_group_stats(&roster, &balances);
    let lines: Vec<String> = GroupService::group_settlements(&stats)
        .iter()
        .map(|s| s.describe("₹"))
        .collect();
    assert_eq!(lines, vec!["G2 pays G1: ₹10.00"]);
}

#[test]
fn group_settlement_nets_group_balances() {
    let (ledger, roster) = dinner_roster();
    let balances = BalanceService::compute_balances(&ledger);
    let report = GroupService::compute_group_stats(&roster, &balances);

    let settlements = GroupService::group_settlements(&report);
    let lines: Vec<String> = settlements.iter().map(|s| s.describe("₹")).collect();
    assert_eq!(lines, vec!["G2 pays G1: ₹150.00"]);
}

#[test]
fn group_totals_conserve_member_balances() {
    let ledger = ledger_with(
        &["A", "B", "C", "D"],
        &[
            ("A", 120.0, &["A", "B", "C", "D"]),
            ("C", 80.0, &["B", "C"]),
            ("D", 33.0, &["A", "D"]),
        ],
    );
    let roster: GroupRoster = [
        Group::new("Front", ["A", "B"]),
        Group::new("Back", ["B", "C", "D"]),
        Group::new("Drivers", ["A", "D"]),
    ]
    .into_iter()
    .collect();
    let balances = BalanceService::compute_balances(&ledger);
    let report = GroupService::compute_group_stats(&roster, &balances);

    let group_sum: f64 = report.groups.iter().map(|g| g.net_balance).sum();
    let member_sum: f64 = roster
        .grouped_members()
        .iter()
        .map(|name| balances.balance_of(name))
        .sum();
    assert!((group_sum - member_sum).abs() < 0.02, "{group_sum} vs {member_sum}");
}

#[test]
fn unknown_members_are_skipped_with_a_warning() {
    let ledger = ledger_with(&["A", "B"], &[("A", 10.0, &["A", "B"])]);
    let roster: GroupRoster = [Group::new("Crew", ["A", "Zed"])].into_iter().collect();
    let balances = BalanceService::compute_balances(&ledger);
    let report = GroupService::compute_group_stats(&roster, &balances);

    let crew = report.get("Crew").unwrap();
    assert_eq!(crew.members.len(), 1);
    assert_eq!(crew.net_balance, 5.0);
    assert_eq!(
        report.warnings,
        vec![AggregationWarning::UnknownParticipant {
            group: "Crew".into(),
            member: "Zed".into(),
        }]
    );
}

#[test]
fn inter_group_attribution_uses_last_registered_group() {
    let (ledger, roster) = dinner_roster();
    let pairwise = SettlementService::pairwise_settlements(&ledger);
    let report = GroupService::inter_group_settlements(&pairwise, &roster);

    let lines: Vec<String> = report.settlements.iter().map(|s| s.describe("₹")).collect();
    assert_eq!(lines, vec!["G2 pays G1: ₹200.00"]);
    assert_eq!(
        report.warnings,
        vec![AggregationWarning::AmbiguousGroupMembership {
            participant: "B".into(),
            groups: vec!["G1".into(), "G2".into()],
            chosen: "G2".into(),
        }]
    );
}

#[test]
fn intra_group_and_ungrouped_debts_are_ignored() {
    let ledger = ledger_with(
        &["A", "B", "C", "D"],
        &[("A", 90.0, &["A", "B", "C"]), ("D", 20.0, &["A", "D"])],
    );
    let roster: GroupRoster = [Group::new("Friends", ["A", "B", "C"])].into_iter().collect();
    let pairwise = SettlementService::pairwise_settlements(&ledger);
    let report = GroupService::inter_group_settlements(&pairwise, &roster);

    assert!(report.settlements.is_empty());
    assert!(report.warnings.is_empty());
}

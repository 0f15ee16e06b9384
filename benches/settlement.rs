use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trip_core::core::services::{BalanceService, SettlementService};
use trip_core::domain::ExpenseDraft;
use trip_core::ledger::Ledger;

fn synthetic_ledger(participants: usize, expenses: usize) -> Ledger {
    let names: Vec<String> = (0..participants).map(|i| format!("P{i:03}")).collect();
    let mut ledger = Ledger::new("Bench", names.iter().cloned());
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    for i in 0..expenses {
        let payer = names[i % participants].clone();
        let split: Vec<String> = names
            .iter()
            .enumerate()
            .filter(|(idx, _)| (idx + i) % 3 != 0)
            .map(|(_, name)| name.clone())
            .collect();
        let draft = ExpenseDraft::new(date, "bench", payer, 10.0 + (i % 97) as f64, split);
        let record = ledger.record_from_draft(draft).unwrap();
        ledger.upsert_record(record).unwrap();
    }
    ledger
}

fn settlement_benchmark(c: &mut Criterion) {
    let ledger = synthetic_ledger(50, 2_000);
    let report = BalanceService::compute_balances(&ledger);

    c.bench_function("compute_balances_50x2000", |b| {
        b.iter(|| BalanceService::compute_balances(black_box(&ledger)))
    });
    c.bench_function("net_settlements_50", |b| {
        b.iter(|| SettlementService::net_settlements(black_box(report.balances())))
    });
    c.bench_function("pairwise_settlements_50x2000", |b| {
        b.iter(|| SettlementService::pairwise_settlements(black_box(&ledger)))
    });
}

criterion_group!(benches, settlement_benchmark);
criterion_main!(benches);

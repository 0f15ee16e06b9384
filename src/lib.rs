#![doc(test(attr(deny(warnings))))]

//! Trip Core tracks shared trip expenses and works out who owes whom:
//! per-participant balances, minimal settlement plans, and proportional
//! roll-ups for overlapping sub-groups of travellers.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Trip Core tracing initialized.");
    });
}

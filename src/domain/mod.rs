pub mod common;
pub mod expense;
pub mod group;
pub mod settlement;

pub use common::{is_settled, round_cents, SETTLEMENT_EPSILON};
pub use expense::{new_record_id, Eligibility, ExpenseDraft, ExpenseRecord};
pub use group::{AggregationWarning, Group, GroupRoster};
pub use settlement::Settlement;

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
pub use uuid;

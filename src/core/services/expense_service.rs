//! Business logic helpers for managing expense records.

use crate::domain::{ExpenseDraft, ExpenseRecord};
use crate::ledger::Ledger;

use super::ServiceResult;

/// Provides validated CRUD helpers for ledger expenses.
pub struct ExpenseService;

impl ExpenseService {
    /// Saves `draft`, replacing the record with the same id if there is one.
    /// Returns the id of the stored record.
    pub fn save(ledger: &mut Ledger, draft: ExpenseDraft) -> ServiceResult<String> {
        let record = ledger.record_from_draft(draft)?;
        let id = record.id.clone();
        let replaced = ledger.upsert_record(record)?;
        tracing::debug!(trip = %ledger.name, %id, replaced, "expense saved");
        Ok(id)
    }

    /// Removes the record identified by `id`, returning the removed instance.
    pub fn remove(ledger: &mut Ledger, id: &str) -> ServiceResult<ExpenseRecord> {
        Ok(ledger.remove_record(id)?)
    }

    /// Returns the ledger's records ordered by date, then insertion.
    pub fn list(ledger: &Ledger) -> Vec<&ExpenseRecord> {
        let mut records: Vec<&ExpenseRecord> = ledger.records.iter().collect();
        records.sort_by_key(|record| record.date);
        records
    }
}

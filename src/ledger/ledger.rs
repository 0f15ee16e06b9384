use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{new_record_id, Eligibility, ExpenseDraft, ExpenseRecord};
use crate::errors::LedgerError;

pub(crate) const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The expense ledger of a single trip, the source every balance derives from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub name: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub records: Vec<ExpenseRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new<I, S>(name: impl Into<String>, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        let mut ledger = Self {
            name: name.into(),
            participants: Vec::new(),
            records: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        };
        for participant in participants {
            ledger.add_participant(participant);
        }
        ledger
    }

    /// Adds a participant unless the name is blank or already present.
    pub fn add_participant(&mut self, name: impl Into<String>) -> bool {
        let name = name.into().trim().to_string();
        if name.is_empty() || self.has_participant(&name) {
            return false;
        }
        self.participants.push(name);
        self.touch();
        true
    }

    pub fn has_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }

    /// Validates `record` against this ledger and inserts or replaces it by id.
    /// Returns `true` when an existing record was replaced.
    pub fn upsert_record(&mut self, record: ExpenseRecord) -> Result<bool, LedgerError> {
        self.check_record(&record)?;

        let replaced = match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.records.push(record);
                false
            }
        };
        self.touch();
        Ok(replaced)
    }

    /// Builds a record from `draft`, marking eligibility for every participant.
    pub fn record_from_draft(&self, draft: ExpenseDraft) -> Result<ExpenseRecord, LedgerError> {
        let eligibility =
            Eligibility::from_selection(self.participants.iter().cloned(), &draft.split_between);
        let mut record = ExpenseRecord {
            id: draft.id.unwrap_or_else(new_record_id),
            date: draft.date,
            description: draft.description,
            payer: draft.payer,
            total_amount: draft.amount,
            eligibility,
        };
        // Names outside the participant list never made it into the map above.
        for name in &draft.split_between {
            if !self.has_participant(name) {
                record.eligibility.set(name.clone(), true);
            }
        }
        record.validate()?;
        Ok(record)
    }

    pub fn remove_record(&mut self, id: &str) -> Result<ExpenseRecord, LedgerError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))?;
        let removed = self.records.remove(index);
        self.touch();
        Ok(removed)
    }

    pub fn record(&self, id: &str) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Sum of the shares `participant` owes across every record.
    pub fn share_of(&self, participant: &str) -> f64 {
        self.records.iter().map(|r| r.share_for(participant)).sum()
    }

    /// Sum of the amounts `participant` paid out of pocket.
    pub fn paid_of(&self, participant: &str) -> f64 {
        self.records
            .iter()
            .filter(|r| r.payer == participant)
            .map(|r| r.total_amount)
            .sum()
    }

    pub fn total_amount(&self) -> f64 {
        self.records.iter().map(|r| r.total_amount).sum()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    /// Re-checks every stored record, e.g. after reading a ledger from disk.
    pub fn validate_records(&self) -> Result<(), LedgerError> {
        self.records
            .iter()
            .try_for_each(|record| self.check_record(record))
    }

    /// A record must be valid on its own and only name known participants.
    fn check_record(&self, record: &ExpenseRecord) -> Result<(), LedgerError> {
        record.validate()?;
        self.ensure_known(&record.payer)?;
        record
            .eligibility
            .eligible()
            .try_for_each(|name| self.ensure_known(name))
    }

    fn ensure_known(&self, name: &str) -> Result<(), LedgerError> {
        if self.has_participant(name) {
            Ok(())
        } else {
            Err(LedgerError::UnknownParticipant(format!(
                "`{}` is not a participant of trip `{}`",
                name, self.name
            )))
        }
    }
}

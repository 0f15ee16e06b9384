//! Expense records and the eligibility map that decides how they split.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

/// Generates the short identifier assigned to new expense records.
pub fn new_record_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Marks, per participant, whether they share in an expense.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Eligibility(BTreeMap<String, bool>);

impl Eligibility {
    /// Builds a map covering every participant, flagging those in `selected`.
    pub fn from_selection<P, S>(participants: P, selected: &[S]) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: AsRef<str>,
    {
        let map = participants
            .into_iter()
            .map(|name| {
                let name: String = name.into();
                let eligible = selected.iter().any(|s| s.as_ref() == name);
                (name, eligible)
            })
            .collect();
        Self(map)
    }

    pub fn set(&mut self, participant: impl Into<String>, eligible: bool) {
        self.0.insert(participant.into(), eligible);
    }

    pub fn is_eligible(&self, participant: &str) -> bool {
        self.0.get(participant).copied().unwrap_or(false)
    }

    /// Eligible participant names in name order.
    pub fn eligible(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, eligible)| **eligible)
            .map(|(name, _)| name.as_str())
    }

    pub fn eligible_count(&self) -> usize {
        self.0.values().filter(|eligible| **eligible).count()
    }

    /// Every participant named in the map, eligible or not.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Eligibility {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|name| (name.into(), true)).collect())
    }
}

/// One shared expense: a payer, an amount, and who it was spent on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub payer: String,
    pub total_amount: f64,
    pub eligibility: Eligibility,
}

impl ExpenseRecord {
    /// Creates a validated record with a freshly generated id.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        payer: impl Into<String>,
        total_amount: f64,
        eligibility: Eligibility,
    ) -> Result<Self, LedgerError> {
        let record = Self {
            id: new_record_id(),
            date,
            description: description.into(),
            payer: payer.into(),
            total_amount,
            eligibility,
        };
        record.validate()?;
        Ok(record)
    }

    /// Rejects amounts that would poison settlement math and records nobody shares.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.total_amount.is_finite() || self.total_amount < 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "expense `{}` has amount {}; expected a non-negative number",
                self.id, self.total_amount
            )));
        }
        if self.eligibility.eligible_count() == 0 {
            return Err(LedgerError::InvalidRecord(format!(
                "expense `{}` has no eligible participants",
                self.id
            )));
        }
        Ok(())
    }

    /// Equal split among eligible participants, `None` when nobody is eligible.
    pub fn share_per_head(&self) -> Option<f64> {
        match self.eligibility.eligible_count() {
            0 => None,
            count => Some(self.total_amount / count as f64),
        }
    }

    /// The portion of this expense owed by `participant`.
    pub fn share_for(&self, participant: &str) -> f64 {
        if !self.eligibility.is_eligible(participant) {
            return 0.0;
        }
        self.share_per_head().unwrap_or(0.0)
    }
}

/// Caller-supplied input for creating or replacing an expense record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub payer: String,
    pub amount: f64,
    pub split_between: Vec<String>,
}

impl ExpenseDraft {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        payer: impl Into<String>,
        amount: f64,
        split_between: Vec<String>,
    ) -> Self {
        Self {
            id: None,
            date,
            description: description.into(),
            payer: payer.into(),
            amount,
            split_between,
        }
    }

    /// Targets an existing record so saving replaces it.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn share_is_split_among_eligible_only() {
        let eligibility =
            Eligibility::from_selection(["A", "B", "C", "D"], &["A", "B", "C"]);
        let record = ExpenseRecord::new(date(), "Dinner", "D", 300.0, eligibility).unwrap();

        assert_eq!(record.share_for("A"), 100.0);
        assert_eq!(record.share_for("D"), 0.0);
        assert_eq!(record.share_for("stranger"), 0.0);
    }

    #[test]
    fn empty_eligibility_is_rejected() {
        let eligibility = Eligibility::from_selection(["A", "B"], &[] as &[&str]);
        let err = ExpenseRecord::new(date(), "Taxi", "A", 40.0, eligibility)
            .expect_err("no eligible participants");
        assert!(matches!(err, LedgerError::InvalidRecord(_)), "{err:?}");
    }

    #[test]
    fn non_finite_and_negative_amounts_are_rejected() {
        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let eligibility: Eligibility = ["A"].into_iter().collect();
            let err = ExpenseRecord::new(date(), "Bad", "A", amount, eligibility)
                .expect_err("invalid amount");
            assert!(matches!(err, LedgerError::InvalidAmount(_)), "{err:?}");
        }
    }

    #[test]
    fn generated_ids_are_short_hex() {
        let id = new_record_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

pub mod balance_service;
pub mod expense_service;
pub mod group_service;
pub mod settlement_service;

pub use balance_service::{BalanceReport, BalanceService, ParticipantBalance};
pub use expense_service::ExpenseService;
pub use group_service::{GroupReport, GroupService, GroupStats, InterGroupReport, MemberContribution};
pub use settlement_service::SettlementService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}

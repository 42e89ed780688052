//! Use cases - workflow orchestration.
//!
//! Each module contains the use cases for one domain area. Use cases pull
//! their dependencies in as port traits, keep handlers thin, and return
//! [`WorkflowError`] so the API layer can map failures uniformly.

pub mod completion;
pub mod habits;
pub mod ledger;
pub mod payments;
pub mod progress;
pub mod unlocks;
pub mod validation;

pub use completion::CompleteHabit;
pub use habits::HabitCrud;
pub use ledger::{PenaltyLedger, RewardLedger};
pub use payments::PaymentFlows;
pub use progress::ProfileOps;
pub use unlocks::{EvaluateUnlocks, UnlockSkill};

use habitquest_domain::DomainError;

use crate::infrastructure::ports::{GatewayError, RepoError};
use validation::ValidationError;

/// Shared error type for use cases.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl From<ValidationError> for WorkflowError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

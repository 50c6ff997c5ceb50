use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the ledger engine and its stores.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("For {subject}: amount is required when other fields are filled")]
    IncompleteEntry { subject: String },

    #[error("For {subject}: mode of payment is required when amount is filled")]
    MissingMode { subject: String },

    #[error("Amount {amount} exceeds remaining fees {remaining} for subject {subject}")]
    ExceedsRemaining {
        subject: String,
        amount: String,
        remaining: f64,
    },

    #[error("Total fees {total_fees} for subject {subject} is below the {paid} already paid")]
    FeesBelowPaid {
        subject: String,
        paid: f64,
        total_fees: f64,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Student not found: {0}")]
    StudentNotFound(i64),

    #[error("Student {0} already exists")]
    DuplicateStudent(i64),

    #[error("Subject index {index} out of range for student {student_id}")]
    UnknownSubject { student_id: i64, index: usize },

    #[error("Concurrent update detected for student {0}")]
    Conflict(i64),

    #[error("{0} requires admin access")]
    Forbidden(String),

    #[error("Persistence error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// True for optimistic-concurrency failures the caller should retry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::Conflict(_))
    }
}

pub type Result<T> = StdResult<T, LedgerError>;

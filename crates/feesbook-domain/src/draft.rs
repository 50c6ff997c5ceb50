//! Operator input rows awaiting validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// One candidate payment row as typed by an operator.
///
/// All fields are raw strings; validation promotes a draft into a
/// `PaymentEntry` or discards it. A draft with every field blank represents
/// an unused input row and is silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: String,
    pub amount: String,
    pub mode: String,
    pub received: String,
}

impl EntryDraft {
    /// Fresh input row stamped with the submission time and operator name,
    /// ready for amount/mode entry.
    pub fn stamped(at: DateTime<Utc>, received: impl Into<String>) -> Self {
        Self {
            date: timestamp::format_entry(at),
            amount: String::new(),
            mode: String::new(),
            received: received.into(),
        }
    }

    /// True when the operator typed nothing into the row; the pre-stamped
    /// date and receiver do not count.
    pub fn is_untouched(&self) -> bool {
        self.amount.trim().is_empty() && self.mode.trim().is_empty()
    }
}

/// A draft targeted at one subject of a student, by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectDraft {
    pub subject_index: usize,
    pub entry: EntryDraft,
}

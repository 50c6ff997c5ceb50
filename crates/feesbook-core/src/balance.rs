//! Balance derivation for subjects and students.
//!
//! Balances are always recomputed from the current `total_fees` and the full
//! entry list; nothing here is cached.

use feesbook_domain::{amount_or_zero, Student, Subject};
use tracing::warn;

/// Derived figures for one subject's fee line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectBalance {
    pub paid: f64,
    pub remaining: f64,
    /// Entries whose amount did not parse; they contributed zero to `paid`.
    pub malformed_amounts: usize,
}

/// Computes paid/remaining for a subject. A subject with no entries has
/// `paid = 0` and `remaining = total_fees`.
pub fn subject_balance(subject: &Subject) -> SubjectBalance {
    let (total_fees, fees_ok) = subject.total_fees_value();
    if !fees_ok {
        warn!(subject = %subject.subject_name, raw = %subject.total_fees, "malformed total fees treated as zero");
    }
    let mut paid = 0.0;
    let mut malformed_amounts = 0;
    for entry in &subject.columns {
        let (amount, ok) = entry.amount_value();
        if !ok {
            malformed_amounts += 1;
            warn!(subject = %subject.subject_name, raw = %entry.amount, "malformed entry amount treated as zero");
        }
        paid += amount;
    }
    SubjectBalance {
        paid,
        remaining: total_fees - paid,
        malformed_amounts,
    }
}

/// Sum of remaining balances across every subject of a student.
pub fn student_remaining(student: &Student) -> f64 {
    student
        .subjects
        .iter()
        .map(|subject| subject_balance(subject).remaining)
        .sum()
}

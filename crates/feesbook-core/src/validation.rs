//! Promotion of operator draft rows into payment entries.

use feesbook_domain::{amount_or_zero, EntryDraft, PaymentEntry, PaymentMode, Subject};

use crate::balance::subject_balance;
use crate::error::{LedgerError, Result};

/// Slack for the `amount <= remaining` check so an exact payoff is never
/// rejected by floating-point noise.
const AMOUNT_EPSILON: f64 = 1e-9;

/// Validates one draft against the subject's current state.
///
/// Returns `Ok(None)` for rows that should be silently dropped: one where
/// the operator typed nothing (amount and mode both blank, regardless of the
/// pre-stamped date and receiver) or one whose timestamp was never stamped.
/// Everything else either promotes to a normalized [`PaymentEntry`] or fails
/// with the validation error naming the subject.
///
/// Drafts appended earlier in the same batch must already be present in
/// `subject.columns` so the remaining balance they consumed is visible here.
pub fn validate_draft(subject: &Subject, draft: &EntryDraft) -> Result<Option<PaymentEntry>> {
    if draft.is_untouched() {
        return Ok(None);
    }

    let amount = draft.amount.trim();
    let (amount_value, numeric) = amount_or_zero(amount);
    if amount.is_empty() || !numeric {
        return Err(LedgerError::IncompleteEntry {
            subject: subject.subject_name.clone(),
        });
    }
    if amount_value <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "Amount for {} must be positive, got `{}`",
            subject.subject_name, amount
        )));
    }

    let mode = draft.mode.trim();
    if mode.is_empty() {
        return Err(LedgerError::MissingMode {
            subject: subject.subject_name.clone(),
        });
    }
    let mode: PaymentMode = mode
        .parse()
        .map_err(|err: feesbook_domain::ParsePaymentModeError| {
            LedgerError::Validation(format!("For {}: {}", subject.subject_name, err))
        })?;

    let remaining = subject_balance(subject).remaining;
    if amount_value > remaining + AMOUNT_EPSILON {
        return Err(LedgerError::ExceedsRemaining {
            subject: subject.subject_name.clone(),
            amount: amount.to_string(),
            remaining,
        });
    }

    let date = draft.date.trim();
    if date.is_empty() {
        // Valid amount on a row that was never stamped with a submission
        // time; treated like an unused row rather than an error.
        return Ok(None);
    }

    Ok(Some(PaymentEntry {
        date: date.to_string(),
        amount: amount.to_string(),
        mode,
        received: draft.received.trim().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feesbook_domain::PaymentMode;

    fn subject() -> Subject {
        let mut subject = Subject::new("Math", "500");
        subject.columns.push(PaymentEntry {
            date: "01/01/2024 10:00:00".into(),
            amount: "100".into(),
            mode: PaymentMode::Cash,
            received: "A".into(),
        });
        subject
    }

    fn draft(amount: &str, mode: &str) -> EntryDraft {
        EntryDraft {
            date: "02/01/2024 11:30:00".into(),
            amount: amount.into(),
            mode: mode.into(),
            received: "A".into(),
        }
    }

    #[test]
    fn blank_rows_are_discarded_silently() {
        assert!(validate_draft(&subject(), &EntryDraft::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn stamped_but_untouched_rows_are_discarded() {
        // A fresh row carries date and receiver before the operator types
        // anything; it must not count as an incomplete entry.
        let untouched = EntryDraft {
            date: "02/01/2024 11:30:00".into(),
            amount: String::new(),
            mode: String::new(),
            received: "A".into(),
        };
        assert!(validate_draft(&subject(), &untouched).unwrap().is_none());
    }

    #[test]
    fn missing_amount_with_other_fields_is_incomplete() {
        let err = validate_draft(&subject(), &draft("", "Cash")).unwrap_err();
        assert!(matches!(err, LedgerError::IncompleteEntry { .. }));
    }

    #[test]
    fn non_numeric_amount_is_incomplete() {
        let err = validate_draft(&subject(), &draft("12x", "Cash")).unwrap_err();
        assert!(matches!(err, LedgerError::IncompleteEntry { .. }));
    }

    #[test]
    fn amount_without_mode_is_rejected() {
        let err = validate_draft(&subject(), &draft("50", "")).unwrap_err();
        assert!(matches!(err, LedgerError::MissingMode { .. }));
    }

    #[test]
    fn amount_equal_to_remaining_is_accepted() {
        // 500 total, 100 paid: remaining is exactly 400.
        let entry = validate_draft(&subject(), &draft("400", "Online"))
            .unwrap()
            .expect("promoted");
        assert_eq!(entry.amount, "400");
        assert_eq!(entry.mode, PaymentMode::Online);
    }

    #[test]
    fn amount_just_over_remaining_is_rejected() {
        let err = validate_draft(&subject(), &draft("400.01", "Cash")).unwrap_err();
        match err {
            LedgerError::ExceedsRemaining {
                subject, remaining, ..
            } => {
                assert_eq!(subject, "Math");
                assert_eq!(remaining, 400.0);
            }
            other => panic!("expected ExceedsRemaining, got {other:?}"),
        }
    }

    #[test]
    fn promotion_trims_every_field() {
        let raw = EntryDraft {
            date: " 02/01/2024 11:30:00 ".into(),
            amount: " 50 ".into(),
            mode: " Cash ".into(),
            received: " A ".into(),
        };
        let entry = validate_draft(&subject(), &raw).unwrap().expect("promoted");
        assert_eq!(entry.date, "02/01/2024 11:30:00");
        assert_eq!(entry.amount, "50");
        assert_eq!(entry.received, "A");
    }

    #[test]
    fn unstamped_rows_with_valid_amount_are_dropped() {
        let mut raw = draft("50", "Cash");
        raw.date = String::new();
        assert!(validate_draft(&subject(), &raw).unwrap().is_none());
    }
}

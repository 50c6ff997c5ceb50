//! Append/merge of validated payment drafts into student documents.

use feesbook_domain::{timestamp, EntryDraft, PaymentMode, Student, SubjectDraft};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::session::Session;
use crate::store::StudentStore;
use crate::time::Clock;
use crate::validation::validate_draft;

/// Bounded retries for appends that lose an optimistic-concurrency race.
/// Each retry re-fetches and re-validates against the winner's state.
pub const MAX_APPEND_RETRIES: usize = 3;

/// A batch of drafts to append against one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendRequest {
    pub student_id: i64,
    pub drafts: Vec<SubjectDraft>,
}

/// One appended installment on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub subject_name: String,
    pub amount: String,
    pub mode: PaymentMode,
    pub received: String,
}

/// Printable record of one successful append batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub student_id: i64,
    pub student_name: String,
    /// Submission timestamp in the canonical entry format.
    pub recorded_at: String,
    pub lines: Vec<ReceiptLine>,
}

/// Result of a successful append: the merged document, its new version, the
/// receipt, and a fresh draft row per subject for the next payment session.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub student: Student,
    pub version: u64,
    pub receipt: Receipt,
    pub next_drafts: Vec<SubjectDraft>,
}

/// Records installment payments against a student's subjects.
pub struct PaymentService;

impl PaymentService {
    /// One empty draft row per subject, stamped with the current timestamp
    /// and the session operator as `received`.
    pub fn prepare_drafts(
        student: &Student,
        session: &Session,
        clock: &dyn Clock,
    ) -> Vec<SubjectDraft> {
        let now = clock.now();
        student
            .subjects
            .iter()
            .enumerate()
            .map(|(subject_index, _)| SubjectDraft {
                subject_index,
                entry: EntryDraft::stamped(now, session.operator()),
            })
            .collect()
    }

    /// Read-modify-write append of a draft batch.
    ///
    /// Fetches the current document, validates every draft against that
    /// snapshot, appends the survivors after the existing entries of their
    /// subject, and writes back conditioned on the version read. A conflict
    /// means another writer committed in between; the whole cycle is retried
    /// against the merged state so neither writer's entries are lost. The
    /// write is all-or-nothing for the batch; on any failure the store is
    /// untouched and the caller keeps its drafts for retry.
    pub fn append(
        store: &dyn StudentStore,
        session: &Session,
        clock: &dyn Clock,
        request: &AppendRequest,
    ) -> Result<AppendOutcome> {
        let mut attempts = 0;
        loop {
            let versioned = store.find_by_id(request.student_id)?;
            let mut student = versioned.student;
            let lines = Self::apply_drafts(&mut student, &request.drafts)?;

            if lines.is_empty() {
                // Nothing survived validation; skip the write so the stored
                // version is not bumped for a no-op.
                let next_drafts = Self::prepare_drafts(&student, session, clock);
                return Ok(AppendOutcome {
                    receipt: Self::receipt(&student, clock, Vec::new()),
                    next_drafts,
                    student,
                    version: versioned.version,
                });
            }

            match store.update(&student, versioned.version) {
                Ok(version) => {
                    info!(
                        student_id = student.id,
                        entries = lines.len(),
                        operator = session.operator(),
                        "appended payment batch"
                    );
                    let next_drafts = Self::prepare_drafts(&student, session, clock);
                    return Ok(AppendOutcome {
                        receipt: Self::receipt(&student, clock, lines),
                        next_drafts,
                        student,
                        version,
                    });
                }
                Err(err) if err.is_conflict() && attempts < MAX_APPEND_RETRIES => {
                    attempts += 1;
                    warn!(
                        student_id = request.student_id,
                        attempt = attempts,
                        "append lost update race, revalidating against current state"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Validates and appends drafts in memory. Existing entries are never
    /// reordered or truncated; survivors land after them in batch order.
    fn apply_drafts(student: &mut Student, drafts: &[SubjectDraft]) -> Result<Vec<ReceiptLine>> {
        let student_id = student.id;
        let mut lines = Vec::new();
        for draft in drafts {
            let subject = student.subject(draft.subject_index).ok_or(
                LedgerError::UnknownSubject {
                    student_id,
                    index: draft.subject_index,
                },
            )?;
            let Some(entry) = validate_draft(subject, &draft.entry)? else {
                continue;
            };
            lines.push(ReceiptLine {
                subject_name: subject.subject_name.clone(),
                amount: entry.amount.clone(),
                mode: entry.mode,
                received: entry.received.clone(),
            });
            // Index was checked above.
            if let Some(subject) = student.subject_mut(draft.subject_index) {
                subject.columns.push(entry);
            }
        }
        Ok(lines)
    }

    fn receipt(student: &Student, clock: &dyn Clock, lines: Vec<ReceiptLine>) -> Receipt {
        Receipt {
            id: Uuid::new_v4(),
            student_id: student.id,
            student_name: student.full_name(),
            recorded_at: timestamp::format_entry(clock.now()),
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStudentStore;
    use crate::session::Role;
    use crate::time::FixedClock;
    use chrono::{TimeZone, Utc};
    use feesbook_domain::Subject;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 1, 2, 11, 30, 0).unwrap())
    }

    fn session() -> Session {
        Session::new("A", Role::Staff)
    }

    fn stored_student() -> Student {
        Student {
            id: 42,
            first_name: "Asha".into(),
            middle_name: String::new(),
            last_name: "Patil".into(),
            college_name: "City College".into(),
            branch: "Science".into(),
            whatsapp_number: "9000000001".into(),
            calling_number: "9000000002".into(),
            subjects: vec![Subject::new("Math", "1000"), Subject::new("Physics", "800")],
            photo: None,
            qr_code: None,
            created_at: Utc::now(),
        }
    }

    fn request(drafts: Vec<(usize, &str, &str)>) -> AppendRequest {
        AppendRequest {
            student_id: 42,
            drafts: drafts
                .into_iter()
                .map(|(subject_index, amount, mode)| SubjectDraft {
                    subject_index,
                    entry: EntryDraft {
                        date: "02/01/2024 11:30:00".into(),
                        amount: amount.into(),
                        mode: mode.into(),
                        received: "A".into(),
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn append_merges_survivors_and_resets_drafts() {
        let store = MemoryStudentStore::seeded(vec![stored_student()]);
        let outcome = PaymentService::append(
            &store,
            &session(),
            &clock(),
            &request(vec![(0, "300", "Cash"), (1, "", "")]),
        )
        .expect("append succeeds");

        assert_eq!(outcome.student.subjects[0].columns.len(), 1);
        assert!(outcome.student.subjects[1].columns.is_empty());
        assert_eq!(outcome.version, 2);
        assert_eq!(outcome.receipt.lines.len(), 1);
        assert_eq!(outcome.receipt.lines[0].subject_name, "Math");
        assert_eq!(outcome.receipt.recorded_at, "02/01/2024 11:30:00");

        assert_eq!(outcome.next_drafts.len(), 2);
        assert!(outcome.next_drafts.iter().all(|draft| {
            draft.entry.amount.is_empty()
                && draft.entry.mode.is_empty()
                && draft.entry.received == "A"
                && draft.entry.date == "02/01/2024 11:30:00"
        }));

        let stored = store.find_by_id(42).unwrap();
        assert_eq!(stored.student, outcome.student);
    }

    #[test]
    fn blank_batch_is_a_no_op_without_version_bump() {
        let store = MemoryStudentStore::seeded(vec![stored_student()]);
        let outcome = PaymentService::append(
            &store,
            &session(),
            &clock(),
            &request(vec![(0, "", ""), (1, "", "")]),
        )
        .expect("blank batch is fine");
        assert!(outcome.receipt.lines.is_empty());
        assert_eq!(outcome.version, 1);
        assert_eq!(store.find_by_id(42).unwrap().version, 1);
    }

    #[test]
    fn failing_draft_aborts_the_whole_batch() {
        let store = MemoryStudentStore::seeded(vec![stored_student()]);
        let err = PaymentService::append(
            &store,
            &session(),
            &clock(),
            &request(vec![(0, "300", "Cash"), (1, "900", "Cash")]),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ExceedsRemaining { .. }));

        // No partial write: the valid Math draft must not have landed.
        let stored = store.find_by_id(42).unwrap();
        assert!(stored.student.subjects[0].columns.is_empty());
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn unknown_subject_index_is_rejected() {
        let store = MemoryStudentStore::seeded(vec![stored_student()]);
        let err = PaymentService::append(
            &store,
            &session(),
            &clock(),
            &request(vec![(5, "10", "Cash")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::UnknownSubject { index: 5, .. }
        ));
    }

    #[test]
    fn missing_student_surfaces_not_found() {
        let store = MemoryStudentStore::new();
        let err =
            PaymentService::append(&store, &session(), &clock(), &request(vec![(0, "1", "Cash")]))
                .unwrap_err();
        assert!(matches!(err, LedgerError::StudentNotFound(42)));
    }

    #[test]
    fn batch_drafts_share_the_remaining_balance() {
        let store = MemoryStudentStore::seeded(vec![stored_student()]);
        // Two drafts against Math: 600 + 500 > 1000 even though each alone fits.
        let err = PaymentService::append(
            &store,
            &session(),
            &clock(),
            &request(vec![(0, "600", "Cash"), (0, "500", "Online")]),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::ExceedsRemaining { .. }));
    }
}

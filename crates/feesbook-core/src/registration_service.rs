//! Registration, edit, and removal of student records.
//!
//! Payments never pass through here; the only mutation path for entry
//! columns is the payment service. All operations are admin-gated.

use chrono::{DateTime, Utc};
use feesbook_domain::{amount_or_zero, Student, Subject};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::balance::subject_balance;
use crate::error::{LedgerError, Result};
use crate::session::Session;
use crate::store::StudentStore;
use crate::time::Clock;

/// A new fee line before it is attached to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubject {
    pub subject_name: String,
    pub total_fees: String,
}

/// Registration form data for a new student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub college_name: String,
    pub branch: String,
    pub whatsapp_number: String,
    pub calling_number: String,
    pub subjects: Vec<NewSubject>,
}

/// Contact/identity fields an admin may change after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactUpdate {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub college_name: String,
    pub branch: String,
    pub whatsapp_number: String,
    pub calling_number: String,
}

/// Creates and maintains student records against the store.
pub struct RegistrationService;

impl RegistrationService {
    /// Validates and persists a new registration. The id is the epoch
    /// millisecond of the creation instant.
    ///
    /// `allowed_subjects` is the configured subject catalog; every fee line
    /// must name one of its entries.
    pub fn create(
        store: &dyn StudentStore,
        session: &Session,
        clock: &dyn Clock,
        draft: &NewStudent,
        allowed_subjects: &[String],
    ) -> Result<Student> {
        session.require_admin("student registration")?;
        Self::validate_new(draft, allowed_subjects)?;

        let now = clock.now();
        let student = Self::materialize(draft, now);
        store.create(&student)?;
        info!(student_id = student.id, name = %student.full_name(), "registered student");
        Ok(student)
    }

    /// Rewrites the contact fields of a student, leaving subjects and their
    /// payment histories untouched.
    pub fn update_contact(
        store: &dyn StudentStore,
        session: &Session,
        student_id: i64,
        changes: &ContactUpdate,
    ) -> Result<Student> {
        session.require_admin("student edit")?;
        let missing = Self::missing_contact_fields(changes);
        if !missing.is_empty() {
            return Err(LedgerError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let versioned = store.find_by_id(student_id)?;
        let mut student = versioned.student;
        student.first_name = changes.first_name.trim().to_string();
        student.middle_name = changes.middle_name.trim().to_string();
        student.last_name = changes.last_name.trim().to_string();
        student.college_name = changes.college_name.trim().to_string();
        student.branch = changes.branch.trim().to_string();
        student.whatsapp_number = changes.whatsapp_number.trim().to_string();
        student.calling_number = changes.calling_number.trim().to_string();
        store.update(&student, versioned.version)?;
        Ok(student)
    }

    /// Attaches a new fee line to an existing student.
    pub fn add_subject(
        store: &dyn StudentStore,
        session: &Session,
        student_id: i64,
        subject: &NewSubject,
        allowed_subjects: &[String],
    ) -> Result<Student> {
        session.require_admin("subject change")?;
        Self::validate_subject(subject, allowed_subjects)?;

        let versioned = store.find_by_id(student_id)?;
        let mut student = versioned.student;
        if student
            .subjects
            .iter()
            .any(|existing| existing.subject_name == subject.subject_name.trim())
        {
            return Err(LedgerError::Validation(format!(
                "Subject `{}` is already registered for this student",
                subject.subject_name.trim()
            )));
        }
        student.subjects.push(Subject::new(
            subject.subject_name.trim(),
            subject.total_fees.trim(),
        ));
        store.update(&student, versioned.version)?;
        Ok(student)
    }

    /// Changes the fee total of one subject. The `paid <= total_fees`
    /// invariant is enforced here, at the persistence boundary: lowering the
    /// total below what has already been collected is rejected.
    pub fn set_subject_fees(
        store: &dyn StudentStore,
        session: &Session,
        student_id: i64,
        subject_index: usize,
        total_fees: &str,
    ) -> Result<Student> {
        session.require_admin("fee change")?;
        let trimmed = total_fees.trim();
        let (fees, ok) = amount_or_zero(trimmed);
        if !ok || fees <= 0.0 {
            return Err(LedgerError::Validation(format!(
                "Total fees must be a positive amount, got `{trimmed}`"
            )));
        }

        let versioned = store.find_by_id(student_id)?;
        let mut student = versioned.student;
        let subject = student
            .subject_mut(subject_index)
            .ok_or(LedgerError::UnknownSubject {
                student_id,
                index: subject_index,
            })?;
        let paid = subject_balance(subject).paid;
        if fees < paid {
            return Err(LedgerError::FeesBelowPaid {
                subject: subject.subject_name.clone(),
                paid,
                total_fees: fees,
            });
        }
        subject.total_fees = trimmed.to_string();
        store.update(&student, versioned.version)?;
        Ok(student)
    }

    /// Deletes the student and every nested subject/entry as a unit.
    pub fn remove(store: &dyn StudentStore, session: &Session, student_id: i64) -> Result<()> {
        session.require_admin("student removal")?;
        store.delete(student_id)?;
        info!(student_id, "removed student record");
        Ok(())
    }

    fn materialize(draft: &NewStudent, now: DateTime<Utc>) -> Student {
        Student {
            id: now.timestamp_millis(),
            first_name: draft.first_name.trim().to_string(),
            middle_name: draft.middle_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            college_name: draft.college_name.trim().to_string(),
            branch: draft.branch.trim().to_string(),
            whatsapp_number: draft.whatsapp_number.trim().to_string(),
            calling_number: draft.calling_number.trim().to_string(),
            subjects: draft
                .subjects
                .iter()
                .map(|subject| Subject::new(subject.subject_name.trim(), subject.total_fees.trim()))
                .collect(),
            photo: None,
            qr_code: None,
            created_at: now,
        }
    }

    /// Collects every violation into one message, matching the original
    /// registration form's aggregated error list.
    fn validate_new(draft: &NewStudent, allowed_subjects: &[String]) -> Result<()> {
        let mut missing: Vec<String> = Vec::new();
        for (label, value) in [
            ("First Name", &draft.first_name),
            ("Last Name", &draft.last_name),
            ("College Name", &draft.college_name),
            ("Branch", &draft.branch),
            ("WhatsApp Number", &draft.whatsapp_number),
            ("Calling Number", &draft.calling_number),
        ] {
            if value.trim().is_empty() {
                missing.push(label.to_string());
            }
        }
        if draft.subjects.is_empty() {
            missing.push("at least one Subject".to_string());
        }
        for (index, subject) in draft.subjects.iter().enumerate() {
            if subject.subject_name.trim().is_empty() {
                missing.push(format!("Subject Name {}", index + 1));
            }
            if subject.total_fees.trim().is_empty() {
                missing.push(format!("Total Fees {}", index + 1));
            }
        }
        if !missing.is_empty() {
            return Err(LedgerError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }
        for subject in &draft.subjects {
            Self::validate_subject(subject, allowed_subjects)?;
        }
        Ok(())
    }

    fn validate_subject(subject: &NewSubject, allowed_subjects: &[String]) -> Result<()> {
        let name = subject.subject_name.trim();
        if !allowed_subjects.iter().any(|allowed| allowed == name) {
            return Err(LedgerError::Validation(format!(
                "Subject `{name}` is not in the configured subject list"
            )));
        }
        let (fees, ok) = amount_or_zero(&subject.total_fees);
        if !ok || fees <= 0.0 {
            return Err(LedgerError::Validation(format!(
                "Total fees for {} must be a positive amount, got `{}`",
                name,
                subject.total_fees.trim()
            )));
        }
        Ok(())
    }

    fn missing_contact_fields(changes: &ContactUpdate) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (label, value) in [
            ("First Name", &changes.first_name),
            ("Last Name", &changes.last_name),
            ("College Name", &changes.college_name),
            ("Branch", &changes.branch),
            ("WhatsApp Number", &changes.whatsapp_number),
            ("Calling Number", &changes.calling_number),
        ] {
            if value.trim().is_empty() {
                missing.push(label);
            }
        }
        missing
    }
}

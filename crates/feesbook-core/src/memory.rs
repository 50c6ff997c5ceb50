//! In-memory student store, for tests and embedded use.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use feesbook_domain::Student;

use crate::error::{LedgerError, Result};
use crate::store::{StudentStore, VersionedStudent};

/// Mutex-protected map keyed by student id, versioned per document. The
/// compare-and-swap in [`StudentStore::update`] behaves exactly like the
/// filesystem store so concurrency tests run against the same semantics.
///
/// Every mutation leaves the map consistent before the guard drops, so a
/// poisoned lock is recovered rather than cascading panics into readers.
#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    students: Mutex<BTreeMap<i64, (u64, Student)>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing students, each at version 1.
    pub fn seeded(students: Vec<Student>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.students.lock().unwrap_or_else(PoisonError::into_inner);
            for student in students {
                guard.insert(student.id, (1, student));
            }
        }
        store
    }
}

impl StudentStore for MemoryStudentStore {
    fn create(&self, student: &Student) -> Result<()> {
        let mut guard = self.students.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&student.id) {
            return Err(LedgerError::DuplicateStudent(student.id));
        }
        guard.insert(student.id, (1, student.clone()));
        Ok(())
    }

    fn find_by_id(&self, id: i64) -> Result<VersionedStudent> {
        let guard = self.students.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(&id)
            .map(|(version, student)| VersionedStudent {
                student: student.clone(),
                version: *version,
            })
            .ok_or(LedgerError::StudentNotFound(id))
    }

    fn load_all(&self) -> Result<Vec<Student>> {
        let guard = self.students.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.values().map(|(_, student)| student.clone()).collect())
    }

    fn update(&self, student: &Student, expected_version: u64) -> Result<u64> {
        let mut guard = self.students.lock().unwrap_or_else(PoisonError::into_inner);
        let (version, stored) = guard
            .get_mut(&student.id)
            .ok_or(LedgerError::StudentNotFound(student.id))?;
        if *version != expected_version {
            return Err(LedgerError::Conflict(student.id));
        }
        *version += 1;
        *stored = student.clone();
        Ok(*version)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let mut guard = self.students.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or(LedgerError::StudentNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use feesbook_domain::Subject;

    fn student(id: i64) -> Student {
        Student {
            id,
            first_name: "Asha".into(),
            middle_name: String::new(),
            last_name: "Patil".into(),
            college_name: "City College".into(),
            branch: "Science".into(),
            whatsapp_number: "9000000001".into(),
            calling_number: "9000000002".into(),
            subjects: vec![Subject::new("Math", "1000")],
            photo: None,
            qr_code: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stale_version_is_rejected_without_writing() {
        let store = MemoryStudentStore::seeded(vec![student(1)]);
        let fresh = store.find_by_id(1).unwrap();

        let mut first = fresh.student.clone();
        first.first_name = "First".into();
        store.update(&first, fresh.version).expect("first writer wins");

        let mut second = fresh.student.clone();
        second.first_name = "Second".into();
        let err = store.update(&second, fresh.version).unwrap_err();
        assert!(err.is_conflict());

        let current = store.find_by_id(1).unwrap();
        assert_eq!(current.student.first_name, "First");
        assert_eq!(current.version, 2);
    }

    #[test]
    fn create_rejects_duplicate_ids() {
        let store = MemoryStudentStore::new();
        store.create(&student(7)).unwrap();
        let err = store.create(&student(7)).unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateStudent(7)));
    }

    #[test]
    fn delete_removes_the_whole_document() {
        let store = MemoryStudentStore::seeded(vec![student(1)]);
        store.delete(1).unwrap();
        assert!(matches!(
            store.find_by_id(1).unwrap_err(),
            LedgerError::StudentNotFound(1)
        ));
    }
}

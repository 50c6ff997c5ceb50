//! Abstraction over the student document store.

use feesbook_domain::Student;

use crate::error::Result;

/// A student document together with the version the store handed out when it
/// was read. Updates must present this version back; a mismatch means a
/// concurrent writer got there first.
#[derive(Debug, Clone)]
pub struct VersionedStudent {
    pub student: Student,
    pub version: u64,
}

/// Persistence backends capable of storing student documents.
///
/// `update` is a compare-and-swap: the write succeeds only if the stored
/// version still equals `expected_version`, otherwise it fails with
/// [`crate::LedgerError::Conflict`] and writes nothing. That is the only
/// concurrency primitive the ledger engine relies on; every append is a full
/// read-modify-write of one document guarded by it.
pub trait StudentStore: Send + Sync {
    /// Persists a new student document at version 1. Fails with
    /// `DuplicateStudent` when the id is already taken.
    fn create(&self, student: &Student) -> Result<()>;

    /// Loads one student with its current version.
    fn find_by_id(&self, id: i64) -> Result<VersionedStudent>;

    /// Snapshot of every stored student, ordered by id.
    fn load_all(&self) -> Result<Vec<Student>>;

    /// Conditionally replaces a student document. Returns the new version.
    fn update(&self, student: &Student, expected_version: u64) -> Result<u64>;

    /// Removes a student and all nested data as a unit.
    fn delete(&self, id: i64) -> Result<()>;
}

//! feesbook-storage-json
//!
//! Filesystem-backed JSON persistence for student documents. One file per
//! student, each carrying a version counter used for compare-and-swap
//! updates, plus timestamped backups with retention pruning.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use feesbook_core::{LedgerError, Result, StudentStore, VersionedStudent};
use feesbook_domain::Student;

const DOCUMENT_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 10;

/// On-disk shape of one student document.
///
/// The version counter lives next to the student so a document copied
/// between machines carries its history position with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredStudent {
    version: u64,
    student: Student,
}

/// Directory-per-collection JSON store for student documents.
///
/// Writes go through a temp file and an atomic rename; the previous file
/// revision is copied into the backups directory before being replaced, and
/// old backups are pruned past the retention limit.
///
/// Mutations are serialized through `write_lock`, shared by every clone of
/// the store. Without it the version check and the write-back would be two
/// separate filesystem steps, and two writers presenting the same version
/// could both pass the check and silently lose one write.
#[derive(Debug, Clone)]
pub struct JsonStudentStore {
    students_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    write_lock: Arc<Mutex<()>>,
}

impl JsonStudentStore {
    pub fn new(students_dir: PathBuf, backups_dir: PathBuf) -> Result<Self> {
        Self::with_retention(students_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        students_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self> {
        fs::create_dir_all(&students_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            students_dir,
            backups_dir,
            retention: retention.max(1),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Store rooted at `base`, with `students/` and `backups/` below it.
    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        Self::new(base.join("students"), base.join("backups"))
    }

    pub fn student_path(&self, id: i64) -> PathBuf {
        self.students_dir
            .join(format!("{id}.{DOCUMENT_EXTENSION}"))
    }

    /// Backup file names for one student, newest first.
    pub fn list_backups(&self, id: i64) -> Result<Vec<String>> {
        let dir = self.backups_dir.join(id.to_string());
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort_by_key(|name| Reverse(parse_backup_timestamp(name)));
        Ok(names)
    }

    fn read_document(&self, path: &Path) -> Result<StoredStudent> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Serde(format!("corrupt student document {}: {err}", path.display()))
        })
    }

    fn write_document(&self, document: &StoredStudent) -> Result<()> {
        let path = self.student_path(document.student.id);
        let json = serde_json::to_string_pretty(document)
            .map_err(|err| LedgerError::Serde(err.to_string()))?;
        if path.exists() {
            self.backup_existing_file(document.student.id, &path)?;
        }
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn backup_existing_file(&self, id: i64, path: &Path) -> Result<()> {
        let dir = self.backups_dir.join(id.to_string());
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{id}_{timestamp}.{DOCUMENT_EXTENSION}");
        fs::copy(path, dir.join(file_name))?;
        self.prune_backups(id)?;
        Ok(())
    }

    fn prune_backups(&self, id: i64) -> Result<()> {
        let dir = self.backups_dir.join(id.to_string());
        for name in self.list_backups(id)?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(dir.join(name));
        }
        Ok(())
    }
}

impl JsonStudentStore {
    /// Serializes create/update/delete so the existence or version check and
    /// the write behind it happen as one step. A poisoned lock only means a
    /// previous writer panicked mid-mutation; the guard itself is stateless.
    fn mutation_guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl StudentStore for JsonStudentStore {
    fn create(&self, student: &Student) -> Result<()> {
        let _guard = self.mutation_guard();
        let path = self.student_path(student.id);
        if path.exists() {
            return Err(LedgerError::DuplicateStudent(student.id));
        }
        self.write_document(&StoredStudent {
            version: 1,
            student: student.clone(),
        })
    }

    fn find_by_id(&self, id: i64) -> Result<VersionedStudent> {
        let path = self.student_path(id);
        if !path.exists() {
            return Err(LedgerError::StudentNotFound(id));
        }
        let document = self.read_document(&path)?;
        Ok(VersionedStudent {
            student: document.student,
            version: document.version,
        })
    }

    fn load_all(&self) -> Result<Vec<Student>> {
        if !self.students_dir.exists() {
            return Ok(Vec::new());
        }
        let mut students = Vec::new();
        for entry in fs::read_dir(&self.students_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            students.push(self.read_document(&path)?.student);
        }
        students.sort_by_key(|student| student.id);
        Ok(students)
    }

    fn update(&self, student: &Student, expected_version: u64) -> Result<u64> {
        let _guard = self.mutation_guard();
        let path = self.student_path(student.id);
        if !path.exists() {
            return Err(LedgerError::StudentNotFound(student.id));
        }
        let current = self.read_document(&path)?;
        if current.version != expected_version {
            warn!(
                student_id = student.id,
                expected = expected_version,
                found = current.version,
                "stale write rejected"
            );
            return Err(LedgerError::Conflict(student.id));
        }
        let next = expected_version + 1;
        self.write_document(&StoredStudent {
            version: next,
            student: student.clone(),
        })?;
        Ok(next)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.mutation_guard();
        let path = self.student_path(id);
        if !path.exists() {
            return Err(LedgerError::StudentNotFound(id));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{DOCUMENT_EXTENSION}"))?;
    let (_, raw) = trimmed.split_once('_')?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

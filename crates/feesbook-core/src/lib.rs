//! feesbook-core
//!
//! The fee-ledger engine: draft validation, balance derivation, append/merge
//! against the student store, and report aggregation. Depends on
//! feesbook-domain. No CLI, no terminal I/O, no direct filesystem access.

pub mod balance;
pub mod error;
pub mod memory;
pub mod payment_service;
pub mod registration_service;
pub mod report_service;
pub mod session;
pub mod store;
pub mod time;
pub mod validation;

pub use balance::*;
pub use error::{LedgerError, Result};
pub use memory::MemoryStudentStore;
pub use payment_service::*;
pub use registration_service::*;
pub use report_service::*;
pub use session::{Role, Session};
pub use store::{StudentStore, VersionedStudent};
pub use time::{Clock, FixedClock, SystemClock};
pub use validation::validate_draft;

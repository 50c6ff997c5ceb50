//! feesbook-domain
//!
//! Pure domain models (Student, Subject, PaymentEntry, drafts) plus the
//! canonical entry timestamp format. No I/O, no CLI, no storage. Only data
//! types and core enums.

pub mod common;
pub mod draft;
pub mod payment;
pub mod student;
pub mod timestamp;

pub use common::*;
pub use draft::*;
pub use payment::*;
pub use student::*;

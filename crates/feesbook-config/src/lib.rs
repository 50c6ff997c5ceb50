//! feesbook-config
//!
//! Persistent application configuration: the admin-managed catalogs
//! (subjects, colleges, branches) registration validates against, plus the
//! data directory the document store lives in.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Catalogs, Config};

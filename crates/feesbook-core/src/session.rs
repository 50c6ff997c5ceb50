//! Explicit operator context for ledger operations.
//!
//! Built once at login and passed into every operation that stamps
//! `received` or checks a role; nothing reads ambient session state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Access level of the signed-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Staff,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "Admin",
            Role::Staff => "Staff",
        };
        f.write_str(label)
    }
}

/// The signed-in operator. The name recorded here is what gets stamped as
/// `received` on every entry the operator appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    operator: String,
    role: Role,
}

impl Session {
    pub fn new(operator: impl Into<String>, role: Role) -> Self {
        Self {
            operator: operator.into(),
            role,
        }
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Guards admin-only operations; `action` names the operation in the
    /// resulting error.
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(LedgerError::Forbidden(action.to_string()))
        }
    }
}

//! Domain models for recorded installment payments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::amount_or_zero;

/// Channel through which an installment was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Online,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Online => "Online",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentMode {
    type Err = ParsePaymentModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Cash" => Ok(PaymentMode::Cash),
            "Online" => Ok(PaymentMode::Online),
            other => Err(ParsePaymentModeError(other.to_string())),
        }
    }
}

/// Raised when a mode string is neither `Cash` nor `Online`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePaymentModeError(pub String);

impl fmt::Display for ParsePaymentModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown payment mode `{}`", self.0)
    }
}

impl std::error::Error for ParsePaymentModeError {}

/// One recorded installment against a subject.
///
/// Entries are append-only: once written they are never edited or removed
/// short of deleting the whole student. `received` is fixed at the moment of
/// payment and is not updated when staff records change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// Submission timestamp in the canonical `DD/MM/YYYY HH:MM:SS` format.
    pub date: String,
    /// Amount as entered, kept as a decimal string in the stored form.
    pub amount: String,
    pub mode: PaymentMode,
    /// Name of the staff member who recorded the payment.
    pub received: String,
}

impl PaymentEntry {
    /// Numeric value of the amount; malformed strings count as zero.
    pub fn amount_value(&self) -> (f64, bool) {
        amount_or_zero(&self.amount)
    }
}

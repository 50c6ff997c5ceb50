//! Domain models for registered students and their fee lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{amount_or_zero, Displayable, Identifiable};
use crate::payment::PaymentEntry;

/// A course/fee line owned by one student.
///
/// `total_fees` is fixed when the subject is added and only editable through
/// the admin edit flow; `columns` is the append-only installment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub subject_name: String,
    pub total_fees: String,
    #[serde(default)]
    pub columns: Vec<PaymentEntry>,
}

impl Subject {
    pub fn new(subject_name: impl Into<String>, total_fees: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            total_fees: total_fees.into(),
            columns: Vec::new(),
        }
    }

    /// Numeric value of `total_fees`; malformed strings count as zero.
    pub fn total_fees_value(&self) -> (f64, bool) {
        amount_or_zero(&self.total_fees)
    }
}

/// A registered student and the subjects they pay fees against.
///
/// Serialized field names match the stored document shape (`firstName`,
/// `whatsappNumber`, ...). Created once at registration; payments only ever
/// append to nested subject columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Epoch-millisecond identifier assigned at registration.
    pub id: i64,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub college_name: String,
    pub branch: String,
    pub whatsapp_number: String,
    pub calling_number: String,
    pub subjects: Vec<Subject>,
    /// Opaque reference to an uploaded profile image, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Opaque reference to the generated identity QR artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        let mut name = self.first_name.trim().to_string();
        for part in [&self.middle_name, &self.last_name] {
            let part = part.trim();
            if !part.is_empty() {
                if !name.is_empty() {
                    name.push(' ');
                }
                name.push_str(part);
            }
        }
        name
    }

    pub fn subject(&self, index: usize) -> Option<&Subject> {
        self.subjects.get(index)
    }

    pub fn subject_mut(&mut self, index: usize) -> Option<&mut Subject> {
        self.subjects.get_mut(index)
    }
}

impl Identifiable for Student {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Displayable for Student {
    fn display_label(&self) -> String {
        format!("{} ({})", self.full_name(), self.id)
    }
}

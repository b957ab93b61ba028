//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient owned by a user and linked to one or more cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub patient_id: i64,
    /// Owning user
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    /// Free-text allergies and medical history
    pub allergies_medical_history: Option<String>,
    /// The owning user registered themselves as the patient
    pub is_self: bool,
    pub invite_email: Option<String>,
    pub location: String,
    pub postal_code: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl Patient {
    /// Whether this patient carries the given natural identity.
    pub fn matches_identity(&self, identity: &PatientIdentity<'_>) -> bool {
        self.user_id == identity.user_id
            && self.first_name == identity.first_name
            && self.last_name == identity.last_name
            && self.date_of_birth == identity.date_of_birth
    }
}

/// Natural key used to reuse an existing patient for the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientIdentity<'a> {
    pub user_id: i64,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub date_of_birth: NaiveDate,
}

/// Fields required to create a patient row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub allergies_medical_history: Option<String>,
    pub is_self: bool,
    pub invite_email: Option<String>,
    pub location: String,
    pub postal_code: String,
}

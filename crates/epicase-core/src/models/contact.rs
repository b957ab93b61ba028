//! Emergency contact models.

use serde::{Deserialize, Serialize};

/// An emergency contact attached to a case, unique per (case, email).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyContact {
    pub contact_id: i64,
    pub case_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub invite_sent: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmergencyContact {
    pub case_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub invite_sent: bool,
}

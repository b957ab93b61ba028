//! Medication (spray slot) models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status assigned to a freshly recorded spray.
pub const DEFAULT_MEDICATION_STATUS: &str = "pending";

/// Valid spray slots per case.
pub const SPRAY_SLOTS: [u8; 2] = [1, 2];

/// Check a spray number against the slot catalog.
pub fn is_valid_spray_number(spray_number: u8) -> bool {
    SPRAY_SLOTS.contains(&spray_number)
}

/// Medication metadata for one spray slot of a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub spray_id: i64,
    /// Numeric case key
    pub case_id: i64,
    /// 1 or 2
    pub spray_number: u8,
    pub status: String,
    pub expiration_date_spray_1: NaiveDate,
    pub lot_number_spray_1: Option<String>,
    pub expiration_date_spray_2: NaiveDate,
    pub lot_number_spray_2: Option<String>,
    pub dosage_details: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

/// Fields required to create a medication row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMedication {
    pub case_id: i64,
    pub spray_number: u8,
    pub status: String,
    pub expiration_date_spray_1: NaiveDate,
    pub lot_number_spray_1: Option<String>,
    pub expiration_date_spray_2: NaiveDate,
    pub lot_number_spray_2: Option<String>,
    pub dosage_details: Option<String>,
}

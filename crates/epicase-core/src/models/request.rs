//! Request payloads accepted by the workflow operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AccountStatus, DeliveryChannel, DeliveryMethods};

/// Create-or-update payload for a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseRegistration {
    /// Caller-controlled case code
    pub case_id: String,
    pub case_name: String,
    #[serde(default)]
    pub battery_level: Option<i64>,
    #[serde(default)]
    pub connection_status: Option<String>,
}

/// Link-or-create payload for the patient of a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRegistration {
    /// Target case code
    pub case_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub location: String,
    pub postal_code: String,
    #[serde(default)]
    pub allergies_medical_history: Option<String>,
    #[serde(default)]
    pub is_self: Option<bool>,
    #[serde(default)]
    pub invite_email: Option<String>,
}

/// Upsert payload for one spray slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationRegistration {
    pub case_id: String,
    pub spray_number: u8,
    pub expiration_date_spray_1: NaiveDate,
    pub expiration_date_spray_2: NaiveDate,
    #[serde(default)]
    pub lot_number_spray_1: Option<String>,
    #[serde(default)]
    pub lot_number_spray_2: Option<String>,
    #[serde(default)]
    pub dosage_details: Option<String>,
}

/// Notification settings for one case as supplied by the caller.
///
/// Accepts either `delivery_method` (single string) or `delivery_methods`
/// (list) in serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPreferenceInput {
    pub case_id: String,
    pub enabled: bool,
    #[serde(default, alias = "delivery_method", alias = "delivery_methods")]
    pub delivery: Option<DeliveryMethods>,
    #[serde(default)]
    pub alert_schedule: Option<String>,
}

/// Notification settings for one case after validation: channels resolved
/// to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPreferenceRequest {
    pub case_id: String,
    pub enabled: bool,
    pub channels: Vec<DeliveryChannel>,
    pub alert_schedule: Option<String>,
}

impl NotificationPreferenceRequest {
    /// Value written to `delivery_method`: joined channels when enabled.
    pub fn stored_delivery_method(&self) -> Option<String> {
        if self.enabled && !self.channels.is_empty() {
            Some(DeliveryChannel::join(&self.channels))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub send_invite: bool,
}

/// One email or a batch of emails to invite to a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InviteTarget {
    Single(String),
    Many(Vec<String>),
}

/// User provisioning payload from the external-auth sign-up flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRegistration {
    pub entra_oid: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub account_status: Option<AccountStatus>,
}

//! Outbound views returned by workflow operations.
//!
//! Views expose case codes rather than internal numeric case keys.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{
    AccountStatus, Case, DeliveryChannel, EmergencyContact, InvitedUser, Medication,
    NotificationPreference, NotificationType, Patient, User, WorkflowStep,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientSummary {
    pub patient_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub user_id: i64,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            patient_id: patient.patient_id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            user_id: patient.user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CaseView {
    pub case_id: String,
    pub patient_id: Option<i64>,
    pub case_name: String,
    pub battery_level: Option<i64>,
    pub last_seen: Option<String>,
    pub connection_status: Option<String>,
    pub workflow_state: Option<WorkflowStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientSummary>,
}

impl CaseView {
    pub fn new(case: &Case, patient: Option<&Patient>) -> Self {
        Self {
            case_id: case.case_id.clone(),
            patient_id: case.patient_id,
            case_name: case.case_name.clone(),
            battery_level: case.battery_level,
            last_seen: case.last_seen.clone(),
            connection_status: case.connection_status.clone(),
            workflow_state: case.step(),
            patient: patient.map(PatientSummary::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientView {
    pub patient_id: i64,
    pub user_id: i64,
    pub case_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub allergies_medical_history: Option<String>,
    pub is_self: bool,
    pub invite_email: Option<String>,
    pub location: String,
    pub postal_code: String,
    pub workflow_state: WorkflowStep,
}

impl PatientView {
    pub fn new(patient: &Patient, case_code: &str, workflow_state: WorkflowStep) -> Self {
        Self {
            patient_id: patient.patient_id,
            user_id: patient.user_id,
            case_id: case_code.to_string(),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            date_of_birth: patient.date_of_birth,
            allergies_medical_history: patient.allergies_medical_history.clone(),
            is_self: patient.is_self,
            invite_email: patient.invite_email.clone(),
            location: patient.location.clone(),
            postal_code: patient.postal_code.clone(),
            workflow_state,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MedicationView {
    pub spray_id: i64,
    pub case_id: String,
    pub spray_number: u8,
    pub status: String,
    pub expiration_date_spray_1: NaiveDate,
    pub lot_number_spray_1: Option<String>,
    pub expiration_date_spray_2: NaiveDate,
    pub lot_number_spray_2: Option<String>,
    pub dosage_details: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub workflow_state: Option<WorkflowStep>,
}

impl MedicationView {
    pub fn new(medication: &Medication, case_code: &str, workflow_state: Option<WorkflowStep>) -> Self {
        Self {
            spray_id: medication.spray_id,
            case_id: case_code.to_string(),
            spray_number: medication.spray_number,
            status: medication.status.clone(),
            expiration_date_spray_1: medication.expiration_date_spray_1,
            lot_number_spray_1: medication.lot_number_spray_1.clone(),
            expiration_date_spray_2: medication.expiration_date_spray_2,
            lot_number_spray_2: medication.lot_number_spray_2.clone(),
            dosage_details: medication.dosage_details.clone(),
            created_at: medication.created_at.clone(),
            updated_at: medication.updated_at.clone(),
            workflow_state,
        }
    }
}

/// Result of a notification bulk upsert.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationSummary {
    /// Preference rows inserted
    pub created: usize,
    /// Preference rows updated in place
    pub updated: usize,
    /// Distinct case codes configured, in request order
    pub cases: Vec<String>,
    pub workflow_state: WorkflowStep,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationPreferenceView {
    pub notification_pref_id: i64,
    pub case_id: String,
    pub notification_type: NotificationType,
    pub enabled: bool,
    pub delivery_methods: Vec<DeliveryChannel>,
}

impl NotificationPreferenceView {
    pub fn new(preference: &NotificationPreference, case_code: &str) -> Self {
        Self {
            notification_pref_id: preference.notification_pref_id,
            case_id: case_code.to_string(),
            notification_type: preference.notification_type,
            enabled: preference.enabled,
            delivery_methods: preference.channels(),
        }
    }
}

/// Stored preferences of one case.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CaseNotificationPreferences {
    pub case_id: String,
    pub preferences: Vec<NotificationPreferenceView>,
    pub workflow_state: Option<WorkflowStep>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmergencyContactView {
    pub contact_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub invite_sent: bool,
}

impl From<&EmergencyContact> for EmergencyContactView {
    fn from(contact: &EmergencyContact) -> Self {
        Self {
            contact_id: contact.contact_id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            phone_number: contact.phone_number.clone(),
            invite_sent: contact.invite_sent,
        }
    }
}

/// An email left untouched by a batch operation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedEmail {
    pub email: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmergencyContactsResult {
    pub saved: Vec<EmergencyContactView>,
    /// Currently always empty
    pub skipped: Vec<SkippedEmail>,
    pub workflow_state: WorkflowStep,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvitedUserView {
    pub invited_user_id: i64,
    pub case_id: String,
    pub email: String,
    pub user_id: Option<i64>,
}

impl InvitedUserView {
    pub fn new(invite: &InvitedUser, case_code: &str) -> Self {
        Self {
            invited_user_id: invite.invited_user_id,
            case_id: case_code.to_string(),
            email: invite.email.clone(),
            user_id: invite.user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InviteResult {
    pub created: Vec<InvitedUserView>,
    pub skipped: Vec<SkippedEmail>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserView {
    pub user_id: i64,
    pub entra_oid: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub account_status: AccountStatus,
    pub first_login_completed: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            entra_oid: user.entra_oid.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            account_status: user.account_status,
            first_login_completed: user.first_login_completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

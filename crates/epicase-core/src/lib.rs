//! EpiCase Core Library
//!
//! Case workflow engine for epinephrine auto-injector cases.
//!
//! # Architecture
//!
//! ```text
//!  caller (case code, payload, authenticated user id)
//!                      │
//!              validation boundary
//!                      │
//!        ┌─────────────▼─────────────┐
//!        │      unit of work         │
//!        │  ownership guard          │
//!        │  step eligibility         │
//!        │  upsert entity            │
//!        │  write current_step       │
//!        └─────────────┬─────────────┘
//!                      │
//!            view + workflow_state
//! ```
//!
//! Case steps:
//!
//! ```text
//! CREATED → PATIENT_LINKED → MEDICAL_LINKED → { EMERGENCY_CONTACTS_ADDED, NOTIFICATIONS_CONFIGURED }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Layered runtime configuration
//! - [`db`]: SQLite entity store with soft delete and transactions
//! - [`models`]: Domain types (Case, Patient, Medication, etc.)
//! - [`validation`]: Field-level request validation
//! - [`workflow`]: Workflow engine, ownership guard and per-entity services

pub mod config;
pub mod db;
pub mod models;
pub mod validation;
pub mod workflow;

// Re-export commonly used types
pub use crate::config::{CoreConfig, DatabaseConfig};
pub use db::Database;
pub use models::{
    AccountStatus, Case, DeliveryChannel, DeliveryMethods, NotificationType, WorkflowStep,
};
pub use validation::ValidationErrors;
pub use workflow::{ErrorKind, WorkflowError, WorkflowResult};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::info;

use models::{
    CaseRegistration, EmergencyContactRequest, InviteTarget, MedicationRegistration,
    NotificationPreferenceInput, PatientRegistration, UserRegistration,
};
use workflow::{
    CaseService, CaseView, EmergencyContactService, EmergencyContactView,
    EmergencyContactsResult, InviteResult, InviteService, MedicationService, MedicationView,
    NotificationPreferenceView, NotificationService, NotificationSummary, PatientService,
    PatientView, ProfileView, UserService, UserView,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum EpiCaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid workflow step: {0}")]
    InvalidWorkflowStep(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EpiCaseError {
    /// Status a transport layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            EpiCaseError::NotFound(_) => 404,
            EpiCaseError::Unauthorized(_) => 401,
            EpiCaseError::Conflict(_) => 409,
            EpiCaseError::InvalidWorkflowStep(_)
            | EpiCaseError::ValidationFailed(_)
            | EpiCaseError::SerializationError(_) => 400,
            EpiCaseError::InvalidState(_)
            | EpiCaseError::DatabaseError(_)
            | EpiCaseError::ConfigError(_) => 500,
        }
    }
}

impl From<WorkflowError> for EpiCaseError {
    fn from(e: WorkflowError) -> Self {
        let message = e.to_string();
        match e.kind() {
            ErrorKind::NotFound => EpiCaseError::NotFound(message),
            ErrorKind::Unauthorized => EpiCaseError::Unauthorized(message),
            ErrorKind::Conflict => EpiCaseError::Conflict(message),
            ErrorKind::InvalidWorkflowStep => EpiCaseError::InvalidWorkflowStep(message),
            ErrorKind::ValidationFailed => EpiCaseError::ValidationFailed(message),
            ErrorKind::InvalidState => EpiCaseError::InvalidState(message),
            ErrorKind::Internal => EpiCaseError::DatabaseError(message),
        }
    }
}

impl From<ValidationErrors> for EpiCaseError {
    fn from(e: ValidationErrors) -> Self {
        EpiCaseError::ValidationFailed(e.to_string())
    }
}

impl From<db::DbError> for EpiCaseError {
    fn from(e: db::DbError) -> Self {
        EpiCaseError::DatabaseError(e.to_string())
    }
}

impl From<crate::config::ConfigError> for EpiCaseError {
    fn from(e: crate::config::ConfigError) -> Self {
        EpiCaseError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for EpiCaseError {
    fn from(e: serde_json::Error) -> Self {
        EpiCaseError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for EpiCaseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        EpiCaseError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a case store at the given path.
#[uniffi::export]
pub fn open_case_store(path: String) -> Result<Arc<CaseCore>, EpiCaseError> {
    let db = Database::open(&path)?;
    Ok(CaseCore::new(db))
}

/// Create an in-memory case store (for testing).
#[uniffi::export]
pub fn open_case_store_in_memory() -> Result<Arc<CaseCore>, EpiCaseError> {
    let db = Database::open_in_memory()?;
    Ok(CaseCore::new(db))
}

/// Open the case store described by configuration: defaults, then the
/// optional file, then `EPICASE__*` environment variables.
#[uniffi::export]
pub fn open_case_store_from_config(
    config_path: Option<String>,
) -> Result<Arc<CaseCore>, EpiCaseError> {
    let config = CoreConfig::load(config_path.as_deref().map(Path::new))?;
    let db = Database::open_with_config(&config.database)?;
    info!(path = %config.database.path, in_memory = config.database.in_memory, "case store opened");
    Ok(CaseCore::new(db))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe case store wrapper for FFI.
///
/// Operations are serialized on one connection.
#[derive(uniffi::Object)]
pub struct CaseCore {
    db: Arc<Mutex<Database>>,
}

impl CaseCore {
    fn new(db: Database) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }
}

#[uniffi::export]
impl CaseCore {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Provision a user from the sign-up flow.
    pub fn register_user(&self, registration: FfiUserRegistration) -> Result<FfiUser, EpiCaseError> {
        let registration = UserRegistration::try_from(registration)?;
        validation::validate_user_registration(&registration)?;
        let db = self.db.lock()?;
        let user = UserService::new(&db).register_user(&registration)?;
        Ok(user.into())
    }

    pub fn get_user_by_entra_oid(&self, entra_oid: String) -> Result<FfiUser, EpiCaseError> {
        let db = self.db.lock()?;
        Ok(UserService::new(&db).get_user_by_entra_oid(&entra_oid)?.into())
    }

    pub fn get_profile(&self, user_id: i64) -> Result<FfiProfile, EpiCaseError> {
        let db = self.db.lock()?;
        Ok(UserService::new(&db).get_profile(user_id)?.into())
    }

    pub fn mark_first_login_completed(
        &self,
        entra_oid: String,
        user_id: i64,
    ) -> Result<FfiUser, EpiCaseError> {
        let db = self.db.lock()?;
        Ok(UserService::new(&db)
            .mark_first_login_completed(&entra_oid, user_id)?
            .into())
    }

    /// Set account status to "incomplete" or "complete".
    pub fn update_account_status(
        &self,
        entra_oid: String,
        account_status: String,
    ) -> Result<FfiUser, EpiCaseError> {
        let status = parse_account_status(&account_status)?;
        let db = self.db.lock()?;
        Ok(UserService::new(&db)
            .update_account_status(&entra_oid, status)?
            .into())
    }

    // =========================================================================
    // Case Operations
    // =========================================================================

    /// Create a case, or update the caller's case with the same code.
    pub fn register_case(
        &self,
        registration: FfiCaseRegistration,
        user_id: i64,
    ) -> Result<FfiCase, EpiCaseError> {
        let registration = CaseRegistration::from(registration);
        validation::validate_case_registration(&registration)?;
        let db = self.db.lock()?;
        Ok(CaseService::new(&db).register_case(&registration, user_id)?.into())
    }

    pub fn get_case(&self, case_id: String, user_id: i64) -> Result<FfiCase, EpiCaseError> {
        let db = self.db.lock()?;
        Ok(CaseService::new(&db).get_case(&case_id, user_id)?.into())
    }

    pub fn list_user_cases(&self, user_id: i64) -> Result<Vec<FfiCase>, EpiCaseError> {
        let db = self.db.lock()?;
        let cases = CaseService::new(&db).list_user_cases(user_id)?;
        Ok(cases.into_iter().map(|c| c.into()).collect())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Link a patient to a case, reusing a matching patient when possible.
    pub fn link_patient(
        &self,
        registration: FfiPatientRegistration,
        user_id: i64,
    ) -> Result<FfiPatient, EpiCaseError> {
        let registration = PatientRegistration::try_from(registration)?;
        validation::validate_patient_registration(&registration)?;
        let db = self.db.lock()?;
        Ok(PatientService::new(&db).link_patient(&registration, user_id)?.into())
    }

    // =========================================================================
    // Medication Operations
    // =========================================================================

    /// Create or update one spray slot.
    pub fn upsert_medication(
        &self,
        registration: FfiMedicationRegistration,
        user_id: i64,
    ) -> Result<FfiMedication, EpiCaseError> {
        let registration = MedicationRegistration::try_from(registration)?;
        validation::validate_medication_registration(&registration)?;
        let db = self.db.lock()?;
        Ok(MedicationService::new(&db)
            .upsert_medication(&registration, user_id)?
            .into())
    }

    pub fn list_case_medications(
        &self,
        case_id: String,
        user_id: i64,
    ) -> Result<Vec<FfiMedication>, EpiCaseError> {
        let db = self.db.lock()?;
        let meds = MedicationService::new(&db).list_case_medications(&case_id, user_id)?;
        Ok(meds.into_iter().map(|m| m.into()).collect())
    }

    // =========================================================================
    // Notification Operations
    // =========================================================================

    /// Configure every notification type for each listed case.
    pub fn configure_notification_preferences(
        &self,
        preferences: Vec<FfiNotificationPreferenceInput>,
        user_id: i64,
    ) -> Result<FfiNotificationSummary, EpiCaseError> {
        let inputs = preferences.into_iter().map(Into::into).collect();
        Ok(self.configure_notifications(inputs, user_id)?.into())
    }

    /// JSON variant of `configure_notification_preferences`.
    ///
    /// Accepts an array of `{case_id, enabled, delivery_method | delivery_methods,
    /// alert_schedule}` objects and returns the summary as JSON.
    pub fn configure_notification_preferences_json(
        &self,
        payload: String,
        user_id: i64,
    ) -> Result<String, EpiCaseError> {
        let inputs: Vec<NotificationPreferenceInput> = serde_json::from_str(&payload)?;
        let summary = self.configure_notifications(inputs, user_id)?;
        Ok(serde_json::to_string(&summary)?)
    }

    pub fn get_case_notification_preferences(
        &self,
        case_id: String,
        user_id: i64,
    ) -> Result<Vec<FfiNotificationPreference>, EpiCaseError> {
        let db = self.db.lock()?;
        let prefs = NotificationService::new(&db).get_case_preferences(&case_id, user_id)?;
        Ok(prefs.preferences.into_iter().map(|p| p.into()).collect())
    }

    pub fn list_user_notification_preferences(
        &self,
        user_id: i64,
    ) -> Result<Vec<FfiNotificationPreference>, EpiCaseError> {
        let db = self.db.lock()?;
        let prefs = NotificationService::new(&db).list_user_preferences(user_id)?;
        Ok(prefs.into_iter().map(|p| p.into()).collect())
    }

    // =========================================================================
    // Emergency Contact Operations
    // =========================================================================

    /// Upsert contacts by email and move the case to EMERGENCY_CONTACTS_ADDED.
    pub fn upsert_emergency_contacts(
        &self,
        case_id: String,
        contacts: Vec<FfiEmergencyContactInput>,
        user_id: i64,
    ) -> Result<FfiEmergencyContactsResult, EpiCaseError> {
        let contacts: Vec<EmergencyContactRequest> = contacts.into_iter().map(Into::into).collect();
        validation::validate_emergency_contacts(&case_id, &contacts)?;
        let db = self.db.lock()?;
        Ok(EmergencyContactService::new(&db)
            .upsert_contacts(&case_id, &contacts, user_id)?
            .into())
    }

    pub fn list_case_emergency_contacts(
        &self,
        case_id: String,
        user_id: i64,
    ) -> Result<Vec<FfiEmergencyContact>, EpiCaseError> {
        let db = self.db.lock()?;
        let contacts = EmergencyContactService::new(&db).list_case_contacts(&case_id, user_id)?;
        Ok(contacts.into_iter().map(|c| c.into()).collect())
    }

    // =========================================================================
    // Invitation Operations
    // =========================================================================

    /// Invite `emails` (batch, skips existing) or `email` (single, conflicts
    /// on existing). A non-empty `emails` takes precedence.
    pub fn invite_member(
        &self,
        case_id: String,
        email: Option<String>,
        emails: Option<Vec<String>>,
        user_id: i64,
    ) -> Result<FfiInviteResult, EpiCaseError> {
        let target = match (email, emails) {
            (_, Some(emails)) if !emails.is_empty() => InviteTarget::Many(emails),
            (Some(email), _) => InviteTarget::Single(email),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.add("email", "Either email or emails is required");
                return Err(errors.into());
            }
        };
        validation::validate_invite_target(&case_id, &target)?;
        let db = self.db.lock()?;
        Ok(InviteService::new(&db)
            .invite_member(&case_id, &target, user_id)?
            .into())
    }
}

impl CaseCore {
    fn configure_notifications(
        &self,
        inputs: Vec<NotificationPreferenceInput>,
        user_id: i64,
    ) -> Result<NotificationSummary, EpiCaseError> {
        let requests = validation::normalize_notification_preferences(inputs)?;
        let db = self.db.lock()?;
        Ok(NotificationService::new(&db).configure_preferences(&requests, user_id)?)
    }
}

fn parse_account_status(value: &str) -> Result<AccountStatus, EpiCaseError> {
    AccountStatus::parse(value).ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(
            "account_status",
            "Invalid or missing account_status. Must be \"incomplete\" or \"complete\"",
        );
        errors.into()
    })
}

fn step_name(step: Option<WorkflowStep>) -> Option<String> {
    step.map(|s| s.as_str().to_string())
}

// =========================================================================
// FFI Types
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUserRegistration {
    pub entra_oid: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub account_status: Option<String>,
}

impl TryFrom<FfiUserRegistration> for UserRegistration {
    type Error = EpiCaseError;

    fn try_from(reg: FfiUserRegistration) -> Result<Self, Self::Error> {
        let account_status = reg
            .account_status
            .as_deref()
            .map(parse_account_status)
            .transpose()?;
        Ok(UserRegistration {
            entra_oid: reg.entra_oid,
            email: reg.email,
            first_name: reg.first_name,
            last_name: reg.last_name,
            phone_number: reg.phone_number,
            account_status,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub user_id: i64,
    pub entra_oid: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub account_status: String,
    pub first_login_completed: bool,
}

impl From<UserView> for FfiUser {
    fn from(user: UserView) -> Self {
        Self {
            user_id: user.user_id,
            entra_oid: user.entra_oid,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            account_status: user.account_status.as_str().to_string(),
            first_login_completed: user.first_login_completed,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<ProfileView> for FfiProfile {
    fn from(profile: ProfileView) -> Self {
        Self {
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCaseRegistration {
    pub case_id: String,
    pub case_name: String,
    pub battery_level: Option<i64>,
    pub connection_status: Option<String>,
}

impl From<FfiCaseRegistration> for CaseRegistration {
    fn from(reg: FfiCaseRegistration) -> Self {
        CaseRegistration {
            case_id: reg.case_id,
            case_name: reg.case_name,
            battery_level: reg.battery_level,
            connection_status: reg.connection_status,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCase {
    pub case_id: String,
    pub patient_id: Option<i64>,
    pub case_name: String,
    pub battery_level: Option<i64>,
    pub last_seen: Option<String>,
    pub connection_status: Option<String>,
    pub workflow_state: Option<String>,
    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
}

impl From<CaseView> for FfiCase {
    fn from(case: CaseView) -> Self {
        let (patient_first_name, patient_last_name) = match case.patient {
            Some(p) => (Some(p.first_name), Some(p.last_name)),
            None => (None, None),
        };
        Self {
            case_id: case.case_id,
            patient_id: case.patient_id,
            case_name: case.case_name,
            battery_level: case.battery_level,
            last_seen: case.last_seen,
            connection_status: case.connection_status,
            workflow_state: step_name(case.workflow_state),
            patient_first_name,
            patient_last_name,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRegistration {
    pub case_id: String,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub location: String,
    pub postal_code: String,
    pub allergies_medical_history: Option<String>,
    pub is_self: Option<bool>,
    pub invite_email: Option<String>,
}

impl TryFrom<FfiPatientRegistration> for PatientRegistration {
    type Error = EpiCaseError;

    fn try_from(reg: FfiPatientRegistration) -> Result<Self, Self::Error> {
        Ok(PatientRegistration {
            date_of_birth: validation::parse_date("date_of_birth", &reg.date_of_birth)?,
            case_id: reg.case_id,
            first_name: reg.first_name,
            last_name: reg.last_name,
            location: reg.location,
            postal_code: reg.postal_code,
            allergies_medical_history: reg.allergies_medical_history,
            is_self: reg.is_self,
            invite_email: reg.invite_email,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub patient_id: i64,
    pub user_id: i64,
    pub case_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub allergies_medical_history: Option<String>,
    pub is_self: bool,
    pub invite_email: Option<String>,
    pub location: String,
    pub postal_code: String,
    pub workflow_state: String,
}

impl From<PatientView> for FfiPatient {
    fn from(patient: PatientView) -> Self {
        Self {
            patient_id: patient.patient_id,
            user_id: patient.user_id,
            case_id: patient.case_id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            date_of_birth: patient.date_of_birth.to_string(),
            allergies_medical_history: patient.allergies_medical_history,
            is_self: patient.is_self,
            invite_email: patient.invite_email,
            location: patient.location,
            postal_code: patient.postal_code,
            workflow_state: patient.workflow_state.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationRegistration {
    pub case_id: String,
    pub spray_number: u8,
    /// `YYYY-MM-DD`
    pub expiration_date_spray_1: String,
    /// `YYYY-MM-DD`
    pub expiration_date_spray_2: String,
    pub lot_number_spray_1: Option<String>,
    pub lot_number_spray_2: Option<String>,
    pub dosage_details: Option<String>,
}

impl TryFrom<FfiMedicationRegistration> for MedicationRegistration {
    type Error = EpiCaseError;

    fn try_from(reg: FfiMedicationRegistration) -> Result<Self, Self::Error> {
        let spray_1 = validation::parse_date("expiration_date_spray_1", &reg.expiration_date_spray_1);
        let spray_2 = validation::parse_date("expiration_date_spray_2", &reg.expiration_date_spray_2);
        let (expiration_date_spray_1, expiration_date_spray_2) = match (spray_1, spray_2) {
            (Ok(a), Ok(b)) => (a, b),
            (a, b) => {
                let mut errors = ValidationErrors::new();
                for failed in [a.err(), b.err()].into_iter().flatten() {
                    for field in failed.fields() {
                        errors.add(field, failed.get(field).unwrap_or_default());
                    }
                }
                return Err(errors.into());
            }
        };
        Ok(MedicationRegistration {
            case_id: reg.case_id,
            spray_number: reg.spray_number,
            expiration_date_spray_1,
            expiration_date_spray_2,
            lot_number_spray_1: reg.lot_number_spray_1,
            lot_number_spray_2: reg.lot_number_spray_2,
            dosage_details: reg.dosage_details,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub spray_id: i64,
    pub case_id: String,
    pub spray_number: u8,
    pub status: String,
    pub expiration_date_spray_1: String,
    pub lot_number_spray_1: Option<String>,
    pub expiration_date_spray_2: String,
    pub lot_number_spray_2: Option<String>,
    pub dosage_details: Option<String>,
    pub workflow_state: Option<String>,
}

impl From<MedicationView> for FfiMedication {
    fn from(med: MedicationView) -> Self {
        Self {
            spray_id: med.spray_id,
            case_id: med.case_id,
            spray_number: med.spray_number,
            status: med.status,
            expiration_date_spray_1: med.expiration_date_spray_1.to_string(),
            lot_number_spray_1: med.lot_number_spray_1,
            expiration_date_spray_2: med.expiration_date_spray_2.to_string(),
            lot_number_spray_2: med.lot_number_spray_2,
            dosage_details: med.dosage_details,
            workflow_state: step_name(med.workflow_state),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotificationPreferenceInput {
    pub case_id: String,
    pub enabled: bool,
    /// Any of "email", "sms", "push", "in_app"
    pub delivery_methods: Vec<String>,
    pub alert_schedule: Option<String>,
}

impl From<FfiNotificationPreferenceInput> for NotificationPreferenceInput {
    fn from(input: FfiNotificationPreferenceInput) -> Self {
        NotificationPreferenceInput {
            case_id: input.case_id,
            enabled: input.enabled,
            delivery: if input.delivery_methods.is_empty() {
                None
            } else {
                Some(DeliveryMethods::Multi(input.delivery_methods))
            },
            alert_schedule: input.alert_schedule,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotificationSummary {
    pub created: u32,
    pub updated: u32,
    pub cases: Vec<String>,
    pub workflow_state: String,
    pub message: String,
}

impl From<NotificationSummary> for FfiNotificationSummary {
    fn from(summary: NotificationSummary) -> Self {
        Self {
            created: summary.created as u32,
            updated: summary.updated as u32,
            cases: summary.cases,
            workflow_state: summary.workflow_state.as_str().to_string(),
            message: summary.message,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNotificationPreference {
    pub notification_pref_id: i64,
    pub case_id: String,
    pub notification_type: String,
    pub enabled: bool,
    pub delivery_methods: Vec<String>,
}

impl From<NotificationPreferenceView> for FfiNotificationPreference {
    fn from(pref: NotificationPreferenceView) -> Self {
        Self {
            notification_pref_id: pref.notification_pref_id,
            case_id: pref.case_id,
            notification_type: pref.notification_type.as_str().to_string(),
            enabled: pref.enabled,
            delivery_methods: pref
                .delivery_methods
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmergencyContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub send_invite: bool,
}

impl From<FfiEmergencyContactInput> for EmergencyContactRequest {
    fn from(input: FfiEmergencyContactInput) -> Self {
        EmergencyContactRequest {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone_number: input.phone_number,
            send_invite: input.send_invite,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmergencyContact {
    pub contact_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub invite_sent: bool,
}

impl From<EmergencyContactView> for FfiEmergencyContact {
    fn from(contact: EmergencyContactView) -> Self {
        Self {
            contact_id: contact.contact_id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone_number: contact.phone_number,
            invite_sent: contact.invite_sent,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSkippedEmail {
    pub email: String,
    pub reason: String,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmergencyContactsResult {
    pub saved: Vec<FfiEmergencyContact>,
    pub skipped: Vec<FfiSkippedEmail>,
    pub workflow_state: String,
    pub message: String,
}

impl From<EmergencyContactsResult> for FfiEmergencyContactsResult {
    fn from(result: EmergencyContactsResult) -> Self {
        Self {
            saved: result.saved.into_iter().map(Into::into).collect(),
            skipped: result
                .skipped
                .into_iter()
                .map(|s| FfiSkippedEmail {
                    email: s.email,
                    reason: s.reason,
                })
                .collect(),
            workflow_state: result.workflow_state.as_str().to_string(),
            message: result.message,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInvitedUser {
    pub invited_user_id: i64,
    pub case_id: String,
    pub email: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInviteResult {
    pub created: Vec<FfiInvitedUser>,
    pub skipped: Vec<FfiSkippedEmail>,
}

impl From<InviteResult> for FfiInviteResult {
    fn from(result: InviteResult) -> Self {
        Self {
            created: result
                .created
                .into_iter()
                .map(|i| FfiInvitedUser {
                    invited_user_id: i.invited_user_id,
                    case_id: i.case_id,
                    email: i.email,
                    user_id: i.user_id,
                })
                .collect(),
            skipped: result
                .skipped
                .into_iter()
                .map(|s| FfiSkippedEmail {
                    email: s.email,
                    reason: s.reason,
                })
                .collect(),
        }
    }
}

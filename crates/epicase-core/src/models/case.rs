//! Case models and the workflow step catalog.

use serde::{Deserialize, Serialize};

/// Connection status written when the caller does not supply one.
pub const DEFAULT_CONNECTION_STATUS: &str = "disconnected";

/// Workflow state of a case.
///
/// Steps are produced in order `Created → PatientLinked → MedicalLinked`,
/// after which `EmergencyContactsAdded` and `NotificationsConfigured` are
/// reachable independently. `DeviceLinked` is accepted as a precondition by
/// the medication and notification operations but nothing produces it yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStep {
    Created,
    PatientLinked,
    MedicalLinked,
    DeviceLinked,
    EmergencyContactsAdded,
    NotificationsConfigured,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Created => "CREATED",
            WorkflowStep::PatientLinked => "PATIENT_LINKED",
            WorkflowStep::MedicalLinked => "MEDICAL_LINKED",
            WorkflowStep::DeviceLinked => "DEVICE_LINKED",
            WorkflowStep::EmergencyContactsAdded => "EMERGENCY_CONTACTS_ADDED",
            WorkflowStep::NotificationsConfigured => "NOTIFICATIONS_CONFIGURED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(WorkflowStep::Created),
            "PATIENT_LINKED" => Some(WorkflowStep::PatientLinked),
            "MEDICAL_LINKED" => Some(WorkflowStep::MedicalLinked),
            "DEVICE_LINKED" => Some(WorkflowStep::DeviceLinked),
            "EMERGENCY_CONTACTS_ADDED" => Some(WorkflowStep::EmergencyContactsAdded),
            "NOTIFICATIONS_CONFIGURED" => Some(WorkflowStep::NotificationsConfigured),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known device connection states. The stored column is free-form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Syncing,
    Error,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Syncing => "syncing",
            ConnectionStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "connected" => Some(ConnectionStatus::Connected),
            "disconnected" => Some(ConnectionStatus::Disconnected),
            "syncing" => Some(ConnectionStatus::Syncing),
            "error" => Some(ConnectionStatus::Error),
            _ => None,
        }
    }
}

/// An auto-injector case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    /// Internal numeric key (foreign key target for child rows)
    pub id: i64,
    /// Caller-supplied case code, unique among live cases
    pub case_id: String,
    /// Linked patient, set by the patient-link operation
    pub patient_id: Option<i64>,
    /// Owner; never changes after creation
    pub user_id: i64,
    pub case_name: String,
    /// Raw stored step; `None` or unrecognised values are possible in legacy rows
    pub current_step: Option<String>,
    pub battery_level: Option<i64>,
    pub last_seen: Option<String>,
    pub connection_status: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl Case {
    /// Parsed workflow step, if the stored value is recognised.
    pub fn step(&self) -> Option<WorkflowStep> {
        self.current_step.as_deref().and_then(WorkflowStep::parse)
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    pub fn has_patient(&self) -> bool {
        self.patient_id.is_some()
    }
}

/// Fields required to create a case row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCase {
    pub case_id: String,
    pub user_id: i64,
    pub case_name: String,
    pub battery_level: Option<i64>,
    pub connection_status: String,
    pub current_step: WorkflowStep,
}

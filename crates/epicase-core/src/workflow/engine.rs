//! Case Workflow Engine: step eligibility and transitions.
//!
//! | From                                        | Operation            | To                       |
//! |---------------------------------------------|----------------------|--------------------------|
//! | (row created)                               | case creation        | CREATED                  |
//! | any                                         | patient link         | PATIENT_LINKED           |
//! | PATIENT_LINKED, MEDICAL_LINKED, DEVICE_LINKED | medication upsert  | MEDICAL_LINKED           |
//! | any                                         | emergency contacts   | EMERGENCY_CONTACTS_ADDED |
//! | CREATED ..= DEVICE_LINKED, NOTIFICATIONS_CONFIGURED | notifications | NOTIFICATIONS_CONFIGURED |
//!
//! Step writes are last-writer-wins: no version check guards `current_step`.

use tracing::info;

use super::{WorkflowError, WorkflowResult};
use crate::db::Database;
use crate::models::{Case, WorkflowStep};

/// A step-advancing workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CaseCreation,
    PatientLink,
    MedicationUpsert,
    EmergencyContactsUpsert,
    NotificationPreferencesUpsert,
}

const MEDICATION_STEPS: &[WorkflowStep] = &[
    WorkflowStep::PatientLinked,
    WorkflowStep::MedicalLinked,
    WorkflowStep::DeviceLinked,
];

const NOTIFICATION_STEPS: &[WorkflowStep] = &[
    WorkflowStep::Created,
    WorkflowStep::PatientLinked,
    WorkflowStep::MedicalLinked,
    WorkflowStep::DeviceLinked,
    WorkflowStep::NotificationsConfigured,
];

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CaseCreation => "case creation",
            Operation::PatientLink => "patient link",
            Operation::MedicationUpsert => "medication upsert",
            Operation::EmergencyContactsUpsert => "emergency contacts upsert",
            Operation::NotificationPreferencesUpsert => "notification preferences upsert",
        }
    }

    /// Step written once the operation's entity mutation succeeds.
    pub fn target(&self) -> WorkflowStep {
        match self {
            Operation::CaseCreation => WorkflowStep::Created,
            Operation::PatientLink => WorkflowStep::PatientLinked,
            Operation::MedicationUpsert => WorkflowStep::MedicalLinked,
            Operation::EmergencyContactsUpsert => WorkflowStep::EmergencyContactsAdded,
            Operation::NotificationPreferencesUpsert => WorkflowStep::NotificationsConfigured,
        }
    }

    /// Whether a case at `current` may run this operation.
    ///
    /// `None` is an unset or unrecognised stored step. Notifications read it
    /// as `CREATED`; medication rejects it.
    pub fn permits(&self, current: Option<WorkflowStep>) -> bool {
        match self {
            // Applies to a case row that does not exist yet
            Operation::CaseCreation => false,
            Operation::PatientLink | Operation::EmergencyContactsUpsert => true,
            Operation::MedicationUpsert => {
                current.is_some_and(|step| MEDICATION_STEPS.contains(&step))
            }
            Operation::NotificationPreferencesUpsert => {
                NOTIFICATION_STEPS.contains(&current.unwrap_or(WorkflowStep::Created))
            }
        }
    }
}

/// Fail with `InvalidWorkflowStep` unless `case` may run `operation`.
pub fn check_eligible(case: &Case, operation: Operation) -> WorkflowResult<()> {
    let current = case.step();
    if operation.permits(current) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidWorkflowStep {
            operation: operation.name(),
            current,
        })
    }
}

/// Write the operation's target step to `case`.
///
/// Must run inside the operation's unit of work.
pub fn advance(db: &Database, case: &Case, operation: Operation) -> WorkflowResult<WorkflowStep> {
    let target = operation.target();
    if !db.set_case_step(case.id, target)? {
        return Err(WorkflowError::InvalidState(format!(
            "Failed to update workflow step of case {}",
            case.case_id
        )));
    }
    info!(
        case_code = %case.case_id,
        from = case.current_step.as_deref().unwrap_or("unset"),
        to = %target,
        operation = operation.name(),
        "workflow step advanced"
    );
    Ok(target)
}

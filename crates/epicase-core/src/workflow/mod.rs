//! Case workflow services.
//!
//! Each mutating operation runs as one unit of work:
//! Ownership Guard → Step Eligibility → Upsert → Step Transition.
//! Any error rolls back every write the operation made.

mod cases;
mod contacts;
mod engine;
mod guard;
mod invites;
mod medications;
mod notifications;
mod patients;
mod users;
mod views;

pub use cases::*;
pub use contacts::*;
pub use engine::*;
pub use guard::*;
pub use invites::*;
pub use medications::*;
pub use notifications::*;
pub use patients::*;
pub use users::*;
pub use views::*;

use std::fmt;

use thiserror::Error;

use crate::db::DbError;
use crate::models::WorkflowStep;
use crate::validation::ValidationErrors;

/// Entities a workflow operation can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Case,
    Patient,
    Medication,
    NotificationPreference,
    EmergencyContact,
    InvitedUser,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::User => "User",
            Entity::Case => "Case",
            Entity::Patient => "Patient",
            Entity::Medication => "Medication",
            Entity::NotificationPreference => "Notification preference",
            Entity::EmergencyContact => "Emergency contact",
            Entity::InvitedUser => "Invited user",
        })
    }
}

/// Workflow errors.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0} not found")]
    NotFound(Entity),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid workflow step for {operation}: current step is {}", display_step(.current))]
    InvalidWorkflowStep {
        operation: &'static str,
        current: Option<WorkflowStep>,
    },

    /// Internal consistency failure, not caused by caller input.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

fn display_step(step: &Option<WorkflowStep>) -> &'static str {
    step.map(|s| s.as_str()).unwrap_or("unset")
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Coarse error classification for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Conflict,
    InvalidWorkflowStep,
    ValidationFailed,
    InvalidState,
    Internal,
}

impl ErrorKind {
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidWorkflowStep | ErrorKind::ValidationFailed => 400,
            ErrorKind::InvalidState | ErrorKind::Internal => 500,
        }
    }
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::NotFound(_) => ErrorKind::NotFound,
            WorkflowError::Unauthorized(_) => ErrorKind::Unauthorized,
            WorkflowError::Conflict(_) => ErrorKind::Conflict,
            WorkflowError::InvalidWorkflowStep { .. } => ErrorKind::InvalidWorkflowStep,
            WorkflowError::Validation(_) => ErrorKind::ValidationFailed,
            WorkflowError::InvalidState(_) => ErrorKind::InvalidState,
            WorkflowError::Database(_) => ErrorKind::Internal,
        }
    }
}

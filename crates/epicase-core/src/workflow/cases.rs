//! Case creation, update and reads.

use tracing::{debug, info};

use super::{ensure_case_owner, ensure_user, CaseView, Operation, WorkflowError, WorkflowResult};
use crate::db::{Database, DbError, DbResult};
use crate::models::{Case, CaseRegistration, NewCase, Patient, DEFAULT_CONNECTION_STATUS};

/// Case service.
pub struct CaseService<'a> {
    db: &'a Database,
}

impl<'a> CaseService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a case, or update the caller's existing case with the same code.
    ///
    /// Updating never changes the workflow step. A code owned by another user
    /// is a `Conflict`.
    pub fn register_case(&self, reg: &CaseRegistration, user_id: i64) -> WorkflowResult<CaseView> {
        self.db.run_in_transaction(|db| {
            ensure_user(db, user_id)?;

            match db.get_case_by_code(&reg.case_id)? {
                None => {
                    let case = db
                        .insert_case(&NewCase {
                            case_id: reg.case_id.clone(),
                            user_id,
                            case_name: reg.case_name.clone(),
                            battery_level: reg.battery_level,
                            connection_status: reg
                                .connection_status
                                .clone()
                                .unwrap_or_else(|| DEFAULT_CONNECTION_STATUS.to_string()),
                            current_step: Operation::CaseCreation.target(),
                        })
                        .map_err(|e| match e {
                            DbError::Constraint(_) => case_conflict(),
                            other => other.into(),
                        })?;
                    info!(case_code = %case.case_id, user_id, "case created");
                    Ok(CaseView::new(&case, None))
                }
                Some(existing) if !existing.is_owned_by(user_id) => Err(case_conflict()),
                Some(mut existing) => {
                    existing.case_name = reg.case_name.clone();
                    if reg.battery_level.is_some() {
                        existing.battery_level = reg.battery_level;
                    }
                    if let Some(status) = &reg.connection_status {
                        existing.connection_status = Some(status.clone());
                    }

                    if !db.update_case_fields(&existing)? {
                        return Err(WorkflowError::InvalidState(
                            "Failed to update case".into(),
                        ));
                    }
                    let updated = db.get_case(existing.id)?.ok_or_else(|| {
                        WorkflowError::InvalidState("Case missing after update".into())
                    })?;
                    debug!(case_code = %updated.case_id, user_id, "case updated");

                    let patient = linked_patient(db, &updated)?;
                    Ok(CaseView::new(&updated, patient.as_ref()))
                }
            }
        })
    }

    /// Get one of the caller's cases by code.
    pub fn get_case(&self, case_code: &str, user_id: i64) -> WorkflowResult<CaseView> {
        let case = ensure_case_owner(self.db, case_code, user_id)?;
        let patient = linked_patient(self.db, &case)?;
        Ok(CaseView::new(&case, patient.as_ref()))
    }

    /// List the caller's live cases, oldest first.
    pub fn list_user_cases(&self, user_id: i64) -> WorkflowResult<Vec<CaseView>> {
        ensure_user(self.db, user_id)?;
        self.db
            .list_cases_for_user(user_id)?
            .iter()
            .map(|case| -> WorkflowResult<CaseView> {
                let patient = linked_patient(self.db, case)?;
                Ok(CaseView::new(case, patient.as_ref()))
            })
            .collect()
    }
}

fn case_conflict() -> WorkflowError {
    WorkflowError::Conflict("Case already exists".into())
}

fn linked_patient(db: &Database, case: &Case) -> DbResult<Option<Patient>> {
    match case.patient_id {
        Some(patient_id) => db.get_patient(patient_id),
        None => Ok(None),
    }
}

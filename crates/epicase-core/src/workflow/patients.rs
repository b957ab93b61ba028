//! Patient link-or-create.

use tracing::{debug, info};

use super::{
    advance, ensure_case_owner, ensure_user, Entity, Operation, PatientView, WorkflowError,
    WorkflowResult,
};
use crate::db::Database;
use crate::models::{NewPatient, Patient, PatientIdentity, PatientRegistration};

/// Patient service.
pub struct PatientService<'a> {
    db: &'a Database,
}

impl<'a> PatientService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Link a patient to a case.
    ///
    /// If the case already has a patient, that patient is updated in place.
    /// Otherwise a patient of the same user with the same name and date of
    /// birth is reused, or a new one is created. The case always ends at
    /// `PATIENT_LINKED`.
    pub fn link_patient(
        &self,
        reg: &PatientRegistration,
        user_id: i64,
    ) -> WorkflowResult<PatientView> {
        self.db.run_in_transaction(|db| {
            ensure_user(db, user_id)?;
            let case = ensure_case_owner(db, &reg.case_id, user_id)?;

            if let Some(patient_id) = case.patient_id {
                let mut patient = db
                    .get_patient(patient_id)?
                    .ok_or(WorkflowError::NotFound(Entity::Patient))?;
                if patient.user_id != user_id {
                    return Err(WorkflowError::Unauthorized(
                        "You are not authorized to modify this patient".into(),
                    ));
                }

                apply_registration(&mut patient, reg);
                if !db.update_patient(&patient)? {
                    return Err(WorkflowError::InvalidState("Failed to update patient".into()));
                }
                let updated = db.get_patient(patient_id)?.ok_or_else(|| {
                    WorkflowError::InvalidState("Patient missing after update".into())
                })?;
                let step = advance(db, &case, Operation::PatientLink)?;
                debug!(case_code = %case.case_id, patient_id, "linked patient updated");
                return Ok(PatientView::new(&updated, &case.case_id, step));
            }

            let identity = PatientIdentity {
                user_id,
                first_name: &reg.first_name,
                last_name: &reg.last_name,
                date_of_birth: reg.date_of_birth,
            };
            let patient = match db.find_patient_by_identity(&identity)? {
                Some(existing) => {
                    debug!(patient_id = existing.patient_id, "reusing patient by identity");
                    existing
                }
                None => db.insert_patient(&NewPatient {
                    user_id,
                    first_name: reg.first_name.clone(),
                    last_name: reg.last_name.clone(),
                    date_of_birth: reg.date_of_birth,
                    allergies_medical_history: reg.allergies_medical_history.clone(),
                    is_self: reg.is_self.unwrap_or(false),
                    invite_email: reg.invite_email.clone(),
                    location: reg.location.clone(),
                    postal_code: reg.postal_code.clone(),
                })?,
            };

            if !db.set_case_patient(case.id, patient.patient_id)? {
                return Err(WorkflowError::InvalidState(format!(
                    "Failed to link patient to case {}",
                    case.case_id
                )));
            }
            let step = advance(db, &case, Operation::PatientLink)?;
            info!(
                case_code = %case.case_id,
                patient_id = patient.patient_id,
                user_id,
                "patient linked"
            );
            Ok(PatientView::new(&patient, &case.case_id, step))
        })
    }
}

/// Overwrite required fields; optional fields keep stored values when omitted.
fn apply_registration(patient: &mut Patient, reg: &PatientRegistration) {
    patient.first_name = reg.first_name.clone();
    patient.last_name = reg.last_name.clone();
    patient.date_of_birth = reg.date_of_birth;
    patient.location = reg.location.clone();
    patient.postal_code = reg.postal_code.clone();
    if let Some(history) = &reg.allergies_medical_history {
        patient.allergies_medical_history = Some(history.clone());
    }
    if let Some(is_self) = reg.is_self {
        patient.is_self = is_self;
    }
    if let Some(email) = &reg.invite_email {
        patient.invite_email = Some(email.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, CaseRegistration, NewUser, WorkflowStep};
    use crate::workflow::CaseService;
    use chrono::NaiveDate;

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .insert_user(&NewUser {
                entra_oid: None,
                email: "parent@example.com".into(),
                first_name: "Pat".into(),
                last_name: "Parent".into(),
                phone_number: None,
                account_status: AccountStatus::Complete,
            })
            .unwrap();
        for code in ["CASE-1", "CASE-2"] {
            CaseService::new(&db)
                .register_case(
                    &CaseRegistration {
                        case_id: code.into(),
                        case_name: "Kit".into(),
                        battery_level: None,
                        connection_status: None,
                    },
                    user.user_id,
                )
                .unwrap();
        }
        (db, user.user_id)
    }

    fn reg(case_code: &str) -> PatientRegistration {
        PatientRegistration {
            case_id: case_code.into(),
            first_name: "Max".into(),
            last_name: "Parent".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2016, 4, 2).unwrap(),
            location: "Springfield".into(),
            postal_code: "12345".into(),
            allergies_medical_history: None,
            is_self: None,
            invite_email: None,
        }
    }

    #[test]
    fn test_first_link_creates_patient() {
        let (db, user_id) = setup_db();
        let view = PatientService::new(&db).link_patient(&reg("CASE-1"), user_id).unwrap();

        assert_eq!(view.workflow_state, WorkflowStep::PatientLinked);
        assert!(!view.is_self);
        let case = db.get_case_by_code("CASE-1").unwrap().unwrap();
        assert_eq!(case.patient_id, Some(view.patient_id));
        assert_eq!(case.step(), Some(WorkflowStep::PatientLinked));
    }

    #[test]
    fn test_relink_preserves_omitted_fields() {
        let (db, user_id) = setup_db();
        let service = PatientService::new(&db);
        let mut first = reg("CASE-1");
        first.invite_email = Some("a@b.com".into());
        first.allergies_medical_history = Some("Peanuts".into());
        let created = service.link_patient(&first, user_id).unwrap();

        let mut second = reg("CASE-1");
        second.location = "Shelbyville".into();
        let updated = service.link_patient(&second, user_id).unwrap();

        assert_eq!(updated.patient_id, created.patient_id);
        assert_eq!(updated.invite_email.as_deref(), Some("a@b.com"));
        assert_eq!(updated.allergies_medical_history.as_deref(), Some("Peanuts"));
        assert_eq!(updated.location, "Shelbyville");
    }

    #[test]
    fn test_identity_reused_across_cases() {
        let (db, user_id) = setup_db();
        let service = PatientService::new(&db);
        let first = service.link_patient(&reg("CASE-1"), user_id).unwrap();
        let second = service.link_patient(&reg("CASE-2"), user_id).unwrap();

        assert_eq!(first.patient_id, second.patient_id);
        assert_eq!(db.list_patients_for_user(user_id).unwrap().len(), 1);
    }

    #[test]
    fn test_relink_reasserts_step() {
        let (db, user_id) = setup_db();
        let service = PatientService::new(&db);
        service.link_patient(&reg("CASE-1"), user_id).unwrap();
        let case = db.get_case_by_code("CASE-1").unwrap().unwrap();
        db.set_case_step(case.id, WorkflowStep::NotificationsConfigured).unwrap();

        let view = service.link_patient(&reg("CASE-1"), user_id).unwrap();
        assert_eq!(view.workflow_state, WorkflowStep::PatientLinked);
    }

    #[test]
    fn test_missing_linked_patient() {
        let (db, user_id) = setup_db();
        let service = PatientService::new(&db);
        let view = service.link_patient(&reg("CASE-1"), user_id).unwrap();
        db.soft_delete_patient(view.patient_id).unwrap();

        let err = service.link_patient(&reg("CASE-1"), user_id).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(Entity::Patient)));
    }
}

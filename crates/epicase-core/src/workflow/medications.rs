//! Medication upsert by spray slot.

use tracing::info;

use super::{
    advance, check_eligible, ensure_case_owner, ensure_user, MedicationView, Operation,
    WorkflowError, WorkflowResult,
};
use crate::db::Database;
use crate::models::{MedicationRegistration, NewMedication, DEFAULT_MEDICATION_STATUS};

/// Medication service.
pub struct MedicationService<'a> {
    db: &'a Database,
}

impl<'a> MedicationService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create or update the medication in one spray slot of a case.
    ///
    /// Requires a linked patient. On update the stored status is kept and
    /// omitted optional fields keep their stored values.
    pub fn upsert_medication(
        &self,
        reg: &MedicationRegistration,
        user_id: i64,
    ) -> WorkflowResult<MedicationView> {
        self.db.run_in_transaction(|db| {
            ensure_user(db, user_id)?;
            let case = ensure_case_owner(db, &reg.case_id, user_id)?;
            check_eligible(&case, Operation::MedicationUpsert)?;

            let medication = match db.find_medication_by_case_and_spray(case.id, reg.spray_number)? {
                Some(mut existing) => {
                    if existing.status.trim().is_empty() {
                        existing.status = DEFAULT_MEDICATION_STATUS.to_string();
                    }
                    existing.expiration_date_spray_1 = reg.expiration_date_spray_1;
                    existing.expiration_date_spray_2 = reg.expiration_date_spray_2;
                    if reg.lot_number_spray_1.is_some() {
                        existing.lot_number_spray_1 = reg.lot_number_spray_1.clone();
                    }
                    if reg.lot_number_spray_2.is_some() {
                        existing.lot_number_spray_2 = reg.lot_number_spray_2.clone();
                    }
                    if reg.dosage_details.is_some() {
                        existing.dosage_details = reg.dosage_details.clone();
                    }

                    if !db.update_medication(&existing)? {
                        return Err(WorkflowError::InvalidState(
                            "Failed to update medication".into(),
                        ));
                    }
                    db.get_medication(existing.spray_id)?.ok_or_else(|| {
                        WorkflowError::InvalidState("Medication missing after update".into())
                    })?
                }
                None => db.insert_medication(&NewMedication {
                    case_id: case.id,
                    spray_number: reg.spray_number,
                    status: DEFAULT_MEDICATION_STATUS.to_string(),
                    expiration_date_spray_1: reg.expiration_date_spray_1,
                    lot_number_spray_1: reg.lot_number_spray_1.clone(),
                    expiration_date_spray_2: reg.expiration_date_spray_2,
                    lot_number_spray_2: reg.lot_number_spray_2.clone(),
                    dosage_details: reg.dosage_details.clone(),
                })?,
            };

            let step = advance(db, &case, Operation::MedicationUpsert)?;
            info!(
                case_code = %case.case_id,
                spray_number = reg.spray_number,
                spray_id = medication.spray_id,
                "medication saved"
            );
            Ok(MedicationView::new(&medication, &case.case_id, Some(step)))
        })
    }

    /// List the medications of one of the caller's cases.
    pub fn list_case_medications(
        &self,
        case_code: &str,
        user_id: i64,
    ) -> WorkflowResult<Vec<MedicationView>> {
        let case = ensure_case_owner(self.db, case_code, user_id)?;
        let step = case.step();
        Ok(self
            .db
            .list_medications_for_case(case.id)?
            .iter()
            .map(|m| MedicationView::new(m, &case.case_id, step))
            .collect())
    }
}

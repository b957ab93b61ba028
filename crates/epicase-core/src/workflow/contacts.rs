//! Emergency contact upsert with the invitation side-effect.

use tracing::info;

use super::invites::create_invite_if_absent;
use super::{
    advance, ensure_case_owner, ensure_user, EmergencyContactView, EmergencyContactsResult,
    Operation, WorkflowError, WorkflowResult,
};
use crate::db::Database;
use crate::models::{EmergencyContactRequest, NewEmergencyContact};

/// Emergency contact service.
pub struct EmergencyContactService<'a> {
    db: &'a Database,
}

impl<'a> EmergencyContactService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Upsert contacts of a case by email, inviting those flagged
    /// `send_invite`.
    ///
    /// Has no step precondition; the case always ends at
    /// `EMERGENCY_CONTACTS_ADDED`.
    pub fn upsert_contacts(
        &self,
        case_code: &str,
        contacts: &[EmergencyContactRequest],
        user_id: i64,
    ) -> WorkflowResult<EmergencyContactsResult> {
        self.db.run_in_transaction(|db| {
            ensure_user(db, user_id)?;
            let case = ensure_case_owner(db, case_code, user_id)?;

            let mut saved = Vec::with_capacity(contacts.len());
            for request in contacts {
                let email = request.email.trim();
                let contact = match db.find_emergency_contact_by_case_and_email(case.id, email)? {
                    Some(mut existing) => {
                        existing.first_name = request.first_name.clone();
                        existing.last_name = request.last_name.clone();
                        existing.phone_number = request.phone_number.clone();
                        existing.invite_sent = request.send_invite;
                        if !db.update_emergency_contact(&existing)? {
                            return Err(WorkflowError::InvalidState(
                                "Failed to update emergency contact".into(),
                            ));
                        }
                        existing
                    }
                    None => db.insert_emergency_contact(&NewEmergencyContact {
                        case_id: case.id,
                        first_name: request.first_name.clone(),
                        last_name: request.last_name.clone(),
                        email: email.to_string(),
                        phone_number: request.phone_number.clone(),
                        invite_sent: request.send_invite,
                    })?,
                };

                if request.send_invite {
                    create_invite_if_absent(db, &case, email)?;
                }
                saved.push(EmergencyContactView::from(&contact));
            }

            let step = advance(db, &case, Operation::EmergencyContactsUpsert)?;
            info!(case_code = %case.case_id, saved = saved.len(), "emergency contacts saved");
            Ok(EmergencyContactsResult {
                message: format!("Saved {} emergency contact(s)", saved.len()),
                saved,
                skipped: Vec::new(),
                workflow_state: step,
            })
        })
    }

    /// List the emergency contacts of one of the caller's cases.
    pub fn list_case_contacts(
        &self,
        case_code: &str,
        user_id: i64,
    ) -> WorkflowResult<Vec<EmergencyContactView>> {
        let case = ensure_case_owner(self.db, case_code, user_id)?;
        Ok(self
            .db
            .list_emergency_contacts_for_case(case.id)?
            .iter()
            .map(EmergencyContactView::from)
            .collect())
    }
}

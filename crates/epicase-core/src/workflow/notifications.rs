//! Notification preference bulk upsert.
//!
//! Configuring a case writes one row per notification type. The whole batch
//! is one unit of work: no case advances unless every targeted case holds a
//! full set of preferences.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::{
    advance, check_eligible, ensure_case_owner, ensure_user, CaseNotificationPreferences,
    NotificationPreferenceView, NotificationSummary, Operation, WorkflowError, WorkflowResult,
};
use crate::db::Database;
use crate::models::{
    Case, NewNotificationPreference, NotificationPreferenceRequest, NotificationType,
};
use crate::validation::ValidationErrors;

/// A case touched by the current batch and the number of types written for it.
struct CaseProgress {
    case: Case,
    written: usize,
}

/// Notification preference service.
pub struct NotificationService<'a> {
    db: &'a Database,
}

impl<'a> NotificationService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Write all notification types for every case in `requests` and move
    /// those cases to `NOTIFICATIONS_CONFIGURED`.
    ///
    /// A case listed twice is written twice; the later entry wins.
    pub fn configure_preferences(
        &self,
        requests: &[NotificationPreferenceRequest],
        user_id: i64,
    ) -> WorkflowResult<NotificationSummary> {
        if requests.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add("preferences", "At least one notification preference is required");
            return Err(errors.into());
        }

        self.db.run_in_transaction(|db| {
            ensure_user(db, user_id)?;

            let mut progress: Vec<CaseProgress> = Vec::new();
            let mut created = 0;
            let mut updated = 0;

            for request in requests {
                let case = ensure_case_owner(db, &request.case_id, user_id)?;
                check_eligible(&case, Operation::NotificationPreferencesUpsert)?;
                if request.alert_schedule.is_some() {
                    debug!(case_code = %case.case_id, "alert schedule is not stored");
                }

                let delivery_method = request.stored_delivery_method();
                let mut written = 0;
                for notification_type in NotificationType::ALL {
                    match db.find_notification_preference(user_id, case.id, notification_type)? {
                        Some(mut existing) => {
                            existing.delivery_method = delivery_method.clone();
                            existing.enabled = request.enabled;
                            if !db.update_notification_preference(&existing)? {
                                return Err(WorkflowError::InvalidState(format!(
                                    "Failed to update notification preference for type: {}",
                                    notification_type.as_str()
                                )));
                            }
                            updated += 1;
                        }
                        None => {
                            db.insert_notification_preference(&NewNotificationPreference {
                                case_id: case.id,
                                user_id,
                                notification_type,
                                delivery_method: delivery_method.clone(),
                                enabled: request.enabled,
                            })?;
                            created += 1;
                        }
                    }
                    written += 1;
                }

                // Count restarts for a case listed again
                match progress.iter_mut().find(|p| p.case.id == case.id) {
                    Some(entry) => entry.written = written,
                    None => progress.push(CaseProgress { case, written }),
                }
            }

            let expected = NotificationType::ALL.len();
            for entry in &progress {
                let stored = stored_type_count(db, user_id, entry.case.id)?;
                if entry.written != expected || stored != expected {
                    return Err(WorkflowError::InvalidState(format!(
                        "Failed to set up all notification preferences for case {}. Expected {}, got {}",
                        entry.case.case_id,
                        expected,
                        entry.written.min(stored)
                    )));
                }
            }

            for entry in &progress {
                advance(db, &entry.case, Operation::NotificationPreferencesUpsert)?;
            }

            let cases: Vec<String> = progress.into_iter().map(|p| p.case.case_id).collect();
            info!(
                user_id,
                created,
                updated,
                cases = cases.len(),
                "notification preferences configured"
            );
            Ok(NotificationSummary {
                created,
                updated,
                message: format!(
                    "Successfully processed {} notification preferences ({} created, {} updated) for {} case(s)",
                    created + updated,
                    created,
                    updated,
                    cases.len()
                ),
                cases,
                workflow_state: Operation::NotificationPreferencesUpsert.target(),
            })
        })
    }

    /// Stored preferences of one of the caller's cases.
    pub fn get_case_preferences(
        &self,
        case_code: &str,
        user_id: i64,
    ) -> WorkflowResult<CaseNotificationPreferences> {
        let case = ensure_case_owner(self.db, case_code, user_id)?;
        let preferences = self
            .db
            .list_notification_preferences_for_case(user_id, case.id)?
            .iter()
            .map(|p| NotificationPreferenceView::new(p, &case.case_id))
            .collect();
        Ok(CaseNotificationPreferences {
            workflow_state: case.step(),
            case_id: case.case_id,
            preferences,
        })
    }

    /// All stored preferences of the caller across live cases.
    pub fn list_user_preferences(
        &self,
        user_id: i64,
    ) -> WorkflowResult<Vec<NotificationPreferenceView>> {
        ensure_user(self.db, user_id)?;

        let mut case_codes: HashMap<i64, Option<String>> = HashMap::new();
        let mut views = Vec::new();
        for preference in self.db.list_notification_preferences_for_user(user_id)? {
            if !case_codes.contains_key(&preference.case_id) {
                let code = self.db.get_case(preference.case_id)?.map(|c| c.case_id);
                case_codes.insert(preference.case_id, code);
            }
            // Preferences of soft-deleted cases are hidden
            if let Some(Some(code)) = case_codes.get(&preference.case_id) {
                views.push(NotificationPreferenceView::new(&preference, code));
            }
        }
        Ok(views)
    }
}

fn stored_type_count(db: &Database, user_id: i64, case_id: i64) -> WorkflowResult<usize> {
    let types: HashSet<NotificationType> = db
        .list_notification_preferences_for_case(user_id, case_id)?
        .into_iter()
        .map(|p| p.notification_type)
        .collect();
    Ok(types.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, CaseRegistration, DeliveryChannel, NewUser, WorkflowStep};
    use crate::workflow::{CaseService, Entity};

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .insert_user(&NewUser {
                entra_oid: None,
                email: "owner@example.com".into(),
                first_name: "Owner".into(),
                last_name: "One".into(),
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

    fn request(case_code: &str, enabled: bool) -> NotificationPreferenceRequest {
        NotificationPreferenceRequest {
            case_id: case_code.into(),
            enabled,
            channels: vec![DeliveryChannel::Email, DeliveryChannel::Push],
            alert_schedule: None,
        }
    }

    fn case_step(db: &Database, code: &str) -> Option<WorkflowStep> {
        db.get_case_by_code(code).unwrap().unwrap().step()
    }

    #[test]
    fn test_configure_writes_full_catalog() {
        let (db, user_id) = setup_db();
        let summary = NotificationService::new(&db)
            .configure_preferences(&[request("CASE-1", true)], user_id)
            .unwrap();

        assert_eq!(summary.created, 7);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.cases, vec!["CASE-1".to_string()]);
        assert_eq!(case_step(&db, "CASE-1"), Some(WorkflowStep::NotificationsConfigured));
        assert_eq!(case_step(&db, "CASE-2"), Some(WorkflowStep::Created));

        let case = db.get_case_by_code("CASE-1").unwrap().unwrap();
        let stored = db.list_notification_preferences_for_case(user_id, case.id).unwrap();
        assert_eq!(stored.len(), 7);
        assert!(stored.iter().all(|p| p.delivery_method.as_deref() == Some("email,push")));
    }

    #[test]
    fn test_reconfigure_updates_in_place() {
        let (db, user_id) = setup_db();
        let service = NotificationService::new(&db);
        service.configure_preferences(&[request("CASE-1", true)], user_id).unwrap();

        let summary = service.configure_preferences(&[request("CASE-1", false)], user_id).unwrap();
        assert_eq!(summary.created, 0);
        assert_eq!(summary.updated, 7);

        let view = service.get_case_preferences("CASE-1", user_id).unwrap();
        assert_eq!(view.preferences.len(), 7);
        assert!(view.preferences.iter().all(|p| !p.enabled && p.delivery_methods.is_empty()));
        assert_eq!(view.workflow_state, Some(WorkflowStep::NotificationsConfigured));
    }

    #[test]
    fn test_duplicate_case_entry_last_wins() {
        let (db, user_id) = setup_db();
        let summary = NotificationService::new(&db)
            .configure_preferences(&[request("CASE-1", true), request("CASE-1", false)], user_id)
            .unwrap();

        assert_eq!(summary.created, 7);
        assert_eq!(summary.updated, 7);
        assert_eq!(summary.cases.len(), 1);
        let case = db.get_case_by_code("CASE-1").unwrap().unwrap();
        let stored = db.list_notification_preferences_for_case(user_id, case.id).unwrap();
        assert!(stored.iter().all(|p| !p.enabled));
    }

    #[test]
    fn test_ineligible_case_rolls_back_batch() {
        let (db, user_id) = setup_db();
        let case2 = db.get_case_by_code("CASE-2").unwrap().unwrap();
        db.set_case_step(case2.id, WorkflowStep::EmergencyContactsAdded).unwrap();

        let err = NotificationService::new(&db)
            .configure_preferences(&[request("CASE-1", true), request("CASE-2", true)], user_id)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidWorkflowStep { .. }));

        assert!(db.list_notification_preferences_for_user(user_id).unwrap().is_empty());
        assert_eq!(case_step(&db, "CASE-1"), Some(WorkflowStep::Created));
    }

    #[test]
    fn test_unknown_case_fails() {
        let (db, user_id) = setup_db();
        let err = NotificationService::new(&db)
            .configure_preferences(&[request("CASE-404", true)], user_id)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(Entity::Case)));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let (db, user_id) = setup_db();
        let err = NotificationService::new(&db).configure_preferences(&[], user_id).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn test_list_user_preferences_hides_deleted_cases() {
        let (db, user_id) = setup_db();
        let service = NotificationService::new(&db);
        service
            .configure_preferences(&[request("CASE-1", true), request("CASE-2", true)], user_id)
            .unwrap();
        assert_eq!(service.list_user_preferences(user_id).unwrap().len(), 14);

        let case2 = db.get_case_by_code("CASE-2").unwrap().unwrap();
        db.soft_delete_case(case2.id).unwrap();
        let remaining = service.list_user_preferences(user_id).unwrap();
        assert_eq!(remaining.len(), 7);
        assert!(remaining.iter().all(|p| p.case_id == "CASE-1"));
    }
}

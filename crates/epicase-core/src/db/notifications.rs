//! Notification preference database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{
    now_timestamp, NewNotificationPreference, NotificationPreference, NotificationType,
};

const PREFERENCE_COLUMNS: &str = r#"
    notification_pref_id, case_id, user_id, type, delivery_method,
    enabled, created_at, updated_at, deleted_at
"#;

impl Database {
    /// Insert a new preference row and return it.
    pub fn insert_notification_preference(
        &self,
        preference: &NewNotificationPreference,
    ) -> DbResult<NotificationPreference> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO notification_preferences (
                    case_id, user_id, type, delivery_method, enabled, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                "#,
                params![
                    preference.case_id,
                    preference.user_id,
                    preference.notification_type.as_str(),
                    preference.delivery_method,
                    preference.enabled,
                    now,
                ],
            )
            .map_err(DbError::from_write)?;

        let id = self.conn.last_insert_rowid();
        self.get_notification_preference(id)?
            .ok_or_else(|| DbError::NotFound(format!("notification preference {}", id)))
    }

    /// Get a live preference by key.
    pub fn get_notification_preference(&self, id: i64) -> DbResult<Option<NotificationPreference>> {
        self.query_preferences("notification_pref_id = ?1", params![id])
            .map(|mut rows| rows.pop())
    }

    /// Find the live preference for (user, case, type).
    pub fn find_notification_preference(
        &self,
        user_id: i64,
        case_id: i64,
        notification_type: NotificationType,
    ) -> DbResult<Option<NotificationPreference>> {
        let sql = format!(
            r#"
            SELECT {} FROM notification_preferences
            WHERE user_id = ?1 AND case_id = ?2 AND type = ?3 AND deleted_at IS NULL
            "#,
            PREFERENCE_COLUMNS
        );
        self.conn
            .query_row(
                &sql,
                params![user_id, case_id, notification_type.as_str()],
                |row| {
                    Ok(PreferenceRow {
                        notification_pref_id: row.get(0)?,
                        case_id: row.get(1)?,
                        user_id: row.get(2)?,
                        notification_type: row.get(3)?,
                        delivery_method: row.get(4)?,
                        enabled: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                        deleted_at: row.get(8)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Update delivery method and enabled flag of an existing preference.
    pub fn update_notification_preference(
        &self,
        preference: &NotificationPreference,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE notification_preferences SET
                delivery_method = ?2,
                enabled = ?3,
                updated_at = ?4
            WHERE notification_pref_id = ?1 AND deleted_at IS NULL
            "#,
            params![
                preference.notification_pref_id,
                preference.delivery_method,
                preference.enabled,
                now_timestamp(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// List a user's live preferences for one case.
    pub fn list_notification_preferences_for_case(
        &self,
        user_id: i64,
        case_id: i64,
    ) -> DbResult<Vec<NotificationPreference>> {
        self.query_preferences("user_id = ?1 AND case_id = ?2", params![user_id, case_id])
    }

    /// List all live preferences of a user.
    pub fn list_notification_preferences_for_user(
        &self,
        user_id: i64,
    ) -> DbResult<Vec<NotificationPreference>> {
        self.query_preferences("user_id = ?1", params![user_id])
    }

    /// Soft-delete a preference.
    pub fn soft_delete_notification_preference(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE notification_preferences SET deleted_at = ?2 WHERE notification_pref_id = ?1 AND deleted_at IS NULL",
            params![id, now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }

    fn query_preferences(
        &self,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> DbResult<Vec<NotificationPreference>> {
        let sql = format!(
            "SELECT {} FROM notification_preferences WHERE {} AND deleted_at IS NULL ORDER BY case_id, notification_pref_id",
            PREFERENCE_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok(PreferenceRow {
                notification_pref_id: row.get(0)?,
                case_id: row.get(1)?,
                user_id: row.get(2)?,
                notification_type: row.get(3)?,
                delivery_method: row.get(4)?,
                enabled: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
                deleted_at: row.get(8)?,
            })
        })?;

        let mut preferences = Vec::new();
        for row in rows {
            preferences.push(row?.try_into()?);
        }
        Ok(preferences)
    }
}

/// Intermediate row struct for database mapping.
struct PreferenceRow {
    notification_pref_id: i64,
    case_id: i64,
    user_id: i64,
    notification_type: String,
    delivery_method: Option<String>,
    enabled: bool,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<PreferenceRow> for NotificationPreference {
    type Error = DbError;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        let notification_type = NotificationType::parse(&row.notification_type).ok_or_else(|| {
            DbError::Constraint(format!("Unknown notification type: {}", row.notification_type))
        })?;

        Ok(NotificationPreference {
            notification_pref_id: row.notification_pref_id,
            case_id: row.case_id,
            user_id: row.user_id,
            notification_type,
            delivery_method: row.delivery_method,
            enabled: row.enabled,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, NewCase, NewUser, WorkflowStep};

    fn setup_db() -> (Database, i64, i64) {
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
        let case = db
            .insert_case(&NewCase {
                case_id: "CASE-1".into(),
                user_id: user.user_id,
                case_name: "Gym bag".into(),
                battery_level: None,
                connection_status: "disconnected".into(),
                current_step: WorkflowStep::Created,
            })
            .unwrap();
        (db, user.user_id, case.id)
    }

    fn new_pref(user_id: i64, case_id: i64, t: NotificationType) -> NewNotificationPreference {
        NewNotificationPreference {
            case_id,
            user_id,
            notification_type: t,
            delivery_method: Some("email,sms".into()),
            enabled: true,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let (db, user_id, case_id) = setup_db();
        let pref = db
            .insert_notification_preference(&new_pref(user_id, case_id, NotificationType::EmergencyAlert))
            .unwrap();

        let found = db
            .find_notification_preference(user_id, case_id, NotificationType::EmergencyAlert)
            .unwrap()
            .unwrap();
        assert_eq!(found.notification_pref_id, pref.notification_pref_id);
        assert_eq!(found.delivery_method.as_deref(), Some("email,sms"));
        assert!(db
            .find_notification_preference(user_id, case_id, NotificationType::SystemMaintenance)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_to_disabled() {
        let (db, user_id, case_id) = setup_db();
        let mut pref = db
            .insert_notification_preference(&new_pref(user_id, case_id, NotificationType::BatteryLowAlert))
            .unwrap();

        pref.enabled = false;
        pref.delivery_method = None;
        assert!(db.update_notification_preference(&pref).unwrap());

        let stored = db.get_notification_preference(pref.notification_pref_id).unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(stored.delivery_method, None);
    }

    #[test]
    fn test_list_for_case_and_user() {
        let (db, user_id, case_id) = setup_db();
        for t in NotificationType::ALL {
            db.insert_notification_preference(&new_pref(user_id, case_id, t)).unwrap();
        }

        assert_eq!(db.list_notification_preferences_for_case(user_id, case_id).unwrap().len(), 7);
        assert_eq!(db.list_notification_preferences_for_user(user_id).unwrap().len(), 7);
        assert!(db.list_notification_preferences_for_user(user_id + 1).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let (db, user_id, case_id) = setup_db();
        db.insert_notification_preference(&new_pref(user_id, case_id, NotificationType::CaseStatusUpdate))
            .unwrap();
        let err = db
            .insert_notification_preference(&new_pref(user_id, case_id, NotificationType::CaseStatusUpdate))
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }
}

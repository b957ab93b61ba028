//! Emergency contact database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{now_timestamp, EmergencyContact, NewEmergencyContact};

const CONTACT_COLUMNS: &str = r#"
    contact_id, case_id, first_name, last_name, email, phone_number,
    invite_sent, created_at, updated_at, deleted_at
"#;

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<EmergencyContact> {
    Ok(EmergencyContact {
        contact_id: row.get(0)?,
        case_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        phone_number: row.get(5)?,
        invite_sent: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        deleted_at: row.get(9)?,
    })
}

impl Database {
    pub fn insert_emergency_contact(
        &self,
        contact: &NewEmergencyContact,
    ) -> DbResult<EmergencyContact> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO emergency_contacts (
                    case_id, first_name, last_name, email, phone_number,
                    invite_sent, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                "#,
                params![
                    contact.case_id,
                    contact.first_name,
                    contact.last_name,
                    contact.email,
                    contact.phone_number,
                    contact.invite_sent,
                    now,
                ],
            )
            .map_err(DbError::from_write)?;

        let contact_id = self.conn.last_insert_rowid();
        self.get_emergency_contact(contact_id)?
            .ok_or_else(|| DbError::NotFound(format!("emergency contact {}", contact_id)))
    }

    pub fn get_emergency_contact(&self, contact_id: i64) -> DbResult<Option<EmergencyContact>> {
        let sql = format!(
            "SELECT {} FROM emergency_contacts WHERE contact_id = ?1 AND deleted_at IS NULL",
            CONTACT_COLUMNS
        );
        self.conn
            .query_row(&sql, [contact_id], contact_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Find the live contact with this email on a case.
    pub fn find_emergency_contact_by_case_and_email(
        &self,
        case_id: i64,
        email: &str,
    ) -> DbResult<Option<EmergencyContact>> {
        let sql = format!(
            "SELECT {} FROM emergency_contacts WHERE case_id = ?1 AND email = ?2 AND deleted_at IS NULL",
            CONTACT_COLUMNS
        );
        self.conn
            .query_row(&sql, params![case_id, email], contact_from_row)
            .optional()
            .map_err(Into::into)
    }

    pub fn update_emergency_contact(&self, contact: &EmergencyContact) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE emergency_contacts SET
                first_name = ?2,
                last_name = ?3,
                phone_number = ?4,
                invite_sent = ?5,
                updated_at = ?6
            WHERE contact_id = ?1 AND deleted_at IS NULL
            "#,
            params![
                contact.contact_id,
                contact.first_name,
                contact.last_name,
                contact.phone_number,
                contact.invite_sent,
                now_timestamp(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// List live contacts of a case in insertion order.
    pub fn list_emergency_contacts_for_case(&self, case_id: i64) -> DbResult<Vec<EmergencyContact>> {
        let sql = format!(
            "SELECT {} FROM emergency_contacts WHERE case_id = ?1 AND deleted_at IS NULL ORDER BY contact_id",
            CONTACT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([case_id], contact_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn soft_delete_emergency_contact(&self, contact_id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE emergency_contacts SET deleted_at = ?2 WHERE contact_id = ?1 AND deleted_at IS NULL",
            params![contact_id, now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, NewCase, NewUser, WorkflowStep};

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
        let case = db
            .insert_case(&NewCase {
                case_id: "CASE-1".into(),
                user_id: user.user_id,
                case_name: "Travel kit".into(),
                battery_level: None,
                connection_status: "disconnected".into(),
                current_step: WorkflowStep::Created,
            })
            .unwrap();
        (db, case.id)
    }

    fn new_contact(case_id: i64, email: &str) -> NewEmergencyContact {
        NewEmergencyContact {
            case_id,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: email.into(),
            phone_number: "+15551234567".into(),
            invite_sent: false,
        }
    }

    #[test]
    fn test_insert_and_find_by_email() {
        let (db, case_id) = setup_db();
        let contact = db
            .insert_emergency_contact(&new_contact(case_id, "jane@example.com"))
            .unwrap();

        let found = db
            .find_emergency_contact_by_case_and_email(case_id, "jane@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(found.contact_id, contact.contact_id);
        assert!(!found.invite_sent);
        assert!(db
            .find_emergency_contact_by_case_and_email(case_id, "john@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_update_contact() {
        let (db, case_id) = setup_db();
        let mut contact = db
            .insert_emergency_contact(&new_contact(case_id, "jane@example.com"))
            .unwrap();

        contact.phone_number = "+15559876543".into();
        contact.invite_sent = true;
        assert!(db.update_emergency_contact(&contact).unwrap());

        let stored = db.get_emergency_contact(contact.contact_id).unwrap().unwrap();
        assert_eq!(stored.phone_number, "+15559876543");
        assert!(stored.invite_sent);
    }

    #[test]
    fn test_duplicate_email_per_case_rejected() {
        let (db, case_id) = setup_db();
        db.insert_emergency_contact(&new_contact(case_id, "jane@example.com"))
            .unwrap();
        let err = db
            .insert_emergency_contact(&new_contact(case_id, "jane@example.com"))
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }

    #[test]
    fn test_list_skips_deleted() {
        let (db, case_id) = setup_db();
        let jane = db
            .insert_emergency_contact(&new_contact(case_id, "jane@example.com"))
            .unwrap();
        db.insert_emergency_contact(&new_contact(case_id, "john@example.com"))
            .unwrap();
        db.soft_delete_emergency_contact(jane.contact_id).unwrap();

        let contacts = db.list_emergency_contacts_for_case(case_id).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].email, "john@example.com");
    }
}

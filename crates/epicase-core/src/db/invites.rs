//! Case invitation database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{now_timestamp, InvitedUser};

const INVITE_COLUMNS: &str =
    "invited_user_id, case_id, user_id, email, created_at, updated_at, deleted_at";

fn invite_from_row(row: &Row<'_>) -> rusqlite::Result<InvitedUser> {
    Ok(InvitedUser {
        invited_user_id: row.get(0)?,
        case_id: row.get(1)?,
        user_id: row.get(2)?,
        email: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        deleted_at: row.get(6)?,
    })
}

impl Database {
    /// Record a pending invitation of `email` to a case.
    pub fn insert_invited_user(&self, case_id: i64, email: &str) -> DbResult<InvitedUser> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO invited_users (case_id, user_id, email, created_at, updated_at)
                VALUES (?1, NULL, ?2, ?3, ?3)
                "#,
                params![case_id, email, now],
            )
            .map_err(DbError::from_write)?;

        let id = self.conn.last_insert_rowid();
        self.get_invited_user(id)?
            .ok_or_else(|| DbError::NotFound(format!("invited user {}", id)))
    }

    pub fn get_invited_user(&self, invited_user_id: i64) -> DbResult<Option<InvitedUser>> {
        let sql = format!(
            "SELECT {} FROM invited_users WHERE invited_user_id = ?1 AND deleted_at IS NULL",
            INVITE_COLUMNS
        );
        self.conn
            .query_row(&sql, [invited_user_id], invite_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Find the live invitation of `email` on a case.
    pub fn find_invited_user(&self, case_id: i64, email: &str) -> DbResult<Option<InvitedUser>> {
        let sql = format!(
            "SELECT {} FROM invited_users WHERE case_id = ?1 AND email = ?2 AND deleted_at IS NULL",
            INVITE_COLUMNS
        );
        self.conn
            .query_row(&sql, params![case_id, email], invite_from_row)
            .optional()
            .map_err(Into::into)
    }

    pub fn invite_exists_for_case(&self, case_id: i64, email: &str) -> DbResult<bool> {
        Ok(self.find_invited_user(case_id, email)?.is_some())
    }

    pub fn list_invited_users_for_case(&self, case_id: i64) -> DbResult<Vec<InvitedUser>> {
        let sql = format!(
            "SELECT {} FROM invited_users WHERE case_id = ?1 AND deleted_at IS NULL ORDER BY invited_user_id",
            INVITE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([case_id], invite_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Live invitations addressed to `email` that no user has claimed yet.
    pub fn list_pending_invites_for_email(&self, email: &str) -> DbResult<Vec<InvitedUser>> {
        let sql = format!(
            "SELECT {} FROM invited_users WHERE email = ?1 AND user_id IS NULL AND deleted_at IS NULL ORDER BY invited_user_id",
            INVITE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([email], invite_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Attach a registered user to a pending invitation.
    pub fn resolve_invited_user(&self, invited_user_id: i64, user_id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE invited_users SET user_id = ?2, updated_at = ?3
                WHERE invited_user_id = ?1 AND user_id IS NULL AND deleted_at IS NULL
                "#,
                params![invited_user_id, user_id, now_timestamp()],
            )
            .map_err(DbError::from_write)?;
        Ok(rows_affected > 0)
    }

    pub fn soft_delete_invited_user(&self, invited_user_id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE invited_users SET deleted_at = ?2 WHERE invited_user_id = ?1 AND deleted_at IS NULL",
            params![invited_user_id, now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, NewCase, NewUser, WorkflowStep};

    fn setup_db() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let owner = db
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
                user_id: owner.user_id,
                case_name: "Travel kit".into(),
                battery_level: None,
                connection_status: "disconnected".into(),
                current_step: WorkflowStep::Created,
            })
            .unwrap();
        (db, owner.user_id, case.id)
    }

    #[test]
    fn test_insert_and_exists() {
        let (db, _, case_id) = setup_db();
        let invite = db.insert_invited_user(case_id, "friend@example.com").unwrap();

        assert!(!invite.is_resolved());
        assert!(db.invite_exists_for_case(case_id, "friend@example.com").unwrap());
        assert!(!db.invite_exists_for_case(case_id, "other@example.com").unwrap());
    }

    #[test]
    fn test_duplicate_invite_rejected() {
        let (db, _, case_id) = setup_db();
        db.insert_invited_user(case_id, "friend@example.com").unwrap();
        let err = db.insert_invited_user(case_id, "friend@example.com").unwrap_err();
        assert!(matches!(err, DbError::Constraint(_)));
    }

    #[test]
    fn test_resolve_pending_invite() {
        let (db, owner_id, case_id) = setup_db();
        let invite = db.insert_invited_user(case_id, "friend@example.com").unwrap();

        assert_eq!(db.list_pending_invites_for_email("friend@example.com").unwrap().len(), 1);
        assert!(db.resolve_invited_user(invite.invited_user_id, owner_id).unwrap());
        // Already resolved
        assert!(!db.resolve_invited_user(invite.invited_user_id, owner_id).unwrap());

        assert!(db.list_pending_invites_for_email("friend@example.com").unwrap().is_empty());
        let stored = db.get_invited_user(invite.invited_user_id).unwrap().unwrap();
        assert_eq!(stored.user_id, Some(owner_id));
    }

    #[test]
    fn test_list_for_case() {
        let (db, _, case_id) = setup_db();
        let first = db.insert_invited_user(case_id, "a@example.com").unwrap();
        db.insert_invited_user(case_id, "b@example.com").unwrap();
        db.soft_delete_invited_user(first.invited_user_id).unwrap();

        let invites = db.list_invited_users_for_case(case_id).unwrap();
        assert_eq!(invites.len(), 1);
        assert_eq!(invites[0].email, "b@example.com");
    }
}

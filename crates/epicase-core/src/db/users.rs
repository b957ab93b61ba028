//! User database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{now_timestamp, AccountStatus, NewUser, User};

const USER_COLUMNS: &str = r#"
    user_id, entra_oid, first_name, last_name, email, phone_number,
    account_status, first_login_completed, created_at, updated_at, deleted_at
"#;

impl Database {
    /// Insert a new user and return the stored row.
    pub fn insert_user(&self, user: &NewUser) -> DbResult<User> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO users (
                    entra_oid, first_name, last_name, email, phone_number,
                    account_status, first_login_completed, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)
                "#,
                params![
                    user.entra_oid,
                    user.first_name,
                    user.last_name,
                    user.email,
                    user.phone_number,
                    user.account_status.as_str(),
                    now,
                ],
            )
            .map_err(DbError::from_write)?;

        let user_id = self.conn.last_insert_rowid();
        self.get_user(user_id)?
            .ok_or_else(|| DbError::NotFound(format!("user {}", user_id)))
    }

    /// Get a live user by key.
    pub fn get_user(&self, user_id: i64) -> DbResult<Option<User>> {
        self.query_user("user_id = ?1", params![user_id])
    }

    /// Get a live user by email.
    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.query_user("email = ?1", params![email])
    }

    /// Get a live user by external-auth subject.
    pub fn get_user_by_entra_oid(&self, entra_oid: &str) -> DbResult<Option<User>> {
        self.query_user("entra_oid = ?1", params![entra_oid])
    }

    /// Update profile fields of an existing user.
    pub fn update_user(&self, user: &User) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE users SET
                    entra_oid = ?2,
                    first_name = ?3,
                    last_name = ?4,
                    email = ?5,
                    phone_number = ?6,
                    account_status = ?7,
                    first_login_completed = ?8,
                    updated_at = ?9
                WHERE user_id = ?1 AND deleted_at IS NULL
                "#,
                params![
                    user.user_id,
                    user.entra_oid,
                    user.first_name,
                    user.last_name,
                    user.email,
                    user.phone_number,
                    user.account_status.as_str(),
                    user.first_login_completed,
                    now_timestamp(),
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(rows_affected > 0)
    }

    /// Soft-delete a user.
    pub fn soft_delete_user(&self, user_id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE users SET deleted_at = ?2 WHERE user_id = ?1 AND deleted_at IS NULL",
            params![user_id, now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }

    fn query_user(&self, filter: &str, args: &[&dyn rusqlite::ToSql]) -> DbResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} AND deleted_at IS NULL",
            USER_COLUMNS, filter
        );
        self.conn
            .query_row(&sql, args, |row| {
                Ok(UserRow {
                    user_id: row.get(0)?,
                    entra_oid: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                    email: row.get(4)?,
                    phone_number: row.get(5)?,
                    account_status: row.get(6)?,
                    first_login_completed: row.get(7)?,
                    created_at: row.get(8)?,
                    updated_at: row.get(9)?,
                    deleted_at: row.get(10)?,
                })
            })
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

/// Intermediate row struct for database mapping.
struct UserRow {
    user_id: i64,
    entra_oid: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    account_status: String,
    first_login_completed: bool,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let account_status = AccountStatus::parse(&row.account_status).ok_or_else(|| {
            DbError::Constraint(format!("Unknown account status: {}", row.account_status))
        })?;

        Ok(User {
            user_id: row.user_id,
            entra_oid: row.entra_oid,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            account_status,
            first_login_completed: row.first_login_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

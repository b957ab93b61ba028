//! Case database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{now_timestamp, Case, NewCase, WorkflowStep};

const CASE_COLUMNS: &str = r#"
    id, case_id, patient_id, user_id, case_name, current_step,
    battery_level, last_seen, connection_status, created_at, updated_at, deleted_at
"#;

fn case_from_row(row: &Row<'_>) -> rusqlite::Result<Case> {
    Ok(Case {
        id: row.get(0)?,
        case_id: row.get(1)?,
        patient_id: row.get(2)?,
        user_id: row.get(3)?,
        case_name: row.get(4)?,
        current_step: row.get(5)?,
        battery_level: row.get(6)?,
        last_seen: row.get(7)?,
        connection_status: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        deleted_at: row.get(11)?,
    })
}

impl Database {
    /// Insert a new case and return the stored row.
    pub fn insert_case(&self, case: &NewCase) -> DbResult<Case> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO cases (
                    case_id, patient_id, user_id, case_name, current_step,
                    battery_level, last_seen, connection_status, created_at, updated_at
                ) VALUES (?1, NULL, ?2, ?3, ?4, ?5, NULL, ?6, ?7, ?7)
                "#,
                params![
                    case.case_id,
                    case.user_id,
                    case.case_name,
                    case.current_step.as_str(),
                    case.battery_level,
                    case.connection_status,
                    now,
                ],
            )
            .map_err(DbError::from_write)?;

        let id = self.conn.last_insert_rowid();
        self.get_case(id)?
            .ok_or_else(|| DbError::NotFound(format!("case {}", id)))
    }

    /// Get a live case by numeric key.
    pub fn get_case(&self, id: i64) -> DbResult<Option<Case>> {
        let sql = format!(
            "SELECT {} FROM cases WHERE id = ?1 AND deleted_at IS NULL",
            CASE_COLUMNS
        );
        self.conn
            .query_row(&sql, [id], case_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Get a live case by caller-supplied case code.
    pub fn get_case_by_code(&self, case_code: &str) -> DbResult<Option<Case>> {
        let sql = format!(
            "SELECT {} FROM cases WHERE case_id = ?1 AND deleted_at IS NULL",
            CASE_COLUMNS
        );
        self.conn
            .query_row(&sql, [case_code], case_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// List live cases owned by a user, oldest first.
    pub fn list_cases_for_user(&self, user_id: i64) -> DbResult<Vec<Case>> {
        let sql = format!(
            "SELECT {} FROM cases WHERE user_id = ?1 AND deleted_at IS NULL ORDER BY id",
            CASE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], case_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Update the caller-editable fields of a case.
    ///
    /// Owner, patient link and workflow step are not touched here.
    pub fn update_case_fields(&self, case: &Case) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE cases SET
                case_name = ?2,
                battery_level = ?3,
                last_seen = ?4,
                connection_status = ?5,
                updated_at = ?6
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
            params![
                case.id,
                case.case_name,
                case.battery_level,
                case.last_seen,
                case.connection_status,
                now_timestamp(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Associate a patient with a case.
    pub fn set_case_patient(&self, id: i64, patient_id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE cases SET patient_id = ?2, updated_at = ?3 WHERE id = ?1 AND deleted_at IS NULL",
                params![id, patient_id, now_timestamp()],
            )
            .map_err(DbError::from_write)?;
        Ok(rows_affected > 0)
    }

    /// Write the workflow step of a case. Last writer wins.
    pub fn set_case_step(&self, id: i64, step: WorkflowStep) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE cases SET current_step = ?2, updated_at = ?3 WHERE id = ?1 AND deleted_at IS NULL",
            params![id, step.as_str(), now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }

    /// Soft-delete a case.
    pub fn soft_delete_case(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE cases SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
            params![id, now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }
}

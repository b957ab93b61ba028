//! Medication database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{now_timestamp, Medication, NewMedication};

const MEDICATION_COLUMNS: &str = r#"
    spray_id, case_id, spray_number, status,
    expiration_date_spray_1, lot_number_spray_1,
    expiration_date_spray_2, lot_number_spray_2,
    dosage_details, created_at, updated_at, deleted_at
"#;

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        spray_id: row.get(0)?,
        case_id: row.get(1)?,
        spray_number: row.get(2)?,
        status: row.get(3)?,
        expiration_date_spray_1: row.get(4)?,
        lot_number_spray_1: row.get(5)?,
        expiration_date_spray_2: row.get(6)?,
        lot_number_spray_2: row.get(7)?,
        dosage_details: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
        deleted_at: row.get(11)?,
    })
}

impl Database {
    /// Insert a new medication row and return it.
    pub fn insert_medication(&self, medication: &NewMedication) -> DbResult<Medication> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO medications (
                    case_id, spray_number, status,
                    expiration_date_spray_1, lot_number_spray_1,
                    expiration_date_spray_2, lot_number_spray_2,
                    dosage_details, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                "#,
                params![
                    medication.case_id,
                    medication.spray_number,
                    medication.status,
                    medication.expiration_date_spray_1,
                    medication.lot_number_spray_1,
                    medication.expiration_date_spray_2,
                    medication.lot_number_spray_2,
                    medication.dosage_details,
                    now,
                ],
            )
            .map_err(DbError::from_write)?;

        let spray_id = self.conn.last_insert_rowid();
        self.get_medication(spray_id)?
            .ok_or_else(|| DbError::NotFound(format!("medication {}", spray_id)))
    }

    /// Get a live medication by key.
    pub fn get_medication(&self, spray_id: i64) -> DbResult<Option<Medication>> {
        let sql = format!(
            "SELECT {} FROM medications WHERE spray_id = ?1 AND deleted_at IS NULL",
            MEDICATION_COLUMNS
        );
        self.conn
            .query_row(&sql, [spray_id], medication_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Find the live medication in a spray slot of a case.
    pub fn find_medication_by_case_and_spray(
        &self,
        case_id: i64,
        spray_number: u8,
    ) -> DbResult<Option<Medication>> {
        let sql = format!(
            "SELECT {} FROM medications WHERE case_id = ?1 AND spray_number = ?2 AND deleted_at IS NULL",
            MEDICATION_COLUMNS
        );
        self.conn
            .query_row(&sql, params![case_id, spray_number], medication_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Update an existing medication row.
    pub fn update_medication(&self, medication: &Medication) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE medications SET
                status = ?2,
                expiration_date_spray_1 = ?3,
                lot_number_spray_1 = ?4,
                expiration_date_spray_2 = ?5,
                lot_number_spray_2 = ?6,
                dosage_details = ?7,
                updated_at = ?8
            WHERE spray_id = ?1 AND deleted_at IS NULL
            "#,
            params![
                medication.spray_id,
                medication.status,
                medication.expiration_date_spray_1,
                medication.lot_number_spray_1,
                medication.expiration_date_spray_2,
                medication.lot_number_spray_2,
                medication.dosage_details,
                now_timestamp(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// List live medications of a case ordered by spray number.
    pub fn list_medications_for_case(&self, case_id: i64) -> DbResult<Vec<Medication>> {
        let sql = format!(
            "SELECT {} FROM medications WHERE case_id = ?1 AND deleted_at IS NULL ORDER BY spray_number",
            MEDICATION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([case_id], medication_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Soft-delete a medication row.
    pub fn soft_delete_medication(&self, spray_id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE medications SET deleted_at = ?2 WHERE spray_id = ?1 AND deleted_at IS NULL",
            params![spray_id, now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }
}

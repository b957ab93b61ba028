//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{now_timestamp, NewPatient, Patient, PatientIdentity};

const PATIENT_COLUMNS: &str = r#"
    patient_id, user_id, first_name, last_name, date_of_birth,
    allergies_medical_history, is_self, invite_email, location, postal_code,
    created_at, updated_at, deleted_at
"#;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        patient_id: row.get(0)?,
        user_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        date_of_birth: row.get(4)?,
        allergies_medical_history: row.get(5)?,
        is_self: row.get(6)?,
        invite_email: row.get(7)?,
        location: row.get(8)?,
        postal_code: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        deleted_at: row.get(12)?,
    })
}

impl Database {
    /// Insert a new patient and return the stored row.
    pub fn insert_patient(&self, patient: &NewPatient) -> DbResult<Patient> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO patients (
                    user_id, first_name, last_name, date_of_birth,
                    allergies_medical_history, is_self, invite_email,
                    location, postal_code, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                "#,
                params![
                    patient.user_id,
                    patient.first_name,
                    patient.last_name,
                    patient.date_of_birth,
                    patient.allergies_medical_history,
                    patient.is_self,
                    patient.invite_email,
                    patient.location,
                    patient.postal_code,
                    now,
                ],
            )
            .map_err(DbError::from_write)?;

        let patient_id = self.conn.last_insert_rowid();
        self.get_patient(patient_id)?
            .ok_or_else(|| DbError::NotFound(format!("patient {}", patient_id)))
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                first_name = ?2,
                last_name = ?3,
                date_of_birth = ?4,
                allergies_medical_history = ?5,
                is_self = ?6,
                invite_email = ?7,
                location = ?8,
                postal_code = ?9,
                updated_at = ?10
            WHERE patient_id = ?1 AND deleted_at IS NULL
            "#,
            params![
                patient.patient_id,
                patient.first_name,
                patient.last_name,
                patient.date_of_birth,
                patient.allergies_medical_history,
                patient.is_self,
                patient.invite_email,
                patient.location,
                patient.postal_code,
                now_timestamp(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a live patient by key.
    pub fn get_patient(&self, patient_id: i64) -> DbResult<Option<Patient>> {
        let sql = format!(
            "SELECT {} FROM patients WHERE patient_id = ?1 AND deleted_at IS NULL",
            PATIENT_COLUMNS
        );
        self.conn
            .query_row(&sql, [patient_id], patient_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// Find a live patient of a user by natural identity.
    ///
    /// Returns the oldest match if legacy data holds several.
    pub fn find_patient_by_identity(
        &self,
        identity: &PatientIdentity<'_>,
    ) -> DbResult<Option<Patient>> {
        let sql = format!(
            r#"
            SELECT {} FROM patients
            WHERE user_id = ?1 AND first_name = ?2 AND last_name = ?3
              AND date_of_birth = ?4 AND deleted_at IS NULL
            ORDER BY patient_id
            LIMIT 1
            "#,
            PATIENT_COLUMNS
        );
        self.conn
            .query_row(
                &sql,
                params![
                    identity.user_id,
                    identity.first_name,
                    identity.last_name,
                    identity.date_of_birth,
                ],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List live patients owned by a user.
    pub fn list_patients_for_user(&self, user_id: i64) -> DbResult<Vec<Patient>> {
        let sql = format!(
            "SELECT {} FROM patients WHERE user_id = ?1 AND deleted_at IS NULL ORDER BY last_name, first_name",
            PATIENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Soft-delete a patient.
    pub fn soft_delete_patient(&self, patient_id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET deleted_at = ?2 WHERE patient_id = ?1 AND deleted_at IS NULL",
            params![patient_id, now_timestamp()],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, NewUser};
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
        (db, user.user_id)
    }

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 4, 2).unwrap()
    }

    fn new_patient(user_id: i64, first: &str) -> NewPatient {
        NewPatient {
            user_id,
            first_name: first.into(),
            last_name: "Parent".into(),
            date_of_birth: dob(),
            allergies_medical_history: Some("Peanuts".into()),
            is_self: false,
            invite_email: None,
            location: "Springfield".into(),
            postal_code: "12345".into(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let (db, user_id) = setup_db();
        let patient = db.insert_patient(&new_patient(user_id, "Max")).unwrap();

        let retrieved = db.get_patient(patient.patient_id).unwrap().unwrap();
        assert_eq!(retrieved.first_name, "Max");
        assert_eq!(retrieved.date_of_birth, dob());
        assert_eq!(retrieved.allergies_medical_history, Some("Peanuts".into()));
        assert!(!retrieved.is_self);
    }

    #[test]
    fn test_update_patient() {
        let (db, user_id) = setup_db();
        let mut patient = db.insert_patient(&new_patient(user_id, "Max")).unwrap();

        patient.invite_email = Some("max@example.com".into());
        patient.location = "Shelbyville".into();
        assert!(db.update_patient(&patient).unwrap());

        let retrieved = db.get_patient(patient.patient_id).unwrap().unwrap();
        assert_eq!(retrieved.invite_email, Some("max@example.com".into()));
        assert_eq!(retrieved.location, "Shelbyville");
    }

    #[test]
    fn test_find_by_identity() {
        let (db, user_id) = setup_db();
        let max = db.insert_patient(&new_patient(user_id, "Max")).unwrap();
        db.insert_patient(&new_patient(user_id, "Luna")).unwrap();

        let identity = PatientIdentity {
            user_id,
            first_name: "Max",
            last_name: "Parent",
            date_of_birth: dob(),
        };
        let found = db.find_patient_by_identity(&identity).unwrap().unwrap();
        assert_eq!(found.patient_id, max.patient_id);
        assert!(found.matches_identity(&identity));

        let other_user = PatientIdentity {
            user_id: user_id + 1,
            ..identity
        };
        assert!(db.find_patient_by_identity(&other_user).unwrap().is_none());
    }

    #[test]
    fn test_soft_deleted_patient_not_reused() {
        let (db, user_id) = setup_db();
        let max = db.insert_patient(&new_patient(user_id, "Max")).unwrap();
        db.soft_delete_patient(max.patient_id).unwrap();

        let identity = PatientIdentity {
            user_id,
            first_name: "Max",
            last_name: "Parent",
            date_of_birth: dob(),
        };
        assert!(db.find_patient_by_identity(&identity).unwrap().is_none());
        assert_eq!(db.list_patients_for_user(user_id).unwrap().len(), 0);
    }
}

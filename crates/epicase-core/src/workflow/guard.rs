//! Ownership Guard.

use tracing::warn;

use super::{Entity, WorkflowError, WorkflowResult};
use crate::db::Database;
use crate::models::{Case, User};

/// Resolve the acting user.
pub fn ensure_user(db: &Database, user_id: i64) -> WorkflowResult<User> {
    db.get_user(user_id)?
        .ok_or(WorkflowError::NotFound(Entity::User))
}

/// Resolve a live case by code and assert `user_id` owns it.
pub fn ensure_case_owner(db: &Database, case_code: &str, user_id: i64) -> WorkflowResult<Case> {
    let case = db
        .get_case_by_code(case_code)?
        .ok_or(WorkflowError::NotFound(Entity::Case))?;

    if !case.is_owned_by(user_id) {
        warn!(case_code, user_id, "case access denied");
        return Err(WorkflowError::Unauthorized(format!(
            "You are not authorized to access case {}",
            case_code
        )));
    }
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, NewCase, NewUser, WorkflowStep};

    fn add_user(db: &Database, email: &str) -> i64 {
        db.insert_user(&NewUser {
            entra_oid: None,
            email: email.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            phone_number: None,
            account_status: AccountStatus::Complete,
        })
        .unwrap()
        .user_id
    }

    #[test]
    fn test_guard_outcomes() {
        let db = Database::open_in_memory().unwrap();
        let owner = add_user(&db, "a@example.com");
        let other = add_user(&db, "b@example.com");
        let case = db
            .insert_case(&NewCase {
                case_id: "CASE-1".into(),
                user_id: owner,
                case_name: "Kit".into(),
                battery_level: None,
                connection_status: "disconnected".into(),
                current_step: WorkflowStep::Created,
            })
            .unwrap();

        assert_eq!(ensure_case_owner(&db, "CASE-1", owner).unwrap().id, case.id);
        assert!(matches!(
            ensure_case_owner(&db, "CASE-1", other),
            Err(WorkflowError::Unauthorized(_))
        ));
        assert!(matches!(
            ensure_case_owner(&db, "CASE-9", owner),
            Err(WorkflowError::NotFound(Entity::Case))
        ));

        db.soft_delete_case(case.id).unwrap();
        assert!(matches!(
            ensure_case_owner(&db, "CASE-1", owner),
            Err(WorkflowError::NotFound(Entity::Case))
        ));
    }

    #[test]
    fn test_missing_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            ensure_user(&db, 42),
            Err(WorkflowError::NotFound(Entity::User))
        ));
    }
}

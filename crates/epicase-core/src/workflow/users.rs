//! User provisioning and profile operations.

use tracing::info;

use super::invites::resolve_invites_for_user;
use super::{ensure_user, Entity, ProfileView, UserView, WorkflowError, WorkflowResult};
use crate::db::{Database, DbError};
use crate::models::{AccountStatus, NewUser, User, UserRegistration};

/// First name stored when the identity provider supplies none.
pub const DEFAULT_FIRST_NAME: &str = "User";

/// User service.
pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Provision a user from the external-auth sign-up flow and claim any
    /// invitations already addressed to their email.
    pub fn register_user(&self, reg: &UserRegistration) -> WorkflowResult<UserView> {
        self.db.run_in_transaction(|db| {
            let email = reg.email.trim();
            let entra_oid = reg.entra_oid.trim();
            if db.get_user_by_email(email)?.is_some() {
                return Err(WorkflowError::Conflict(
                    "User with this email already exists".into(),
                ));
            }
            if db.get_user_by_entra_oid(entra_oid)?.is_some() {
                return Err(WorkflowError::Conflict(
                    "User with this Entra OID already exists".into(),
                ));
            }

            let first_name = reg
                .first_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_FIRST_NAME);
            let last_name = reg.last_name.as_deref().map(str::trim).unwrap_or_default();

            let user = db
                .insert_user(&NewUser {
                    entra_oid: Some(entra_oid.to_string()),
                    email: email.to_string(),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    phone_number: reg.phone_number.clone(),
                    account_status: reg.account_status.unwrap_or_default(),
                })
                .map_err(|e| match e {
                    DbError::Constraint(_) => {
                        WorkflowError::Conflict("User already exists".into())
                    }
                    other => other.into(),
                })?;

            let resolved = resolve_invites_for_user(db, &user)?;
            info!(user_id = user.user_id, resolved_invites = resolved, "user registered");
            Ok(UserView::from(&user))
        })
    }

    pub fn get_user_by_entra_oid(&self, entra_oid: &str) -> WorkflowResult<UserView> {
        let user = self.user_by_oid(self.db, entra_oid)?;
        Ok(UserView::from(&user))
    }

    /// Profile of the acting user.
    pub fn get_profile(&self, user_id: i64) -> WorkflowResult<ProfileView> {
        let user = self
            .db
            .get_user(user_id)?
            .ok_or_else(|| WorkflowError::Unauthorized("user not found".into()))?;
        Ok(ProfileView::from(&user))
    }

    /// Mark the first login of `entra_oid` as completed.
    ///
    /// Users may only mark their own account.
    pub fn mark_first_login_completed(
        &self,
        entra_oid: &str,
        acting_user_id: i64,
    ) -> WorkflowResult<UserView> {
        self.db.run_in_transaction(|db| {
            ensure_user(db, acting_user_id)?;
            let mut user = self.user_by_oid(db, entra_oid)?;
            if user.user_id != acting_user_id {
                return Err(WorkflowError::Unauthorized(
                    "Cannot update another user's first login status".into(),
                ));
            }

            user.first_login_completed = true;
            let user = save_user(db, &user)?;
            info!(user_id = user.user_id, "first login completed");
            Ok(UserView::from(&user))
        })
    }

    pub fn update_account_status(
        &self,
        entra_oid: &str,
        status: AccountStatus,
    ) -> WorkflowResult<UserView> {
        self.db.run_in_transaction(|db| {
            let mut user = self.user_by_oid(db, entra_oid)?;
            user.account_status = status;
            let user = save_user(db, &user)?;
            info!(user_id = user.user_id, status = status.as_str(), "account status updated");
            Ok(UserView::from(&user))
        })
    }

    fn user_by_oid(&self, db: &Database, entra_oid: &str) -> WorkflowResult<User> {
        db.get_user_by_entra_oid(entra_oid)?
            .ok_or(WorkflowError::NotFound(Entity::User))
    }
}

fn save_user(db: &Database, user: &User) -> WorkflowResult<User> {
    if !db.update_user(user)? {
        return Err(WorkflowError::InvalidState("Failed to update user".into()));
    }
    db.get_user(user.user_id)?
        .ok_or_else(|| WorkflowError::InvalidState("User missing after update".into()))
}

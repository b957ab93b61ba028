//! Case invitations.
//!
//! A single-email invite that already exists is a `Conflict`; the batch form
//! reports it as skipped and carries on.

use tracing::{debug, info};

use super::{
    ensure_case_owner, ensure_user, InviteResult, InvitedUserView, SkippedEmail, WorkflowError,
    WorkflowResult,
};
use crate::db::Database;
use crate::models::{Case, InviteTarget, InvitedUser, User};

pub const INVITE_EXISTS_REASON: &str = "Invitation already exists for this case";

/// Invitation service.
pub struct InviteService<'a> {
    db: &'a Database,
}

impl<'a> InviteService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Invite one or more emails to one of the caller's cases.
    ///
    /// Does not change the workflow step.
    pub fn invite_member(
        &self,
        case_code: &str,
        target: &InviteTarget,
        user_id: i64,
    ) -> WorkflowResult<InviteResult> {
        self.db.run_in_transaction(|db| {
            ensure_user(db, user_id)?;
            let case = ensure_case_owner(db, case_code, user_id)?;

            match target {
                InviteTarget::Single(email) => {
                    let email = email.trim();
                    let invite = create_invite_if_absent(db, &case, email)?.ok_or_else(|| {
                        WorkflowError::Conflict(INVITE_EXISTS_REASON.into())
                    })?;
                    Ok(InviteResult {
                        created: vec![InvitedUserView::new(&invite, &case.case_id)],
                        skipped: Vec::new(),
                    })
                }
                InviteTarget::Many(emails) => {
                    let mut result = InviteResult {
                        created: Vec::new(),
                        skipped: Vec::new(),
                    };
                    for email in emails {
                        let email = email.trim();
                        match create_invite_if_absent(db, &case, email)? {
                            Some(invite) => result
                                .created
                                .push(InvitedUserView::new(&invite, &case.case_id)),
                            None => result.skipped.push(SkippedEmail {
                                email: email.to_string(),
                                reason: INVITE_EXISTS_REASON.into(),
                            }),
                        }
                    }
                    info!(
                        case_code = %case.case_id,
                        created = result.created.len(),
                        skipped = result.skipped.len(),
                        "invitations processed"
                    );
                    Ok(result)
                }
            }
        })
    }
}

/// Create a pending invitation unless one exists for (case, email).
///
/// Returns `None` when an invitation already exists.
pub(crate) fn create_invite_if_absent(
    db: &Database,
    case: &Case,
    email: &str,
) -> WorkflowResult<Option<InvitedUser>> {
    if db.invite_exists_for_case(case.id, email)? {
        debug!(case_code = %case.case_id, "invitation already exists");
        return Ok(None);
    }
    let invite = db.insert_invited_user(case.id, email)?;
    debug!(case_code = %case.case_id, invited_user_id = invite.invited_user_id, "invitation created");
    Ok(Some(invite))
}

/// Attach `user` to every pending invitation addressed to their email.
///
/// Runs inside the caller's unit of work.
pub(crate) fn resolve_invites_for_user(db: &Database, user: &User) -> WorkflowResult<usize> {
    let mut resolved = 0;
    for invite in db.list_pending_invites_for_email(&user.email)? {
        if db.resolve_invited_user(invite.invited_user_id, user.user_id)? {
            resolved += 1;
        }
    }
    if resolved > 0 {
        info!(user_id = user.user_id, resolved, "pending invitations resolved");
    }
    Ok(resolved)
}

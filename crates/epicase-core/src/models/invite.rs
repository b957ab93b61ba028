//! Case invitation models.

use serde::{Deserialize, Serialize};

/// An invitation of an email address to collaborate on a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvitedUser {
    pub invited_user_id: i64,
    pub case_id: i64,
    /// Set once the invited email registers
    pub user_id: Option<i64>,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl InvitedUser {
    pub fn is_resolved(&self) -> bool {
        self.user_id.is_some()
    }
}

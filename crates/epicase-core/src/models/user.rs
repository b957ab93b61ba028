//! User models.

use serde::{Deserialize, Serialize};

/// Account completion status carried on every user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Registered through external auth but profile not finished
    #[default]
    Incomplete,
    /// Profile finished
    Complete,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Incomplete => "incomplete",
            AccountStatus::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incomplete" => Some(AccountStatus::Incomplete),
            "complete" => Some(AccountStatus::Complete),
            _ => None,
        }
    }
}

/// A registered user. Owner of cases and patients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Database-assigned key
    pub user_id: i64,
    /// External-auth subject identifier (Entra object id)
    pub entra_oid: Option<String>,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email, unique among live users
    pub email: String,
    /// Optional phone number
    pub phone_number: Option<String>,
    /// Profile completion status
    pub account_status: AccountStatus,
    /// Whether the first-login walkthrough has been finished
    pub first_login_completed: bool,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
    /// Soft-delete marker
    pub deleted_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Fields required to create a user row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub entra_oid: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub account_status: AccountStatus,
}

//! Domain models for the case workflow system.

mod case;
mod contact;
mod invite;
mod medication;
mod notification;
mod patient;
mod request;
mod user;

pub use case::*;
pub use contact::*;
pub use invite::*;
pub use medication::*;
pub use notification::*;
pub use patient::*;
pub use request::*;
pub use user::*;

/// Current UTC time in the timestamp format stored by the database layer.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

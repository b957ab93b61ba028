//! Field-level request validation.
//!
//! Runs before any workflow operation. Each validator collects every failing
//! field instead of stopping at the first, so callers get one complete
//! report per request.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::models::{
    is_valid_spray_number, CaseRegistration, DeliveryChannel, EmergencyContactRequest,
    InviteTarget, MedicationRegistration, NotificationPreferenceInput,
    NotificationPreferenceRequest, NotificationType, PatientRegistration, UserRegistration,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// E.164, with the leading `+` optional.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{9,14}$").unwrap());

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_LOT_NUMBER_LENGTH: usize = 50;

/// Failing fields mapped to a message, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; the first message for a field is kept.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

/// Parse a `YYYY-MM-DD` date, reporting failures against `field`.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationErrors> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let mut errors = ValidationErrors::new();
        errors.add(field, format!("{} must be a valid date (YYYY-MM-DD)", field));
        errors
    })
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn require(errors: &mut ValidationErrors, field: &str, value: &str) {
    if is_blank(value) {
        errors.add(field, format!("{} is required", field));
    }
}

fn require_name(errors: &mut ValidationErrors, field: &str, value: &str) {
    if is_blank(value) {
        errors.add(field, format!("{} is required", field));
    } else if value.trim().chars().count() < MIN_NAME_LENGTH {
        errors.add(
            field,
            format!("{} must be at least {} characters", field, MIN_NAME_LENGTH),
        );
    }
}

pub fn validate_case_registration(reg: &CaseRegistration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "case_id", &reg.case_id);
    require_name(&mut errors, "case_name", &reg.case_name);
    if let Some(level) = reg.battery_level {
        if !(0..=100).contains(&level) {
            errors.add("battery_level", "battery_level must be between 0 and 100");
        }
    }
    errors.into_result()
}

pub fn validate_patient_registration(reg: &PatientRegistration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "case_id", &reg.case_id);
    require_name(&mut errors, "first_name", &reg.first_name);
    require_name(&mut errors, "last_name", &reg.last_name);
    require(&mut errors, "location", &reg.location);
    require(&mut errors, "postal_code", &reg.postal_code);
    if let Some(email) = reg.invite_email.as_deref() {
        if !is_blank(email) && !is_valid_email(email) {
            errors.add("invite_email", "invite_email must be a valid email address");
        }
    }
    errors.into_result()
}

pub fn validate_medication_registration(
    reg: &MedicationRegistration,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "case_id", &reg.case_id);
    if !is_valid_spray_number(reg.spray_number) {
        errors.add("spray_number", "spray_number must be 1 or 2");
    }
    for (field, lot) in [
        ("lot_number_spray_1", &reg.lot_number_spray_1),
        ("lot_number_spray_2", &reg.lot_number_spray_2),
    ] {
        if let Some(lot) = lot {
            if lot.chars().count() > MAX_LOT_NUMBER_LENGTH {
                errors.add(
                    field,
                    format!("{} must be at most {} characters", field, MAX_LOT_NUMBER_LENGTH),
                );
            }
        }
    }
    errors.into_result()
}

/// Validate notification inputs and resolve their delivery methods to
/// channels.
///
/// Duplicate channels are dropped, keeping first-seen order.
pub fn normalize_notification_preferences(
    inputs: Vec<NotificationPreferenceInput>,
) -> Result<Vec<NotificationPreferenceRequest>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if inputs.is_empty() {
        errors.add("preferences", "At least one notification preference is required");
        return Err(errors);
    }
    if inputs.len() > NotificationType::ALL.len() {
        errors.add(
            "preferences",
            format!(
                "At most {} notification preferences are allowed",
                NotificationType::ALL.len()
            ),
        );
        return Err(errors);
    }

    let mut requests = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.into_iter().enumerate() {
        let prefix = format!("preferences[{}]", i);
        if is_blank(&input.case_id) {
            errors.add(format!("{}.case_id", prefix), "case_id is required");
        }

        let mut channels: Vec<DeliveryChannel> = Vec::new();
        let mut seen = HashSet::new();
        for raw in input.delivery.as_ref().map(|d| d.raw()).unwrap_or_default() {
            match DeliveryChannel::parse(raw.trim()) {
                Some(channel) => {
                    if seen.insert(channel) {
                        channels.push(channel);
                    }
                }
                None => errors.add(
                    format!("{}.delivery_methods", prefix),
                    format!(
                        "Unknown delivery method '{}'; expected one of email, sms, push, in_app",
                        raw
                    ),
                ),
            }
        }
        if input.enabled && channels.is_empty() {
            errors.add(
                format!("{}.delivery_methods", prefix),
                "At least one delivery method is required when enabled",
            );
        }

        requests.push(NotificationPreferenceRequest {
            case_id: input.case_id.trim().to_string(),
            enabled: input.enabled,
            channels,
            alert_schedule: input.alert_schedule,
        });
    }

    errors.into_result().map(|_| requests)
}

pub fn validate_emergency_contacts(
    case_id: &str,
    contacts: &[EmergencyContactRequest],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(case_id) {
        errors.add("case_id", "case_id is required in body");
    }
    if contacts.is_empty() {
        errors.add("contacts", "At least one emergency contact is required");
    }
    for (i, contact) in contacts.iter().enumerate() {
        let prefix = format!("contacts[{}]", i);
        require(&mut errors, &format!("{}.first_name", prefix), &contact.first_name);
        require(&mut errors, &format!("{}.last_name", prefix), &contact.last_name);
        if !is_valid_email(&contact.email) {
            errors.add(
                format!("{}.email", prefix),
                "email must be a valid email address",
            );
        }
        if !is_valid_phone(&contact.phone_number) {
            errors.add(
                format!("{}.phone_number", prefix),
                "phone_number must be in E.164 format",
            );
        }
    }
    errors.into_result()
}

pub fn validate_invite_target(case_id: &str, target: &InviteTarget) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(case_id) {
        errors.add("case_id", "case_id is required in body");
    }
    match target {
        InviteTarget::Single(email) => {
            if !is_valid_email(email) {
                errors.add("email", "email must be a valid email address");
            }
        }
        InviteTarget::Many(emails) => {
            if emails.is_empty() {
                errors.add("emails", "Either email or emails is required");
            }
            for (i, email) in emails.iter().enumerate() {
                if !is_valid_email(email) {
                    errors.add(
                        format!("emails[{}]", i),
                        "email must be a valid email address",
                    );
                }
            }
        }
    }
    errors.into_result()
}

pub fn validate_user_registration(reg: &UserRegistration) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "entra_oid", &reg.entra_oid);
    if !is_valid_email(&reg.email) {
        errors.add("email", "email must be a valid email address");
    }
    if let Some(phone) = reg.phone_number.as_deref() {
        if !is_blank(phone) && !is_valid_phone(phone) {
            errors.add("phone_number", "phone_number must be in E.164 format");
        }
    }
    errors.into_result()
}

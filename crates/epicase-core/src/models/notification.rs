//! Notification preference models.

use serde::{Deserialize, Serialize};

/// The fixed notification catalog. Configuring a case writes one
/// preference row per entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    MedicationReminder,
    AppointmentReminder,
    BatteryLowAlert,
    ConnectionStatusAlert,
    CaseStatusUpdate,
    EmergencyAlert,
    SystemMaintenance,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::MedicationReminder,
        NotificationType::AppointmentReminder,
        NotificationType::BatteryLowAlert,
        NotificationType::ConnectionStatusAlert,
        NotificationType::CaseStatusUpdate,
        NotificationType::EmergencyAlert,
        NotificationType::SystemMaintenance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::MedicationReminder => "medication_reminder",
            NotificationType::AppointmentReminder => "appointment_reminder",
            NotificationType::BatteryLowAlert => "battery_low_alert",
            NotificationType::ConnectionStatusAlert => "connection_status_alert",
            NotificationType::CaseStatusUpdate => "case_status_update",
            NotificationType::EmergencyAlert => "emergency_alert",
            NotificationType::SystemMaintenance => "system_maintenance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// A delivery channel for notifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    Email,
    Sms,
    Push,
    InApp,
}

impl DeliveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryChannel::Email => "email",
            DeliveryChannel::Sms => "sms",
            DeliveryChannel::Push => "push",
            DeliveryChannel::InApp => "in_app",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(DeliveryChannel::Email),
            "sms" => Some(DeliveryChannel::Sms),
            "push" => Some(DeliveryChannel::Push),
            "in_app" => Some(DeliveryChannel::InApp),
            _ => None,
        }
    }

    /// Stored form of a channel set: channel names joined with `,`.
    pub fn join(channels: &[DeliveryChannel]) -> String {
        channels
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Delivery methods as supplied by callers: the legacy single-string form or
/// the list form. Resolved to `Vec<DeliveryChannel>` at the validation
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DeliveryMethods {
    Single(String),
    Multi(Vec<String>),
}

impl DeliveryMethods {
    /// Raw channel names in caller order.
    pub fn raw(&self) -> Vec<&str> {
        match self {
            DeliveryMethods::Single(s) => vec![s.as_str()],
            DeliveryMethods::Multi(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// A stored notification preference, unique per (user, case, type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPreference {
    pub notification_pref_id: i64,
    pub case_id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    /// Comma-joined channels; `None` when disabled
    pub delivery_method: Option<String>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

impl NotificationPreference {
    /// Stored channels, skipping any names outside the channel catalog.
    pub fn channels(&self) -> Vec<DeliveryChannel> {
        self.delivery_method
            .as_deref()
            .map(|joined| {
                joined
                    .split(',')
                    .filter_map(|c| DeliveryChannel::parse(c.trim()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotificationPreference {
    pub case_id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub delivery_method: Option<String>,
    pub enabled: bool,
}

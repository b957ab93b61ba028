//! SQLite schema definition.

/// Complete database schema for the case workflow store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    entra_oid TEXT,                              -- external-auth subject
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone_number TEXT,
    account_status TEXT NOT NULL DEFAULT 'incomplete'
        CHECK (account_status IN ('incomplete', 'complete')),
    first_login_completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email) WHERE deleted_at IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_entra_oid ON users(entra_oid)
    WHERE deleted_at IS NULL AND entra_oid IS NOT NULL;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    patient_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,                 -- YYYY-MM-DD
    allergies_medical_history TEXT,
    is_self INTEGER NOT NULL DEFAULT 0,
    invite_email TEXT,
    location TEXT NOT NULL,
    postal_code TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

-- Identity lookup used for patient reuse
CREATE INDEX IF NOT EXISTS idx_patients_identity
    ON patients(user_id, first_name, last_name, date_of_birth);

-- ============================================================================
-- Cases (workflow state lives in current_step)
-- ============================================================================

CREATE TABLE IF NOT EXISTS cases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id TEXT NOT NULL,                       -- caller-supplied case code
    patient_id INTEGER REFERENCES patients(patient_id),
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    case_name TEXT NOT NULL,
    current_step TEXT DEFAULT 'CREATED',
    battery_level INTEGER,
    last_seen TEXT,
    connection_status TEXT DEFAULT 'disconnected',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_cases_code ON cases(case_id) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_cases_user ON cases(user_id);

-- ============================================================================
-- Medications (one row per spray slot)
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    spray_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id INTEGER NOT NULL REFERENCES cases(id),
    spray_number INTEGER NOT NULL CHECK (spray_number IN (1, 2)),
    status TEXT NOT NULL DEFAULT 'pending',
    expiration_date_spray_1 TEXT NOT NULL,
    lot_number_spray_1 TEXT,
    expiration_date_spray_2 TEXT NOT NULL,
    lot_number_spray_2 TEXT,
    dosage_details TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_medications_slot
    ON medications(case_id, spray_number) WHERE deleted_at IS NULL;

-- ============================================================================
-- Notification Preferences (7 rows per user/case once configured)
-- ============================================================================

CREATE TABLE IF NOT EXISTS notification_preferences (
    notification_pref_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id INTEGER NOT NULL REFERENCES cases(id),
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    type TEXT NOT NULL,
    delivery_method TEXT,                        -- comma-joined channels, NULL when disabled
    enabled INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_notification_prefs_key
    ON notification_preferences(user_id, case_id, type) WHERE deleted_at IS NULL;

-- ============================================================================
-- Emergency Contacts
-- ============================================================================

CREATE TABLE IF NOT EXISTS emergency_contacts (
    contact_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id INTEGER NOT NULL REFERENCES cases(id),
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    invite_sent INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_emergency_contacts_email
    ON emergency_contacts(case_id, email) WHERE deleted_at IS NULL;

-- ============================================================================
-- Invited Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS invited_users (
    invited_user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id INTEGER NOT NULL REFERENCES cases(id),
    user_id INTEGER REFERENCES users(user_id),   -- NULL until the invitee registers
    email TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_invited_users_email
    ON invited_users(case_id, email) WHERE deleted_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_invited_users_pending ON invited_users(email) WHERE user_id IS NULL;
"#;

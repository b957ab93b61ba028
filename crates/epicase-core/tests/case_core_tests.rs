//! End-to-end tests through the `CaseCore` facade.

use epicase_core::db::Database;
use epicase_core::{
    open_case_store, open_case_store_in_memory, EpiCaseError, FfiCaseRegistration,
    FfiEmergencyContactInput, FfiMedicationRegistration, FfiNotificationPreferenceInput,
    FfiPatientRegistration, FfiUserRegistration,
};

fn user_reg(oid: &str, email: &str) -> FfiUserRegistration {
    FfiUserRegistration {
        entra_oid: oid.to_string(),
        email: email.to_string(),
        first_name: Some("Pat".to_string()),
        last_name: Some("Parent".to_string()),
        phone_number: None,
        account_status: None,
    }
}

fn case_reg(code: &str) -> FfiCaseRegistration {
    FfiCaseRegistration {
        case_id: code.to_string(),
        case_name: "Backpack kit".to_string(),
        battery_level: Some(80),
        connection_status: None,
    }
}

fn patient_reg(code: &str) -> FfiPatientRegistration {
    FfiPatientRegistration {
        case_id: code.to_string(),
        first_name: "Max".to_string(),
        last_name: "Parent".to_string(),
        date_of_birth: "2016-04-02".to_string(),
        location: "Springfield".to_string(),
        postal_code: "12345".to_string(),
        allergies_medical_history: None,
        is_self: Some(false),
        invite_email: None,
    }
}

fn medication_reg(code: &str, spray_number: u8) -> FfiMedicationRegistration {
    FfiMedicationRegistration {
        case_id: code.to_string(),
        spray_number,
        expiration_date_spray_1: "2027-01-01".to_string(),
        expiration_date_spray_2: "2027-06-01".to_string(),
        lot_number_spray_1: Some("LOT-1".to_string()),
        lot_number_spray_2: None,
        dosage_details: Some("0.3 mg".to_string()),
    }
}

#[test]
fn test_full_case_setup() {
    let core = open_case_store_in_memory().unwrap();
    let user = core
        .register_user(user_reg("oid-parent", "parent@example.com"))
        .unwrap();
    let uid = user.user_id;

    let case = core.register_case(case_reg("CASE-X"), uid).unwrap();
    assert_eq!(case.workflow_state.as_deref(), Some("CREATED"));
    assert_eq!(case.connection_status.as_deref(), Some("disconnected"));

    let patient = core.link_patient(patient_reg("CASE-X"), uid).unwrap();
    assert_eq!(patient.workflow_state, "PATIENT_LINKED");
    assert_eq!(patient.date_of_birth, "2016-04-02");

    for spray in [1, 2] {
        let med = core.upsert_medication(medication_reg("CASE-X", spray), uid).unwrap();
        assert_eq!(med.status, "pending");
        assert_eq!(med.workflow_state.as_deref(), Some("MEDICAL_LINKED"));
    }

    let summary = core
        .configure_notification_preferences(
            vec![FfiNotificationPreferenceInput {
                case_id: "CASE-X".to_string(),
                enabled: true,
                delivery_methods: vec!["push".to_string(), "sms".to_string()],
                alert_schedule: Some("daily".to_string()),
            }],
            uid,
        )
        .unwrap();
    assert_eq!(summary.created, 7);
    assert_eq!(summary.workflow_state, "NOTIFICATIONS_CONFIGURED");

    let contacts = core
        .upsert_emergency_contacts(
            "CASE-X".to_string(),
            vec![FfiEmergencyContactInput {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone_number: "+15551234567".to_string(),
                send_invite: true,
            }],
            uid,
        )
        .unwrap();
    assert_eq!(contacts.saved.len(), 1);
    assert_eq!(contacts.workflow_state, "EMERGENCY_CONTACTS_ADDED");

    let case = core.get_case("CASE-X".to_string(), uid).unwrap();
    assert_eq!(case.workflow_state.as_deref(), Some("EMERGENCY_CONTACTS_ADDED"));
    assert_eq!(case.patient_first_name.as_deref(), Some("Max"));
    assert_eq!(core.list_case_medications("CASE-X".to_string(), uid).unwrap().len(), 2);

    // The contact invite already exists
    let invite = core
        .invite_member(
            "CASE-X".to_string(),
            Some("jane@example.com".to_string()),
            None,
            uid,
        )
        .unwrap_err();
    assert!(matches!(invite, EpiCaseError::Conflict(_)));

    // Signing up claims the pending invitation
    let jane = core
        .register_user(user_reg("oid-jane", "jane@example.com"))
        .unwrap();
    let unauthorized = core.get_case("CASE-X".to_string(), jane.user_id).unwrap_err();
    assert!(matches!(unauthorized, EpiCaseError::Unauthorized(_)));
}

#[test]
fn test_invite_resolved_on_registration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cases.db");

    {
        let core = open_case_store(path.to_string_lossy().into_owned()).unwrap();
        let uid = core
            .register_user(user_reg("oid-parent", "parent@example.com"))
            .unwrap()
            .user_id;
        core.register_case(case_reg("CASE-X"), uid).unwrap();
        let result = core
            .invite_member(
                "CASE-X".to_string(),
                None,
                Some(vec!["sitter@example.com".to_string()]),
                uid,
            )
            .unwrap();
        assert_eq!(result.created.len(), 1);
        assert_eq!(result.created[0].user_id, None);

        core.register_user(user_reg("oid-sitter", "sitter@example.com"))
            .unwrap();
    }

    // Reopen the file and check the stored invitation directly
    let db = Database::open(&path).unwrap();
    let case = db.get_case_by_code("CASE-X").unwrap().unwrap();
    let sitter = db.get_user_by_email("sitter@example.com").unwrap().unwrap();
    let invite = db
        .find_invited_user(case.id, "sitter@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(invite.user_id, Some(sitter.user_id));
}

#[test]
fn test_user_account_lifecycle() {
    let core = open_case_store_in_memory().unwrap();
    let user = core
        .register_user(user_reg("oid-1", "someone@example.com"))
        .unwrap();
    assert_eq!(user.account_status, "incomplete");

    let dup = core
        .register_user(user_reg("oid-2", "someone@example.com"))
        .unwrap_err();
    assert!(matches!(dup, EpiCaseError::Conflict(_)));
    assert_eq!(dup.http_status(), 409);

    let marked = core
        .mark_first_login_completed("oid-1".to_string(), user.user_id)
        .unwrap();
    assert!(marked.first_login_completed);

    let profile = core.get_profile(user.user_id).unwrap();
    assert_eq!(profile.email, "someone@example.com");
    assert!(matches!(core.get_profile(9999), Err(EpiCaseError::Unauthorized(_))));
}

#[test]
fn test_user_notification_listing() {
    let core = open_case_store_in_memory().unwrap();
    let uid = core
        .register_user(user_reg("oid-1", "someone@example.com"))
        .unwrap()
        .user_id;
    for code in ["CASE-1", "CASE-2"] {
        core.register_case(case_reg(code), uid).unwrap();
    }
    core.configure_notification_preferences_json(
        r#"[{"case_id":"CASE-1","enabled":false},{"case_id":"CASE-2","enabled":true,"delivery_method":"email"}]"#
            .to_string(),
        uid,
    )
    .unwrap();

    let all = core.list_user_notification_preferences(uid).unwrap();
    assert_eq!(all.len(), 14);
    assert!(all
        .iter()
        .filter(|p| p.case_id == "CASE-1")
        .all(|p| !p.enabled && p.delivery_methods.is_empty()));
    assert!(all
        .iter()
        .filter(|p| p.case_id == "CASE-2")
        .all(|p| p.delivery_methods == vec!["email".to_string()]));
}

#[test]
fn test_malformed_notification_json() {
    let core = open_case_store_in_memory().unwrap();
    let err = core
        .configure_notification_preferences_json("{not json".to_string(), 1)
        .unwrap_err();
    assert!(matches!(err, EpiCaseError::SerializationError(_)));
}

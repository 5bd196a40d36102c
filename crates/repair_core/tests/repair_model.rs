use repair_core::{Repair, RepairRegistrationRequest, RepairUpdateRequest, RepairValidationError};

#[test]
fn new_repair_has_no_id() {
    let repair = Repair::new("Kamau", "Nikia 3300", "Nokia", "Charging port", 800_565_222);

    assert_eq!(repair.id, None);
    assert!(repair.validate().is_ok());
}

#[test]
fn registration_request_converts_without_id() {
    let request = RepairRegistrationRequest {
        name: "Zumba".to_string(),
        title: "HP Envy".to_string(),
        brand: "HP".to_string(),
        issue: "not charging".to_string(),
        phone_number: 800_565_222,
    };

    let repair = Repair::from(request);
    assert_eq!(
        repair,
        Repair::new("Zumba", "HP Envy", "HP", "not charging", 800_565_222)
    );
}

#[test]
fn validate_rejects_blank_text_fields() {
    let mut repair = Repair::new("Kamau", "Nikia 3300", "Nokia", "Charging port", 800_565_222);
    repair.issue = " \t".to_string();

    assert_eq!(
        repair.validate().unwrap_err(),
        RepairValidationError::BlankField("issue")
    );
}

#[test]
fn validate_rejects_non_positive_phone_number() {
    let repair = Repair::new("Kamau", "Nikia 3300", "Nokia", "Charging port", 0);

    assert_eq!(
        repair.validate().unwrap_err(),
        RepairValidationError::InvalidPhoneNumber(0)
    );
}

#[test]
fn repair_serializes_with_camel_case_wire_fields() {
    let repair = Repair::with_id(1, "Kamau", "Nikia 3300", "Nokia", "Charging port", 800_565_222);

    let json = serde_json::to_value(&repair).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["phoneNumber"], 800_565_222);
    assert_eq!(json["title"], "Nikia 3300");

    let decoded: Repair = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, repair);
}

#[test]
fn update_request_missing_fields_deserialize_as_absent() {
    let request: RepairUpdateRequest =
        serde_json::from_value(serde_json::json!({ "phoneNumber": 900000111 })).unwrap();

    assert_eq!(
        request,
        RepairUpdateRequest {
            phone_number: Some(900_000_111),
            ..RepairUpdateRequest::default()
        }
    );
    assert!(!request.is_empty());
    assert!(RepairUpdateRequest::default().is_empty());
}

#[test]
fn update_request_null_fields_mean_leave_unchanged() {
    let request: RepairUpdateRequest =
        serde_json::from_value(serde_json::json!({ "name": null, "issue": "Power IC" })).unwrap();

    assert_eq!(request.name, None);
    assert_eq!(request.issue.as_deref(), Some("Power IC"));
}

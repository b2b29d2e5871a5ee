use optics_core::db::open_db_in_memory;
use optics_core::{
    Customer, ExamInput, RefractionMeasurements, ServiceError, SqliteCustomerService,
    ValidationError,
};

#[test]
fn add_customer_validates_card() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteCustomerService::try_from_connection(&conn).unwrap();

    let err = service
        .add_customer(Customer::new("12345", "Dana", "Levi"))
        .unwrap_err();
    assert!(matches!(
        err.validation(),
        Some(ValidationError::InvalidSsn(ssn)) if ssn == "12345"
    ));

    let mut card = Customer::new("123456789", "Dana", "Levi");
    card.tel_mobile = Some("050-123".to_string());
    assert!(matches!(
        service.add_customer(card).unwrap_err().validation(),
        Some(ValidationError::InvalidMobilePhone(_))
    ));

    assert!(service.list_customers().unwrap().is_empty());

    let mut blank_phone = Customer::new("123456789", "Dana", "Levi");
    blank_phone.tel_mobile = Some(String::new());
    service.add_customer(blank_phone).unwrap();
}

#[test]
fn duplicate_ssn_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteCustomerService::try_from_connection(&conn).unwrap();

    service
        .add_customer(Customer::new("123456789", "Dana", "Levi"))
        .unwrap();
    let err = service
        .add_customer(Customer::new("123456789", "Avi", "Cohen"))
        .unwrap_err();
    assert_eq!(
        err.validation(),
        Some(&ValidationError::DuplicateSsn("123456789".to_string()))
    );
}

#[test]
fn update_customer_keeps_own_ssn_but_not_anothers() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteCustomerService::try_from_connection(&conn).unwrap();

    let mut dana = service
        .add_customer(Customer::new("123456789", "Dana", "Levi"))
        .unwrap();
    service
        .add_customer(Customer::new("987654321", "Avi", "Cohen"))
        .unwrap();

    dana.town = Some("Nazareth".to_string());
    assert!(service.update_customer(&dana).unwrap());

    dana.ssn = "987654321".to_string();
    assert!(matches!(
        service.update_customer(&dana).unwrap_err().validation(),
        Some(ValidationError::DuplicateSsn(_))
    ));

    let unsaved = Customer::new("111111111", "New", "Card");
    assert!(matches!(
        service.update_customer(&unsaved).unwrap_err(),
        ServiceError::InvalidArgument(_)
    ));
}

#[test]
fn lookups_reject_malformed_arguments() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteCustomerService::try_from_connection(&conn).unwrap();

    for id in [0, -10] {
        assert!(matches!(
            service.get_customer(id).unwrap_err(),
            ServiceError::InvalidArgument(_)
        ));
    }
    for ssn in ["", "   ", "12345678", "12345678x"] {
        assert!(matches!(
            service.get_customer_by_ssn(ssn).unwrap_err(),
            ServiceError::InvalidArgument(_)
        ));
    }
    assert_eq!(service.get_customer(5).unwrap(), None);
    assert_eq!(service.get_customer_by_ssn(" 123456789 ").unwrap(), None);
}

#[test]
fn search_entry_points_cover_name_and_ssn() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteCustomerService::try_from_connection(&conn).unwrap();

    service
        .add_customer(Customer::new("123456789", "David", "Ben Abo"))
        .unwrap();
    service
        .add_customer(Customer::new("555555555", "Naseem", "Srour"))
        .unwrap();

    let by_name = service.search_customers_by_name("dav").unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].full_name(), "David Ben Abo");

    let by_ssn = service.search_customers("5555").unwrap();
    assert_eq!(by_ssn.len(), 1);
    assert_eq!(by_ssn[0].last_name, "Srour");
    assert!(service.search_customers_by_name("5555").unwrap().is_empty());
}

#[test]
fn delete_customer_removes_exam_history() {
    let conn = open_db_in_memory().unwrap();
    let service = SqliteCustomerService::try_from_connection(&conn).unwrap();

    let customer_id = service
        .add_customer(Customer::new("123456789", "Dana", "Levi"))
        .unwrap()
        .id
        .unwrap();
    let exam = service
        .add_refraction_test(
            customer_id,
            ExamInput::new("10/10/2025", RefractionMeasurements::default()),
        )
        .unwrap();

    assert!(service.delete_customer(customer_id).unwrap());
    assert_eq!(service.get_refraction_test(exam.id.unwrap()).unwrap(), None);
    assert!(matches!(
        service.get_refraction_history(customer_id).unwrap_err().validation(),
        Some(ValidationError::CustomerNotFound(_))
    ));
}

#[test]
fn service_requires_migrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    assert!(SqliteCustomerService::try_from_connection(&conn).is_err());
}

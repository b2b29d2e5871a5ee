use chrono::NaiveDate;
use optics_core::db::open_db_in_memory;
use optics_core::repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
use optics_core::repo::exam_repo::ExamRepository;
use optics_core::repo::refraction_repo::SqliteRefractionRepository;
use optics_core::{Customer, ExamRecord, RefractionMeasurements, RepoError};

fn customer(ssn: &str, first_name: &str, last_name: &str) -> Customer {
    Customer::new(ssn, first_name, last_name)
}

fn full_names(customers: &[Customer]) -> Vec<String> {
    customers.iter().map(Customer::full_name).collect()
}

#[test]
fn add_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut card = customer("123456789", "Dana", "Levi");
    card.tel_mobile = Some("0501234567".to_string());
    card.town = Some("Haifa".to_string());
    card.glasses_num = Some(2);
    card.mailing = true;

    let created = repo.add_customer(&card).unwrap();
    let id = created.id.unwrap();
    assert!(id > 0);

    let loaded = repo.get_customer(id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(repo.get_customer_by_ssn("123456789").unwrap(), Some(created));
    assert_eq!(repo.get_customer_by_ssn("999999999").unwrap(), None);
}

#[test]
fn list_is_ordered_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    repo.add_customer(&customer("100000001", "Zohar", "Amir")).unwrap();
    repo.add_customer(&customer("100000002", "Avi", "Cohen")).unwrap();

    let all = repo.list_customers().unwrap();
    assert_eq!(full_names(&all), vec!["Zohar Amir", "Avi Cohen"]);
}

#[test]
fn name_search_matches_partial_tokens() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    repo.add_customer(&customer("100000001", "David", "Ben Abo")).unwrap();
    repo.add_customer(&customer("100000002", "Davi", "Stone")).unwrap();
    repo.add_customer(&customer("100000003", "Naseem", "Srour")).unwrap();

    let found = repo.search_by_name("Dav").unwrap();
    assert_eq!(full_names(&found), vec!["David Ben Abo", "Davi Stone"]);
}

#[test]
fn multi_token_search_matches_across_name_fields_in_any_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    repo.add_customer(&customer("100000001", "David Ben", "Zeid")).unwrap();
    repo.add_customer(&customer("100000002", "David", "Ben Zeid")).unwrap();
    repo.add_customer(&customer("100000003", "Ben", "Stone")).unwrap();

    for query in ["Ben Zeid", "Zeid Ben", "  zeid   ben "] {
        let found = repo.search_by_name(query).unwrap();
        assert_eq!(
            full_names(&found),
            vec!["David Ben Zeid", "David Ben Zeid"],
            "query `{query}`"
        );
    }
}

#[test]
fn blank_query_matches_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();
    repo.add_customer(&customer("100000001", "Dana", "Levi")).unwrap();

    assert!(repo.search_by_name("").unwrap().is_empty());
    assert!(repo.search_by_name_or_ssn("   ").unwrap().is_empty());
}

#[test]
fn wildcards_in_query_match_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();
    repo.add_customer(&customer("100000001", "Dana", "Levi")).unwrap();

    assert!(repo.search_by_name("%").unwrap().is_empty());
    assert!(repo.search_by_name("D_na").unwrap().is_empty());
}

#[test]
fn name_or_ssn_search_includes_ssn() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();
    repo.add_customer(&customer("111345600", "Dana", "Levi")).unwrap();
    repo.add_customer(&customer("222345699", "Avi", "Cohen")).unwrap();

    let by_ssn = repo.search_by_name_or_ssn("3456").unwrap();
    assert_eq!(full_names(&by_ssn), vec!["Dana Levi", "Avi Cohen"]);

    assert!(repo.search_by_name("3456").unwrap().is_empty());
    let mixed = repo.search_by_name_or_ssn("Avi 2223").unwrap();
    assert_eq!(full_names(&mixed), vec!["Avi Cohen"]);
}

#[test]
fn update_overwrites_all_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let mut card = repo
        .add_customer(&customer("123456789", "Dana", "Levi"))
        .unwrap();
    card.last_name = "Levi-Katz".to_string();
    card.notes = Some("prefers morning visits".to_string());
    card.mailing = true;

    assert!(repo.update_customer(&card).unwrap());
    assert_eq!(repo.get_customer(card.id.unwrap()).unwrap(), Some(card.clone()));

    card.id = Some(9_999);
    assert!(!repo.update_customer(&card).unwrap());
}

#[test]
fn update_without_id_is_invalid_argument() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    let err = repo
        .update_customer(&customer("123456789", "Dana", "Levi"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidArgument(_)));
}

#[test]
fn duplicate_ssn_is_rejected_by_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCustomerRepository::try_new(&conn).unwrap();

    repo.add_customer(&customer("123456789", "Dana", "Levi")).unwrap();
    let err = repo
        .add_customer(&customer("123456789", "Other", "Person"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn delete_customer_cascades_to_exams() {
    let conn = open_db_in_memory().unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    let refraction = SqliteRefractionRepository::try_new(&conn).unwrap();

    let card = customers
        .add_customer(&customer("123456789", "Dana", "Levi"))
        .unwrap();
    let customer_id = card.id.unwrap();
    let exam_date = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let exam_id = refraction
        .add_test(&ExamRecord::new(
            customer_id,
            exam_date,
            RefractionMeasurements::default(),
        ))
        .unwrap();

    assert!(customers.delete_customer(customer_id).unwrap());
    assert_eq!(customers.get_customer(customer_id).unwrap(), None);
    assert_eq!(refraction.get_test(exam_id).unwrap(), None);
    assert!(!customers.delete_customer(customer_id).unwrap());
}

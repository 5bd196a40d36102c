use repair_core::db::migrations::latest_version;
use repair_core::db::open_db_in_memory;
use repair_core::{
    InMemoryRepairRepository, Repair, RepairRepository, RepoError, SqliteRepairRepository,
};
use rusqlite::Connection;

fn phone_repair(phone_number: i64) -> Repair {
    Repair::new("Kamau", "Nikia 3300", "Nokia", "Charging port", phone_number)
}

/// Contract checks shared by every store implementation.
fn exercise_store_contract(repo: &dyn RepairRepository) {
    let first = repo.insert_repair(&phone_repair(700_000_001)).unwrap();
    let second = repo.insert_repair(&phone_repair(700_000_002)).unwrap();
    assert_ne!(first, second);

    let ids: Vec<_> = repo
        .list_repairs()
        .unwrap()
        .into_iter()
        .map(|repair| repair.id)
        .collect();
    assert_eq!(ids, vec![Some(first), Some(second)]);

    assert!(repo.exists_repair_with_id(first).unwrap());
    assert!(!repo.exists_repair_with_id(second + 100).unwrap());
    assert!(repo.exists_repair_with_phone_number(700_000_002).unwrap());
    assert!(!repo.exists_repair_with_phone_number(700_000_003).unwrap());

    let mut loaded = repo.get_repair(first).unwrap().unwrap();
    loaded.issue = "Screen cracked".to_string();
    repo.update_repair(&loaded).unwrap();
    assert_eq!(repo.get_repair(first).unwrap().unwrap(), loaded);

    repo.delete_repair(first).unwrap();
    assert!(repo.get_repair(first).unwrap().is_none());
    assert!(matches!(
        repo.delete_repair(first),
        Err(RepoError::NotFound(id)) if id == first
    ));
}

#[test]
fn sqlite_store_satisfies_contract() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepairRepository::try_new(&conn).unwrap();
    exercise_store_contract(&repo);
}

#[test]
fn memory_store_satisfies_contract() {
    let repo = InMemoryRepairRepository::new();
    exercise_store_contract(&repo);
}

#[test]
fn stores_reject_insert_with_preassigned_id() {
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteRepairRepository::try_new(&conn).unwrap();
    let memory = InMemoryRepairRepository::new();
    let stores: [&dyn RepairRepository; 2] = [&sqlite, &memory];

    for repo in stores {
        let repair = Repair::with_id(7, "Kamau", "Nikia 3300", "Nokia", "Charging port", 1);
        assert!(matches!(
            repo.insert_repair(&repair),
            Err(RepoError::AlreadyPersisted(7))
        ));
        assert!(repo.list_repairs().unwrap().is_empty());
    }
}

#[test]
fn stores_guard_phone_number_uniqueness() {
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteRepairRepository::try_new(&conn).unwrap();
    let memory = InMemoryRepairRepository::new();
    let stores: [&dyn RepairRepository; 2] = [&sqlite, &memory];

    for repo in stores {
        repo.insert_repair(&phone_repair(800_565_222)).unwrap();
        let other = repo.insert_repair(&phone_repair(900_000_111)).unwrap();

        assert!(matches!(
            repo.insert_repair(&phone_repair(800_565_222)),
            Err(RepoError::DuplicatePhoneNumber(800_565_222))
        ));

        let mut clash = repo.get_repair(other).unwrap().unwrap();
        clash.phone_number = 800_565_222;
        assert!(matches!(
            repo.update_repair(&clash),
            Err(RepoError::DuplicatePhoneNumber(800_565_222))
        ));
    }
}

#[test]
fn stores_validate_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteRepairRepository::try_new(&conn).unwrap();
    let memory = InMemoryRepairRepository::new();
    let stores: [&dyn RepairRepository; 2] = [&sqlite, &memory];

    for repo in stores {
        let mut blank = phone_repair(700_000_000);
        blank.brand = String::new();
        assert!(matches!(
            repo.insert_repair(&blank),
            Err(RepoError::Validation(_))
        ));
        assert!(repo.list_repairs().unwrap().is_empty());
    }
}

#[test]
fn update_requires_id_and_existing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepairRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.update_repair(&phone_repair(700_000_000)),
        Err(RepoError::MissingId)
    ));

    let missing = Repair::with_id(99, "Kamau", "Nikia 3300", "Nokia", "Charging port", 1);
    assert!(matches!(
        repo.update_repair(&missing),
        Err(RepoError::NotFound(99))
    ));
}

#[test]
fn sqlite_store_never_reuses_deleted_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepairRepository::try_new(&conn).unwrap();

    let first = repo.insert_repair(&phone_repair(700_000_001)).unwrap();
    repo.delete_repair(first).unwrap();
    let second = repo.insert_repair(&phone_repair(700_000_002)).unwrap();

    assert!(second > first);
}

#[test]
fn sqlite_store_rejects_invalid_persisted_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO repairs (name, title, brand, issue, phone_number)
         VALUES ('', 'Nikia 3300', 'Nokia', 'Charging port', 800565222);",
        [],
    )
    .unwrap();

    let repo = SqliteRepairRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.list_repairs(),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteRepairRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_repairs_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteRepairRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("repairs"))
    ));
}

#[test]
fn repository_rejects_connection_missing_phone_number_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE repairs (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            brand TEXT NOT NULL,
            issue TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteRepairRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "repairs",
            column: "phone_number"
        })
    ));
}

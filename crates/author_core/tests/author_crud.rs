use author_core::db::migrations::latest_version;
use author_core::db::open_db_in_memory;
use author_core::{
    Author, AuthorField, AuthorRepository, AuthorService, RegisterAuthorRequest, RepoError,
    SqliteAuthorRepository, ValidationKind,
};
use rusqlite::Connection;
use std::error::Error;
use uuid::Uuid;

const HASH_97: &str = "$argon2i$v=19$m=262144,t=4,p=1$c2FsdHNhbHRzYWx0c2FsdA$AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA";

fn author(id: &str, email: &str, username: Option<&str>) -> Author {
    Author::new(
        id,
        Some("12341234123412341234123412341234"),
        Some("avatar.png"),
        email,
        HASH_97,
        username,
    )
    .unwrap()
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let george = author(
        "27701c38-31be-4261-9ad2-c2a63d3fed2b",
        "author1@cnm.edu",
        Some("george"),
    );
    repo.create_author(&george).unwrap();

    let loaded = repo
        .get_author("27701c38-31be-4261-9ad2-c2a63d3fed2b")
        .unwrap()
        .unwrap();
    assert_eq!(loaded, george);
    assert_eq!(loaded.password_hash(), HASH_97);
}

#[test]
fn id_is_stored_as_sixteen_byte_blob() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let george = author(
        "27701c38-31be-4261-9ad2-c2a63d3fed2b",
        "author1@cnm.edu",
        None,
    );
    repo.create_author(&george).unwrap();

    let stored: Vec<u8> = conn
        .query_row("SELECT authorId FROM author;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, george.id().as_bytes().to_vec());
}

#[test]
fn get_missing_author_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    assert!(repo.get_author(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn get_with_malformed_id_fails_before_query() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let err = repo.get_author("27701c38-nope").unwrap_err();
    match err {
        RepoError::Validation(inner) => {
            assert_eq!(inner.field, AuthorField::Id);
            assert_eq!(inner.kind, ValidationKind::Format);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn update_overwrites_fields_and_reports_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let mut george = author(
        "27701c38-31be-4261-9ad2-c2a63d3fed2b",
        "author1@cnm.edu",
        Some("george"),
    );
    repo.create_author(&george).unwrap();

    george.set_activation_token(None).unwrap();
    george.set_avatar_url(None).unwrap();
    george.set_email("george@cnm.edu").unwrap();
    george.set_username(Some("georgie")).unwrap();
    assert_eq!(repo.update_author(&george).unwrap(), 1);

    let loaded = repo.get_author(george.id()).unwrap().unwrap();
    assert_eq!(loaded.activation_token(), None);
    assert_eq!(loaded.avatar_url(), None);
    assert_eq!(loaded.email(), "george@cnm.edu");
    assert_eq!(loaded.username(), Some("georgie"));
}

#[test]
fn update_and_delete_of_missing_row_return_zero() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let ghost = author(&Uuid::new_v4().to_string(), "ghost@cnm.edu", None);
    assert_eq!(repo.update_author(&ghost).unwrap(), 0);
    assert_eq!(repo.delete_author(ghost.id()).unwrap(), 0);
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let george = author(&Uuid::new_v4().to_string(), "author1@cnm.edu", None);
    repo.create_author(&george).unwrap();

    assert_eq!(repo.delete_author(george.id()).unwrap(), 1);
    assert!(repo.get_author(george.id()).unwrap().is_none());
}

#[test]
fn duplicate_email_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    repo.create_author(&author(
        &Uuid::new_v4().to_string(),
        "author1@cnm.edu",
        Some("george"),
    ))
    .unwrap();

    let err = repo
        .create_author(&author(
            &Uuid::new_v4().to_string(),
            "author1@cnm.edu",
            Some("martha"),
        ))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(err.is_constraint_violation());
}

#[test]
fn duplicate_id_is_a_constraint_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let id = Uuid::new_v4().to_string();
    repo.create_author(&author(&id, "first@cnm.edu", None))
        .unwrap();
    let err = repo
        .create_author(&author(&id, "second@cnm.edu", None))
        .unwrap_err();
    assert!(err.is_constraint_violation());
}

#[test]
fn find_by_username_matches_case_insensitively_in_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let lower = author(
        "00000000-0000-4000-8000-000000000002",
        "lower@cnm.edu",
        Some("george"),
    );
    let upper = author(
        "00000000-0000-4000-8000-000000000001",
        "upper@cnm.edu",
        Some("George"),
    );
    let other = author(
        "00000000-0000-4000-8000-000000000003",
        "other@cnm.edu",
        Some("martha"),
    );
    repo.create_author(&lower).unwrap();
    repo.create_author(&upper).unwrap();
    repo.create_author(&other).unwrap();

    let found = repo.find_authors_by_username("  GEORGE ").unwrap();
    let ids: Vec<_> = found.iter().map(Author::id).collect();
    assert_eq!(ids, vec![upper.id(), lower.id()]);
}

#[test]
fn find_by_username_without_matches_returns_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    assert!(repo.find_authors_by_username("nobody").unwrap().is_empty());
}

#[test]
fn find_by_username_rejects_blank_input() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let err = repo.find_authors_by_username("<p> </p>").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ref inner) if inner.kind == ValidationKind::Empty
    ));
}

#[test]
fn corrupted_row_surfaces_as_invalid_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAuthorRepository::try_new(&conn).unwrap();

    let george = author(
        "27701c38-31be-4261-9ad2-c2a63d3fed2b",
        "author1@cnm.edu",
        Some("george"),
    );
    repo.create_author(&george).unwrap();
    conn.execute("UPDATE author SET authorEmail = 'not-an-email';", [])
        .unwrap();

    let err = repo.get_author(george.id()).unwrap_err();
    match &err {
        RepoError::InvalidRow { id, source } => {
            assert_eq!(*id, george.id());
            assert_eq!(source.field, AuthorField::Email);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.source().is_some());

    let err = repo.find_authors_by_username("george").unwrap_err();
    assert!(matches!(err, RepoError::InvalidRow { .. }));
}

#[test]
fn service_registers_and_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn).unwrap());

    let registered = service
        .register(&RegisterAuthorRequest {
            avatar_url: None,
            email: "author1@cnm.edu".to_string(),
            password_hash: HASH_97.to_string(),
            username: Some("george".to_string()),
        })
        .unwrap();
    assert_eq!(registered.activation_token().map(str::len), Some(32));

    let fetched = service.get_author(registered.id()).unwrap().unwrap();
    assert_eq!(fetched, registered);
    assert_eq!(service.find_authors_by_username("george").unwrap().len(), 1);
    assert_eq!(service.update_author(&registered).unwrap(), 1);
    assert_eq!(service.delete_author(registered.id()).unwrap(), 1);
}

#[test]
fn service_register_rejects_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn).unwrap());

    let err = service
        .register(&RegisterAuthorRequest {
            avatar_url: None,
            email: "author1@cnm.edu".to_string(),
            password_hash: "plaintext-password".to_string(),
            username: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ref inner) if inner.field == AuthorField::PasswordHash
    ));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteAuthorRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_author_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteAuthorRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("author"))
    ));
}

#[test]
fn repository_rejects_connection_missing_author_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE author (
            authorId BLOB PRIMARY KEY NOT NULL,
            authorActivationToken TEXT,
            authorAvatarUrl TEXT,
            authorEmail TEXT NOT NULL,
            authorHash TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteAuthorRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "author",
            column: "authorUsername"
        })
    ));
}

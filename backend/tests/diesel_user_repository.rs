//! Integration tests for `DieselUserRepository` against an on-disk SQLite file.
//!
//! Each test opens a fresh database in a temporary directory, bootstraps the
//! `users` table, and exercises the `UserRepository` port contract.

use chrono::{DateTime, TimeZone, Utc};
use diesel_async::RunQueryDsl;
use mockable::{DefaultClock, MockClock};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use user_registry::domain::ports::{UserPersistenceError, UserRepository};
use user_registry::domain::{Email, User, UserId};
use user_registry::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

struct TestDatabase {
    repository: DieselUserRepository,
    pool: DbPool,
    _dir: TempDir,
}

#[fixture]
async fn database() -> TestDatabase {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = DbPool::new(PoolConfig::new(dir.path().join("data/users.db")))
        .await
        .expect("pool opens");
    let repository = DieselUserRepository::new(pool.clone());
    repository.bootstrap().await.expect("users table created");
    TestDatabase {
        repository,
        pool,
        _dir: dir,
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn clock_at(timestamp: DateTime<Utc>) -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(timestamp);
    clock
}

fn user(name: &str, email: &str, age: Option<i64>, created: DateTime<Utc>) -> User {
    User::create(name, email, age, None, &clock_at(created)).expect("valid user")
}

fn names(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.name().as_ref()).collect()
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn save_then_find_round_trips_every_field(#[future] database: TestDatabase) {
    let db = database.await;
    let original = User::create(
        "Alice",
        "ALICE@x.com",
        Some(30),
        Some("+1 (555) 010-0000".to_owned()),
        &DefaultClock,
    )
    .expect("valid user");

    db.repository.save(&original).await.expect("saved");
    let by_id = db
        .repository
        .find_by_id(original.id())
        .await
        .expect("query")
        .expect("user exists");
    let by_email = db
        .repository
        .find_by_email(&Email::new("alice@x.com").expect("email"))
        .await
        .expect("query")
        .expect("user exists");

    assert_eq!(by_id, original);
    assert_eq!(by_email, original);
    assert_eq!(by_id.created_at(), by_id.updated_at());
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively(#[future] database: TestDatabase) {
    let db = database.await;
    db.repository
        .save(&user("Alice", "alice@x.com", None, at(9)))
        .await
        .expect("first save");

    let err = db
        .repository
        .save(&user("Alicia", "ALICE@X.COM", None, at(10)))
        .await
        .expect_err("duplicate email");

    assert_eq!(err, UserPersistenceError::duplicate_key("email"));
    assert_eq!(db.repository.count().await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn duplicate_id_is_reported_as_id(#[future] database: TestDatabase) {
    let db = database.await;
    let original = user("Bob", "bob@x.com", None, at(9));
    db.repository.save(&original).await.expect("first save");

    let err = db
        .repository
        .save(&original)
        .await
        .expect_err("duplicate id");

    assert!(matches!(err, UserPersistenceError::DuplicateKey { .. }));
}

#[rstest]
#[tokio::test]
async fn find_all_is_newest_first(#[future] database: TestDatabase) {
    let db = database.await;
    for (name, email, hour) in [("Old", "old@x.com", 8), ("New", "new@x.com", 12), ("Mid", "mid@x.com", 10)] {
        db.repository
            .save(&user(name, email, None, at(hour)))
            .await
            .expect("saved");
    }

    let users = db.repository.find_all().await.expect("list");

    assert_eq!(names(&users), vec!["New", "Mid", "Old"]);
}

#[rstest]
#[tokio::test]
async fn age_range_is_inclusive_and_ascending(#[future] database: TestDatabase) {
    let db = database.await;
    let people = [
        ("Teen", 17, 8),
        ("Thirty", 30, 9),
        ("Eighteen", 18, 10),
        ("Twenty", 20, 11),
        ("Forty", 40, 12),
    ];
    for (name, age, hour) in people {
        let email = format!("{}@x.com", name.to_lowercase());
        db.repository
            .save(&user(name, &email, Some(age), at(hour)))
            .await
            .expect("saved");
    }
    db.repository
        .save(&user("Ageless", "ageless@x.com", None, at(13)))
        .await
        .expect("saved");

    let users = db.repository.find_by_age_range(18, 30).await.expect("range");

    assert_eq!(names(&users), vec!["Eighteen", "Twenty", "Thirty"]);
    assert!(
        db.repository
            .find_by_age_range(30, 18)
            .await
            .expect("inverted range")
            .is_empty()
    );
}

#[rstest]
#[tokio::test]
async fn name_search_is_case_sensitive(#[future] database: TestDatabase) {
    let db = database.await;
    db.repository
        .save(&user("Alice", "alice@x.com", None, at(8)))
        .await
        .expect("saved");
    db.repository
        .save(&user("alan", "alan@x.com", None, at(9)))
        .await
        .expect("saved");
    db.repository
        .save(&user("Malia", "malia@x.com", None, at(10)))
        .await
        .expect("saved");

    let users = db.repository.find_by_name("Al").await.expect("search");
    let lower = db.repository.find_by_name("al").await.expect("search");

    assert_eq!(names(&users), vec!["Alice"]);
    assert_eq!(names(&lower), vec!["Malia", "alan"]);
}

#[rstest]
#[tokio::test]
async fn update_keeps_created_at_and_moves_updated_at(#[future] database: TestDatabase) {
    let db = database.await;
    let original = user("Carol", "carol@x.com", Some(40), at(8));
    db.repository.save(&original).await.expect("saved");

    let mut changed = original.clone();
    let later = clock_at(at(11));
    changed.update_name("Caroline", &later).expect("valid name");
    changed.update_age(Some(41), &later).expect("valid age");

    let stored = db
        .repository
        .update(original.id(), &changed)
        .await
        .expect("update")
        .expect("user exists");

    assert_eq!(stored.name().as_ref(), "Caroline");
    assert_eq!(stored.age().map(|age| age.value()), Some(41));
    assert_eq!(stored.created_at(), at(8));
    assert_eq!(stored.updated_at(), at(11));
}

#[rstest]
#[tokio::test]
async fn update_of_missing_user_returns_none(#[future] database: TestDatabase) {
    let db = database.await;
    let ghost = user("Ghost", "ghost@x.com", None, at(8));

    let result = db.repository.update(ghost.id(), &ghost).await.expect("update");

    assert!(result.is_none());
}

#[rstest]
#[tokio::test]
async fn delete_returns_the_removed_user_once(#[future] database: TestDatabase) {
    let db = database.await;
    let original = user("Dave", "dave@x.com", None, at(8));
    db.repository.save(&original).await.expect("saved");

    let removed = db.repository.delete(original.id()).await.expect("delete");
    let again = db.repository.delete(original.id()).await.expect("delete");

    assert_eq!(removed, Some(original));
    assert!(again.is_none());
    assert_eq!(db.repository.count().await.expect("count"), 0);
}

#[rstest]
#[tokio::test]
async fn bootstrap_is_idempotent(#[future] database: TestDatabase) {
    let db = database.await;
    db.repository
        .save(&user("Erin", "erin@x.com", None, at(8)))
        .await
        .expect("saved");

    db.repository.bootstrap().await.expect("second bootstrap");

    assert_eq!(db.repository.count().await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn legacy_rows_are_readable(#[future] database: TestDatabase) {
    let db = database.await;
    {
        let mut conn = db.pool.get().await.expect("connection");
        diesel::sql_query(
            "INSERT INTO users (id, name, email, age, phone, created_at, updated_at) \
             VALUES ('legacy-1', 'Frank', 'frank@x.com', 52, 'ext. 42', \
             '2023-05-06 07:08:09', '2023-05-06 07:08:09')",
        )
        .execute(&mut conn)
        .await
        .expect("legacy insert");
    }

    let id = UserId::new("legacy-1").expect("opaque id accepted");
    let stored = db
        .repository
        .find_by_id(&id)
        .await
        .expect("query")
        .expect("user exists");

    assert_eq!(stored.phone().map(AsRef::as_ref), Some("ext. 42"));
    assert_eq!(
        stored.created_at(),
        Utc.with_ymd_and_hms(2023, 5, 6, 7, 8, 9)
            .single()
            .expect("valid timestamp")
    );
}

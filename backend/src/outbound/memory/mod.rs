//! In-memory user repository.
//!
//! An explicitly owned store with the same contract as the SQLite adapter.
//! It backs the `memory` storage mode and keeps HTTP tests free of disk I/O.
//! Data lives only as long as the repository value.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId};

/// Mutex-guarded user store implementing the `UserRepository` port.
///
/// The lock is held for the duration of one repository call only.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<User>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("in-memory user store lock poisoned"))
    }
}

/// Newest first; ties keep the most recently inserted user first.
fn newest_first<'a>(users: impl DoubleEndedIterator<Item = &'a User>) -> Vec<User> {
    let mut selected: Vec<User> = users.rev().cloned().collect();
    selected.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    selected
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(newest_first(users.iter()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(users.iter().find(|user| user.id() == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(users.iter().find(|user| user.email() == email).cloned())
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.lock()?;
        Ok(newest_first(
            users
                .iter()
                .filter(|user| user.name().as_ref().contains(fragment)),
        ))
    }

    async fn find_by_age_range(&self, min: u8, max: u8) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.lock()?;
        let mut selected = newest_first(users.iter().filter(|user| {
            user.age()
                .is_some_and(|age| (min..=max).contains(&age.value()))
        }));
        selected.sort_by_key(User::age);
        Ok(selected)
    }

    async fn save(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut users = self.lock()?;
        if users.iter().any(|existing| existing.id() == user.id()) {
            return Err(UserPersistenceError::duplicate_key("id"));
        }
        if users.iter().any(|existing| existing.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_key("email"));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, id: &UserId, user: &User) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.lock()?;
        let Some(index) = users.iter().position(|existing| existing.id() == id) else {
            return Ok(None);
        };
        if users
            .iter()
            .any(|existing| existing.id() != id && existing.email() == user.email())
        {
            return Err(UserPersistenceError::duplicate_key("email"));
        }
        let slot = &mut users[index];

        // Identity and creation time always come from the stored record.
        let mut record = user.to_record();
        record.id = slot.id().to_string();
        record.created_at = slot.created_at();
        let updated = User::from_record(record)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.lock()?;
        let position = users.iter().position(|user| user.id() == id);
        Ok(position.map(|index| users.remove(index)))
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let users = self.lock()?;
        u64::try_from(users.len()).map_err(|_| UserPersistenceError::query("user count overflow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    fn clock_at(timestamp: DateTime<Utc>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(timestamp);
        clock
    }

    fn user_at(name: &str, email: &str, age: Option<i64>, minutes: i64) -> User {
        let base = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        User::create(name, email, age, None, &clock_at(base + Duration::minutes(minutes)))
            .expect("valid user")
    }

    #[fixture]
    async fn populated() -> InMemoryUserRepository {
        let repo = InMemoryUserRepository::new();
        for user in [
            user_at("Alice", "alice@x.com", Some(30), 0),
            user_at("alan", "alan@x.com", Some(18), 1),
            user_at("Bob", "bob@x.com", None, 2),
            user_at("Carol", "carol@x.com", Some(25), 3),
        ] {
            repo.save(&user).await.expect("save succeeds");
        }
        repo
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|user| user.name().as_ref()).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn find_all_returns_newest_first(#[future] populated: InMemoryUserRepository) {
        let repo = populated.await;

        let users = repo.find_all().await.expect("list");

        assert_eq!(names(&users), vec!["Carol", "Bob", "alan", "Alice"]);
    }

    #[rstest]
    #[tokio::test]
    async fn save_rejects_duplicate_email(#[future] populated: InMemoryUserRepository) {
        let repo = populated.await;
        let clash = user_at("Other", "ALICE@X.com", None, 9);

        let err = repo.save(&clash).await.expect_err("duplicate");

        assert_eq!(err, UserPersistenceError::duplicate_key("email"));
        assert_eq!(repo.count().await.expect("count"), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_name_is_case_sensitive(#[future] populated: InMemoryUserRepository) {
        let repo = populated.await;

        let users = repo.find_by_name("Al").await.expect("search");

        assert_eq!(names(&users), vec!["Alice"]);
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_age_range_is_inclusive_and_ascending(
        #[future] populated: InMemoryUserRepository,
    ) {
        let repo = populated.await;

        let users = repo.find_by_age_range(18, 30).await.expect("range");

        assert_eq!(names(&users), vec!["alan", "Carol", "Alice"]);
        assert!(repo.find_by_age_range(31, 20).await.expect("range").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_identity_and_creation_time(#[future] populated: InMemoryUserRepository) {
        let repo = populated.await;
        let stored = repo.find_all().await.expect("list").remove(0);
        let mut changed = stored.clone();
        changed
            .update_name("Caroline", &clock_at(stored.created_at() + Duration::hours(1)))
            .expect("valid name");

        let updated = repo
            .update(stored.id(), &changed)
            .await
            .expect("update")
            .expect("user exists");

        assert_eq!(updated.id(), stored.id());
        assert_eq!(updated.created_at(), stored.created_at());
        assert_eq!(updated.name().as_ref(), "Caroline");
        assert!(updated.updated_at() > stored.updated_at());
    }

    #[rstest]
    #[tokio::test]
    async fn update_rejects_email_of_another_user(#[future] populated: InMemoryUserRepository) {
        let repo = populated.await;
        let users = repo.find_all().await.expect("list");
        let mut changed = users[0].clone();
        changed
            .update_email("bob@x.com", &clock_at(changed.created_at()))
            .expect("valid email");

        let err = repo
            .update(users[0].id(), &changed)
            .await
            .expect_err("duplicate");

        assert_eq!(err, UserPersistenceError::duplicate_key("email"));
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_user_returns_none(#[future] populated: InMemoryUserRepository) {
        let repo = populated.await;
        let ghost = user_at("Ghost", "bob@x.com", None, 9);

        let result = repo.update(ghost.id(), &ghost).await.expect("update");

        assert!(result.is_none());
        assert_eq!(repo.count().await.expect("count"), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_returns_removed_user_once(#[future] populated: InMemoryUserRepository) {
        let repo = populated.await;
        let target = repo.find_all().await.expect("list").remove(0);

        let removed = repo.delete(target.id()).await.expect("delete");
        let again = repo.delete(target.id()).await.expect("delete");

        assert_eq!(removed, Some(target));
        assert!(again.is_none());
        assert_eq!(repo.count().await.expect("count"), 3);
    }
}

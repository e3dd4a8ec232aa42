// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve the `User` aggregate
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! # Available Implementations
//!
//! - **PostgresUserRepository** - `users` table via sqlx
//! - **InMemoryUserRepository** - lock-guarded BTreeMap, for development and tests
//!
//! Both enforce username uniqueness and report a clash as
//! `RepositoryError::Conflict`.

pub mod postgres_user;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::domain::repository::{RepositoryError, UserRepository};
use crate::domain::user::{NewUser, User, UserId};

pub use postgres_user::PostgresUserRepository;

#[derive(Default)]
struct UserTable {
    rows: BTreeMap<UserId, User>,
    next_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(table: &UserTable, username: &str, except: Option<UserId>) -> bool {
    table
        .rows
        .values()
        .any(|u| u.username == username && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut table = self.table.write();
        if username_taken(&table, &user.username, None) {
            return Err(RepositoryError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        table.next_id += 1;
        let created = User {
            id: UserId(table.next_id),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: true,
            password_hash: user.password_hash.clone(),
            date_joined: Utc::now(),
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut table = self.table.write();
        if !table.rows.contains_key(&user.id) {
            return Err(RepositoryError::NotFound(format!("user {}", user.id)));
        }
        if username_taken(&table, &user.username, Some(user.id)) {
            return Err(RepositoryError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        table.rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn first(&self) -> Result<Option<User>, RepositoryError> {
        Ok(self.table.read().rows.values().next().cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.table.read().rows.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.table.read().rows.len() as u64)
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.table.write().rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_assigned_in_order_and_not_reused() {
        let repo = InMemoryUserRepository::new();
        let joe = repo.create(&NewUser::new("joe")).await.unwrap();
        let clark = repo.create(&NewUser::new("clark")).await.unwrap();
        assert_eq!(joe.id, UserId(1));
        assert_eq!(clark.id, UserId(2));

        repo.delete(clark.id).await.unwrap();
        let lois = repo.create(&NewUser::new("lois")).await.unwrap();
        assert_eq!(lois.id, UserId(3));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create(&NewUser::new("joe")).await.unwrap();
        let err = repo.create(&NewUser::new("joe")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_taking_another_username() {
        let repo = InMemoryUserRepository::new();
        let mut joe = repo.create(&NewUser::new("joe")).await.unwrap();
        repo.create(&NewUser::new("clark")).await.unwrap();

        joe.username = "clark".to_string();
        assert!(matches!(
            repo.update(&joe).await,
            Err(RepositoryError::Conflict(_))
        ));

        // Keeping one's own username is fine
        joe.username = "joe".to_string();
        joe.first_name = "Joe".to_string();
        repo.update(&joe).await.unwrap();
        let stored = repo.find_by_username("joe").await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Joe");
    }

    #[tokio::test]
    async fn test_first_and_list_are_ordered_by_id() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.first().await.unwrap().is_none());

        repo.create(&NewUser::new("joe")).await.unwrap();
        repo.create(&NewUser::new("clark")).await.unwrap();

        assert_eq!(repo.first().await.unwrap().unwrap().username, "joe");
        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["joe", "clark"]);
    }
}

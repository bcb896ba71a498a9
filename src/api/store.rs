//! Credential storage.
//!
//! Handlers only talk to [`CredentialStore`]; the in-memory implementation keeps
//! records for the lifetime of the process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use tokio::sync::RwLock;
use utoipa::ToSchema;

/// Account role, carried on the wire as `type`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const NAMES: [&'static str; 2] = ["user", "admin"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored credential. Never mutated after insertion.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub email: String,
    pub role: Role,
    pub salt: String,
    pub password_hash: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("salt", &"***")
            .field("password_hash", &"***")
            .finish()
    }
}

/// Outcome of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Conflict,
}

/// Lookup and atomic insertion of credential records keyed by email.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, email: &str) -> Option<UserRecord>;

    async fn exists(&self, email: &str) -> bool;

    /// Store `record` unless its email is already taken. The check and the write
    /// happen as one step, so concurrent callers with the same email get exactly
    /// one `Created`.
    async fn insert_if_absent(&self, record: UserRecord) -> InsertOutcome;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, email: &str) -> Option<UserRecord> {
        self.users.read().await.get(email).cloned()
    }

    async fn exists(&self, email: &str) -> bool {
        self.users.read().await.contains_key(email)
    }

    async fn insert_if_absent(&self, record: UserRecord) -> InsertOutcome {
        let mut users = self.users.write().await;

        if users.contains_key(&record.email) {
            return InsertOutcome::Conflict;
        }

        users.insert(record.email.clone(), record);

        InsertOutcome::Created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(email: &str, hash: &str) -> UserRecord {
        UserRecord {
            email: email.to_string(),
            role: Role::User,
            salt: "c2FsdHNhbHQ".to_string(),
            password_hash: hash.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        let outcome = store.insert_if_absent(record("bob@x.com", "h1")).await;
        assert_eq!(outcome, InsertOutcome::Created);
        assert!(store.exists("bob@x.com").await);
        assert_eq!(
            store.get("bob@x.com").await.map(|r| r.password_hash),
            Some("h1".to_string())
        );
        assert!(store.get("alice@x.com").await.is_none());
    }

    #[tokio::test]
    async fn second_insert_keeps_first_record() {
        let store = MemoryStore::new();
        store.insert_if_absent(record("bob@x.com", "h1")).await;

        let outcome = store.insert_if_absent(record("bob@x.com", "h2")).await;
        assert_eq!(outcome, InsertOutcome::Conflict);
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get("bob@x.com").await.map(|r| r.password_hash),
            Some("h1".to_string())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_create_once() {
        let store = Arc::new(MemoryStore::new());

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .insert_if_absent(record("race@x.com", &format!("h{i}")))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.ok() == Some(InsertOutcome::Created) {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn role_parses_exact_names_only() {
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("Admin".parse::<Role>().is_err());
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn debug_hides_hash() {
        let output = format!("{:?}", record("bob@x.com", "$argon2id$secret"));
        assert!(output.contains("bob@x.com"));
        assert!(!output.contains("$argon2id$secret"));
    }
}

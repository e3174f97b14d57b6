//! In-memory user registry.

use std::{collections::HashMap, sync::RwLock};

use serde::Serialize;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: Option<String>,
}

/// Thread-safe registry of users keyed by ID.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<u64, User>>,
}

impl UserDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user. Returns `true` if the ID was new.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned (a previous thread panicked
    /// while holding the write lock).
    pub fn upsert(&self, user: User) -> bool {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.users
            .write()
            .expect("user directory write lock poisoned")
            .insert(user.id, user)
            .is_none()
    }

    /// Look up a user by ID.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<User> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.users
            .read()
            .expect("user directory read lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Number of registered users.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.users
            .read()
            .expect("user directory read lock poisoned")
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

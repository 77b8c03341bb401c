use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::{
    types::{Message, ProfileChanges, User},
    MessageStore, StoreError, UserStore,
};

/// In-process backend. Every operation runs under a single lock, which makes
/// check-then-insert and compare-and-swap atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    messages: Vec<Message>,
    last_created: HashMap<Uuid, OffsetDateTime>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-written row.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Tables {
    fn email_owner(&self, email: &str) -> Option<Uuid> {
        self.users
            .values()
            .find(|u| u.email == email)
            .map(|u| u.id)
    }

    /// Strictly increasing per owner, even when the clock does not advance.
    fn next_timestamp(&mut self, user_id: Uuid) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let ts = match self.last_created.get(&user_id) {
            Some(last) if *last >= now => *last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created.insert(user_id, ts);
        ts
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables();
        if tables.email_owner(email).is_some() {
            return Err(StoreError::EmailTaken);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables();
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if matches!(tables.email_owner(email), Some(owner) if owner != id) {
                return Err(StoreError::EmailTaken);
            }
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        Ok(Some(user.clone()))
    }

    async fn replace_password_hash(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables();
        match tables.users.get_mut(&id) {
            Some(user) if user.password_hash == expected_hash => {
                user.password_hash = new_hash.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert(
        &self,
        user_id: Uuid,
        content: &str,
        from_automated: bool,
    ) -> Result<Message, StoreError> {
        let mut tables = self.tables();
        let created_at = tables.next_timestamp(user_id);
        let message = Message {
            id: Uuid::new_v4(),
            content: content.to_string(),
            from_automated,
            user_id,
            created_at,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Message>, StoreError> {
        // Rows are appended in creation order, so a filter keeps them ascending.
        let tables = self.tables();
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }
}

//! In-memory repository for local runs and tests

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use common::{
    error::{DatabaseError, DatabaseResult},
    time::DayWindow,
};

use super::ProfileRepository;
use crate::models::{CreationRecord, NewUser, ProfileChanges, UserId, UserRecord};

#[derive(Default)]
struct Store {
    users: BTreeMap<UserId, UserRecord>,
    creations: Vec<CreationRecord>,
    next_user_id: UserId,
    writes: usize,
}

/// Repository keeping users and creations in process memory.
///
/// The lock is never held across an await point.
#[derive(Default)]
pub struct MemoryProfileRepository {
    store: Mutex<Store>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a user record as-is
    pub fn insert_user(&self, record: UserRecord) {
        let mut store = self.store();
        store.next_user_id = store.next_user_id.max(record.id);
        store.users.insert(record.id, record);
    }

    /// Seed a creation
    pub fn insert_creation(&self, creation: CreationRecord) {
        self.store().creations.push(creation);
    }

    /// Number of mutations performed through the repository trait
    pub fn write_count(&self) -> usize {
        self.store().writes
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn find_by_id(&self, id: UserId) -> DatabaseResult<Option<UserRecord>> {
        Ok(self.store().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<UserRecord>> {
        Ok(self
            .store()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create(&self, new_user: &NewUser) -> DatabaseResult<UserRecord> {
        let mut store = self.store();
        if store.users.values().any(|user| user.email == new_user.email) {
            return Err(DatabaseError::UniqueViolation(format!(
                "email {} already exists",
                new_user.email
            )));
        }

        store.next_user_id += 1;
        let record = UserRecord {
            id: store.next_user_id,
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            hashed_password: new_user.hashed_password.clone(),
            role: new_user.role.clone(),
            profile_image: new_user.profile_image.clone(),
            picture: new_user.picture.clone(),
            face_shape: None,
            personal_color: None,
            height: None,
            gender: None,
            body_type: None,
        };
        store.users.insert(record.id, record.clone());
        store.writes += 1;

        Ok(record)
    }

    async fn update_partial(
        &self,
        id: UserId,
        changes: &ProfileChanges,
    ) -> DatabaseResult<Option<UserRecord>> {
        let mut store = self.store();
        if changes.is_empty() {
            return Ok(store.users.get(&id).cloned());
        }

        let Some(record) = store.users.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply_to(record);
        let updated = record.clone();
        store.writes += 1;

        Ok(Some(updated))
    }

    async fn count_creations_today(&self, id: UserId, today: DayWindow) -> DatabaseResult<u32> {
        let count = self
            .store()
            .creations
            .iter()
            .filter(|creation| creation.user_id == id && today.contains(creation.created_at))
            .count();

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn list_creations_by_user(&self, id: UserId) -> DatabaseResult<Vec<CreationRecord>> {
        let mut creations: Vec<CreationRecord> = self
            .store()
            .creations
            .iter()
            .filter(|creation| creation.user_id == id)
            .cloned()
            .collect();
        creations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(creations)
    }

    async fn list_users(&self) -> DatabaseResult<Vec<UserRecord>> {
        Ok(self.store().users.values().cloned().collect())
    }
}

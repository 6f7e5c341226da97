// SPDX-License-Identifier: MIT

//! In-memory session store, used by tests and keyless local runs.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::session::SessionState;
use crate::store::{SessionStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    sessions: DashMap<Uuid, SessionState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<SessionState>, StoreError> {
        Ok(self.sessions.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        self.sessions.insert(state.user.id, state.clone());
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.sessions.remove(&user_id);
        Ok(())
    }
}

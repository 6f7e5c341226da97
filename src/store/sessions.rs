// SPDX-License-Identifier: MIT

//! Per-session mutation serialization over the store adapter.
//!
//! Every mutation of one user's state goes through `with_session`: take
//! that user's lock, load, mutate, save. Two concurrent requests for the
//! same user therefore observe each other's writes in full, matching the
//! single-threaded atomicity of the original client.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::session::SessionState;
use crate::store::SessionStore;

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Whether a session exists for this user.
    pub async fn exists(&self, user_id: Uuid) -> Result<bool> {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().await;
        Ok(self.load_unlocked(user_id).await?.is_some())
    }

    /// Persist a brand-new session. Refuses to clobber an existing one.
    pub async fn create(&self, state: SessionState) -> Result<()> {
        let lock = self.lock_for(state.user.id);
        let _guard = lock.lock().await;
        if self.load_unlocked(state.user.id).await?.is_some() {
            return Err(AppError::BadRequest("Session already exists".to_string()));
        }
        self.save_unlocked(&state).await
    }

    /// Run `f` against the user's state under the session lock, persisting
    /// the (possibly mutated) state afterwards. Errors from `f` abort the
    /// save, leaving the stored state untouched.
    pub async fn with_session<T>(
        &self,
        user_id: Uuid,
        f: impl FnOnce(&mut SessionState) -> Result<T>,
    ) -> Result<T> {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().await;

        let mut state = self
            .load_unlocked(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", user_id)))?;

        let value = f(&mut state)?;
        self.save_unlocked(&state).await?;
        Ok(value)
    }

    /// Like `with_session`, but creates the session via `init` when none
    /// exists yet (used by the billing webhook, which can land before
    /// onboarding finishes).
    pub async fn with_session_or_create<T>(
        &self,
        user_id: Uuid,
        init: impl FnOnce() -> SessionState,
        f: impl FnOnce(&mut SessionState) -> Result<T>,
    ) -> Result<T> {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().await;

        let mut state = match self.load_unlocked(user_id).await? {
            Some(state) => state,
            None => init(),
        };

        let value = f(&mut state)?;
        self.save_unlocked(&state).await?;
        Ok(value)
    }

    async fn load_unlocked(&self, user_id: Uuid) -> Result<Option<SessionState>> {
        self.store
            .load(user_id)
            .await
            .map_err(|err| AppError::Storage(err.to_string()))
    }

    async fn save_unlocked(&self, state: &SessionState) -> Result<()> {
        self.store
            .save(state)
            .await
            .map_err(|err| AppError::Storage(err.to_string()))
    }
}

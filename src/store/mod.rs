// SPDX-License-Identifier: MIT

//! Session persistence.
//!
//! `SessionStore` is the explicit load/save adapter boundary; everything
//! above it only ever sees whole `SessionState` values. `SessionManager`
//! adds the per-user locking that serializes mutations within a session.

pub mod file;
pub mod memory;
pub mod sessions;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use sessions::SessionManager;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::session::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Load/save adapter for session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> Result<Option<SessionState>, StoreError>;
    async fn save(&self, state: &SessionState) -> Result<(), StoreError>;
    async fn delete(&self, user_id: Uuid) -> Result<(), StoreError>;
}

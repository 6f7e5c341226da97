// SPDX-License-Identifier: MIT

//! JSON-file session store: one file per user under a data directory.
//!
//! Saves write to a temporary sibling and rename into place, so a crash
//! mid-write never leaves a truncated session on disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::models::session::SessionState;
use crate::store::{SessionStore, StoreError};

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<SessionState>, StoreError> {
        let path = self.path_for(user_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(state.user.id);
        let tmp = tmp_path(&path);
        let raw = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(user_id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

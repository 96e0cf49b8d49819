//! services/client/src/adapters/session_file.rs
//!
//! JSON-file implementation of durable session storage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use lep_inspect_core::domain::{PersistedSession, UserProfile};
use lep_inspect_core::ports::{PortError, PortResult, SessionStorage};

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Serialize, Deserialize)]
struct SessionRecord {
    access_token: String,
    refresh_token: String,
    user: UserRecord,
}

#[derive(Serialize, Deserialize)]
struct UserRecord {
    id: u64,
    email: String,
    first_name: String,
    last_name: String,
}

impl SessionStorage for FileSessionStore {
    fn load(&self) -> PortResult<Option<PersistedSession>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PortError::Storage(e.to_string())),
        };
        let record: SessionRecord =
            serde_json::from_slice(&bytes).map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(Some(PersistedSession {
            access_token: record.access_token,
            refresh_token: record.refresh_token,
            user: UserProfile {
                id: record.user.id,
                email: record.user.email,
                first_name: record.user.first_name,
                last_name: record.user.last_name,
            },
        }))
    }

    fn save(&self, session: &PersistedSession) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PortError::Storage(e.to_string()))?;
        }
        let record = SessionRecord {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            user: UserRecord {
                id: session.user.id,
                email: session.user.email.clone(),
                first_name: session.user.first_name.clone(),
                last_name: session.user.last_name.clone(),
            },
        };
        let bytes =
            serde_json::to_vec_pretty(&record).map_err(|e| PortError::Storage(e.to_string()))?;
        std::fs::write(&self.path, bytes).map_err(|e| PortError::Storage(e.to_string()))
    }

    fn clear(&self) -> PortResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }
}

//! JSON-file backed allow-list of users permitted to start jobs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use engine_logging::{engine_info, engine_warn};
use relay_core::{UserRecord, UserStatus};
use relay_engine::{AtomicFileWriter, PersistError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize users: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("approval of {days} day(s) is out of range")]
    DaysOutOfRange { days: u32 },
}

pub struct UserStore {
    writer: AtomicFileWriter,
    users: Mutex<Vec<UserRecord>>,
}

impl UserStore {
    /// Load the store from `path`. A missing file is an empty allow-list.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let users = load_users(&path)?;
        engine_info!("Loaded {} user(s) from {:?}", users.len(), path);
        Ok(Self {
            writer: AtomicFileWriter::new(path),
            users: Mutex::new(users),
        })
    }

    pub fn get_all_users(&self) -> Vec<UserRecord> {
        self.lock().clone()
    }

    pub fn get_user(&self, username: &str) -> Option<UserRecord> {
        self.lock().iter().find(|u| u.username == username).cloned()
    }

    /// Approve `username` for `days` from `now`, replacing any existing entry.
    pub fn add_user(
        &self,
        username: &str,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<UserRecord, StoreError> {
        let record =
            UserRecord::approve(username, now, days).ok_or(StoreError::DaysOutOfRange { days })?;
        self.commit(|users| {
            match users.iter_mut().find(|u| u.username == username) {
                Some(existing) => *existing = record.clone(),
                None => users.push(record.clone()),
            }
            Some(())
        })?;
        Ok(record)
    }

    /// Returns `Ok(None)` when no such user exists.
    pub fn block_user(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.commit(|users| {
            let user = users.iter_mut().find(|u| u.username == username)?;
            user.status = UserStatus::Blocked;
            Some(user.clone())
        })
    }

    /// Returns whether a user was removed.
    pub fn remove_user(&self, username: &str) -> Result<bool, StoreError> {
        self.commit(|users| {
            let before = users.len();
            users.retain(|u| u.username != username);
            (users.len() != before).then_some(())
        })
        .map(|removed| removed.is_some())
    }

    /// Whether `username` may start jobs at `now`.
    pub fn is_allowed(&self, username: &str, now: DateTime<Utc>) -> bool {
        self.get_user(username)
            .is_some_and(|user| user.is_active(now))
    }

    /// Apply `change` to a copy of the list and persist it. The in-memory
    /// list is replaced only once the write succeeds; `None` from `change`
    /// means nothing changed and nothing is written.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut Vec<UserRecord>) -> Option<T>,
    ) -> Result<Option<T>, StoreError> {
        let mut users = self.lock();
        let mut updated = users.clone();
        let Some(outcome) = change(&mut updated) else {
            return Ok(None);
        };
        self.save(&updated)?;
        *users = updated;
        Ok(Some(outcome))
    }

    fn save(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(users)?;
        self.writer.write(&content)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<UserRecord>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_users(path: &Path) -> Result<Vec<UserRecord>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            engine_warn!("User store {:?} not found; starting empty", path);
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

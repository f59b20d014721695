use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("parent directory missing or not writable: {0}")]
    ParentDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Replaces one file atomically: content goes to a temp file in the same
/// directory, which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    path: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, content: &[u8]) -> Result<(), PersistError> {
        let dir = self.parent_dir()?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.path).map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }

    fn parent_dir(&self) -> Result<PathBuf, PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if dir.exists() {
            let meta = fs::metadata(&dir).map_err(|e| PersistError::ParentDir(e.to_string()))?;
            if !meta.is_dir() {
                return Err(PersistError::ParentDir(format!(
                    "{} is not a directory",
                    dir.display()
                )));
            }
        } else {
            fs::create_dir_all(&dir).map_err(|e| PersistError::ParentDir(e.to_string()))?;
        }
        Ok(dir)
    }
}

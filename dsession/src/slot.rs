//! Single key-value slot holding the active session id as a plain string.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::StoreError;

pub trait SessionSlot: Send + Sync {
    /// `Ok(None)` means no prior session was recorded.
    fn load(&self) -> Result<Option<String>, StoreError>;

    fn save(&self, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionSlot {
    value: Mutex<Option<String>>,
}

impl InMemorySessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl SessionSlot for InMemorySessionSlot {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileSessionSlot {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionSlot {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionSlot for FileSessionSlot {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let value = contents.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) if error.kind() == ErrorKind::InvalidData => Err(StoreError::corrupt(
                format!("session slot is not valid UTF-8: {error}"),
            )),
            Err(error) => Err(StoreError::storage(format!(
                "failed to read session slot: {error}"
            ))),
        }
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        write_atomic(&self.path, value.as_bytes())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::storage("session slot path has no parent directory"));
    };
    fs::create_dir_all(parent).map_err(|error| {
        StoreError::storage(format!("failed to create slot directory: {error}"))
    })?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|error| {
        StoreError::storage(format!("failed to write temporary slot file: {error}"))
    })?;

    fs::rename(&tmp, path)
        .map_err(|error| StoreError::storage(format!("failed to finalize slot file: {error}")))
}

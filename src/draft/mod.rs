use crate::error::DraftError;
use crate::value::FormValues;

mod debounce;
mod storage;

pub use debounce::Debouncer;
pub use storage::{DraftStorage, FileStorage, MemoryStorage};

/// Reads and writes the single draft of one form.
#[derive(Debug)]
pub struct DraftStore<S> {
    storage: S,
    key: String,
}

impl<S: DraftStorage> DraftStore<S> {
    /// A store for the draft of `form_id`, saved under `{prefix}{form_id}`.
    pub fn new(storage: S, prefix: &str, form_id: &str) -> Self {
        Self {
            storage,
            key: format!("{}{}", prefix, form_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Restores the saved values, if any.
    ///
    /// A draft that cannot be decoded is removed and reported as `DraftError::Malformed`;
    /// callers are expected to start from empty values in that case.
    pub fn load(&mut self) -> Result<Option<FormValues>, DraftError> {
        let parsed = match self.storage.get(&self.key) {
            Ok(None) => return Ok(None),
            Ok(Some(raw)) => serde_json::from_str::<FormValues>(&raw).map_err(|e| {
                DraftError::Malformed {
                    key: self.key.clone(),
                    reason: e.to_string(),
                }
            }),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(values) => Ok(Some(values)),
            Err(e @ DraftError::Malformed { .. }) => {
                if let Err(remove_err) = self.storage.remove(&self.key) {
                    log::warn!("Could not remove unreadable draft: {}", remove_err);
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Overwrites the draft with `values`.
    pub fn save(&mut self, values: &FormValues) -> Result<(), DraftError> {
        let json = serde_json::to_string(values).map_err(|e| DraftError::Storage {
            key: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.storage.set(&self.key, &json)
    }

    pub fn discard(&mut self) -> Result<(), DraftError> {
        self.storage.remove(&self.key)
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(Uuid);

impl BatchId {
    pub fn new() -> Self {
        BatchId(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Percent-complete per running batch. Cloning shares the same registry, so a
/// progress endpoint can poll while a batch runs elsewhere.
#[derive(Debug, Clone, Default)]
pub struct ProgressRegistry {
    batches: Arc<Mutex<HashMap<BatchId, u8>>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new batch at 0%. The entry lives as long as the handle.
    pub fn start(&self) -> ProgressHandle {
        let id = BatchId::new();
        self.lock().insert(id, 0);
        log::debug!("Batch {} started", id);
        ProgressHandle {
            id,
            registry: self.clone(),
        }
    }

    /// `None` once the batch has finished or if it was never started.
    pub fn percent(&self, id: BatchId) -> Option<u8> {
        self.lock().get(&id).copied()
    }

    pub fn active_batches(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BatchId, u8>> {
        // A panicked writer can only leave a stale percentage behind.
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct ProgressHandle {
    id: BatchId,
    registry: ProgressRegistry,
}

impl ProgressHandle {
    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn update(&self, done: usize, total: usize) {
        let percent = if total == 0 {
            100
        } else {
            (done.min(total) * 100 / total) as u8
        };
        self.registry.lock().insert(self.id, percent);
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
        log::debug!("Batch {} finished", self.id);
    }
}

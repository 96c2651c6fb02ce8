use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::SourceFile;

pub type PreviewId = u64;

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: PreviewId,
    live: BTreeMap<PreviewId, String>,
    acquired: u64,
    released: u64,
}

/// Issues and tracks preview handles for the files of one session.
///
/// Cloning shares the underlying registry, so a front-end can keep a clone
/// to observe how many previews are still outstanding.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, file: &SourceFile) -> PreviewHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, file.name.clone());
        inner.acquired += 1;
        PreviewHandle {
            id,
            uri: format!("preview://{id}/{}", file.name),
            registry: self.clone(),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.lock().live.len()
    }

    pub fn acquired_total(&self) -> u64 {
        self.lock().acquired
    }

    pub fn released_total(&self) -> u64 {
        self.lock().released
    }

    pub fn is_live(&self, id: PreviewId) -> bool {
        self.lock().live.contains_key(&id)
    }

    fn release(&self, id: PreviewId) {
        let mut inner = self.lock();
        if inner.live.remove(&id).is_some() {
            inner.released += 1;
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Revocable reference to a file's preview. Released when dropped.
pub struct PreviewHandle {
    id: PreviewId,
    uri: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn id(&self) -> PreviewId {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("id", &self.id)
            .field("uri", &self.uri)
            .finish()
    }
}

impl PartialEq for PreviewHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PreviewHandle {}

use std::cell::RefCell;
use std::collections::HashMap;

use super::persistence::{Persistence, StoredDocument};
use crate::error::{SocratesError, SocratesResult};

/// In-memory document store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    documents: RefCell<HashMap<String, StoredDocument>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for InMemoryPersistence {
    fn get_by_id(&self, id: &str) -> SocratesResult<Option<StoredDocument>> {
        Ok(self.documents.borrow().get(id).cloned())
    }

    fn save_with_version(&self, document: &StoredDocument) -> SocratesResult<u64> {
        let mut documents = self.documents.borrow_mut();
        let actual = documents.get(&document.id).map_or(0, |d| d.version);
        if actual != document.version {
            return Err(SocratesError::VersionConflict {
                id: document.id.clone(),
                expected: document.version,
                actual,
            });
        }

        let next = actual + 1;
        documents.insert(
            document.id.clone(),
            StoredDocument {
                version: next,
                ..document.clone()
            },
        );
        Ok(next)
    }
}

use serde_json::Value;

use crate::error::SocratesResult;

/// A stored document together with its optimistic-locking version.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub version: u64,
    pub state: Value,
}

/// Storage backend for versioned documents.
///
/// `save_with_version` treats `document.version` as the version the caller
/// last read. The write succeeds only if the stored version still matches
/// (an absent document counts as version 0) and returns the new version.
/// Otherwise it fails with `SocratesError::VersionConflict` and stores
/// nothing.
pub trait Persistence {
    fn get_by_id(&self, id: &str) -> SocratesResult<Option<StoredDocument>>;

    fn save_with_version(&self, document: &StoredDocument) -> SocratesResult<u64>;
}

impl<P: Persistence + ?Sized> Persistence for &P {
    fn get_by_id(&self, id: &str) -> SocratesResult<Option<StoredDocument>> {
        (**self).get_by_id(id)
    }

    fn save_with_version(&self, document: &StoredDocument) -> SocratesResult<u64> {
        (**self).save_with_version(document)
    }
}

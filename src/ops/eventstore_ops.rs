use crate::db::{Persistence, StoredDocument};
use crate::error::SocratesResult;
use crate::model::{EventStoreState, SocratesEventStore, SOCRATES_EVENT_STORE_ID};

/// Loads and saves the conference event store through an injected backend.
pub struct EventStoreGateway<P> {
    persistence: P,
}

impl<P: Persistence> EventStoreGateway<P> {
    pub fn new(persistence: P) -> Self {
        Self { persistence }
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn get_event_store(&self) -> SocratesResult<Option<SocratesEventStore>> {
        let Some(document) = self.persistence.get_by_id(SOCRATES_EVENT_STORE_ID)? else {
            tracing::debug!(id = SOCRATES_EVENT_STORE_ID, "no stored event store");
            return Ok(None);
        };

        let state: EventStoreState = serde_json::from_value(document.state)?;
        let store = SocratesEventStore::from_state(state, document.version)?;
        tracing::debug!(id = store.id(), version = store.version(), "loaded event store");
        Ok(Some(store))
    }

    /// The stored event store, or an empty one at version 0.
    pub fn load_or_create(&self) -> SocratesResult<SocratesEventStore> {
        Ok(self.get_event_store()?.unwrap_or_default())
    }

    /// Saves against the version the store was loaded at and advances it on
    /// success. A version conflict leaves `store` untouched.
    pub fn save_event_store(&self, store: &mut SocratesEventStore) -> SocratesResult<()> {
        let document = StoredDocument {
            id: store.id().to_string(),
            version: store.version(),
            state: serde_json::to_value(store.state())?,
        };

        match self.persistence.save_with_version(&document) {
            Ok(version) => {
                tracing::debug!(id = store.id(), version, "saved event store");
                store.set_version(version);
                Ok(())
            }
            Err(e) => {
                if e.is_version_conflict() {
                    tracing::warn!(id = store.id(), expected = store.version(), "stale event store");
                }
                Err(e)
            }
        }
    }
}

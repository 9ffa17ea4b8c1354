use std::collections::BTreeMap;

use super::resource::Resource;
use super::snapshot::{EventStoreState, SCHEMA_VERSION};
use crate::error::SocratesResult;

/// Identifier under which the conference state is stored.
pub const SOCRATES_EVENT_STORE_ID: &str = "socratesEventStore";

/// Conference-wide aggregate: every bookable resource plus the stored version
/// it was loaded at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocratesEventStore {
    id: String,
    version: u64,
    resources: BTreeMap<String, Resource>,
}

impl SocratesEventStore {
    pub fn new() -> Self {
        Self {
            id: SOCRATES_EVENT_STORE_ID.to_string(),
            version: 0,
            resources: BTreeMap::new(),
        }
    }

    pub fn from_state(state: EventStoreState, version: u64) -> SocratesResult<Self> {
        state.check_schema()?;
        let resources = state
            .resources
            .into_iter()
            .map(|(name, snapshot)| Resource::from_snapshot(snapshot).map(|r| (name, r)))
            .collect::<SocratesResult<BTreeMap<_, _>>>()?;
        Ok(Self {
            id: state.id,
            version,
            resources,
        })
    }

    pub fn state(&self) -> EventStoreState {
        EventStoreState {
            schema_version: SCHEMA_VERSION,
            id: self.id.clone(),
            resources: self
                .resources
                .iter()
                .map(|(name, resource)| (name.clone(), resource.to_snapshot()))
                .collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stored version this value was loaded at (0 if never saved).
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    pub fn resource_named(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn resource_named_mut(&mut self, name: &str) -> Option<&mut Resource> {
        self.resources.get_mut(name)
    }

    /// Inserts or replaces the resource stored under `name`.
    pub fn add_resource(&mut self, name: impl Into<String>, resource: Resource) {
        self.resources.insert(name.into(), resource);
    }
}

impl Default for SocratesEventStore {
    fn default() -> Self {
        Self::new()
    }
}

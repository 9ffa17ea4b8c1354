//! Persisted representation of the conference state.
//!
//! The wire format keeps the underscore-prefixed field names the stored
//! documents have always used. Everything read from storage passes through
//! [`Resource::from_snapshot`], which restores the in-memory invariants
//! instead of trusting the document.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::member::{MemberId, MemberRegistration};
use super::resource::Resource;
use crate::error::{SocratesError, SocratesResult};
use crate::validation;

/// Latest snapshot layout this crate writes and understands.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    1
}

/// Older documents store `null` where a field was never set.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSnapshot {
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "registeredAt", default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    #[serde(rename = "_registeredMembers", default, deserialize_with = "null_as_default")]
    pub registered_members: Vec<RegistrationSnapshot>,
    #[serde(rename = "_limit", default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(rename = "_registrationOpen", default, deserialize_with = "null_as_default")]
    pub registration_open: bool,
    #[serde(rename = "_withWaitinglist", default, deserialize_with = "null_as_default")]
    pub with_waitinglist: bool,
}

/// The whole event store document, keyed by resource name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStoreState {
    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    pub schema_version: u32,
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: BTreeMap<String, ResourceSnapshot>,
}

impl EventStoreState {
    pub fn check_schema(&self) -> SocratesResult<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(SocratesError::UnsupportedSchema {
                found: self.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(())
    }
}

impl Resource {
    pub fn from_snapshot(snapshot: ResourceSnapshot) -> SocratesResult<Self> {
        let limit = validation::optional_positive(snapshot.limit, "limit")?;

        let mut seen = HashSet::new();
        let mut registered_members = Vec::with_capacity(snapshot.registered_members.len());
        for registration in snapshot.registered_members {
            if !seen.insert(registration.member_id.clone()) {
                tracing::warn!(
                    member_id = %registration.member_id,
                    "dropping repeated registration from snapshot"
                );
                continue;
            }
            registered_members.push(MemberRegistration {
                member_id: MemberId::new(registration.member_id),
                registered_at: registration.registered_at,
            });
        }

        Ok(Self {
            registered_members,
            limit,
            registration_open: snapshot.registration_open,
            with_waitinglist: snapshot.with_waitinglist,
        })
    }

    pub fn to_snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            registered_members: self
                .registered_members
                .iter()
                .map(|r| RegistrationSnapshot {
                    member_id: r.member_id.as_str().to_string(),
                    registered_at: r.registered_at,
                })
                .collect(),
            limit: self.limit.map(i64::from),
            registration_open: self.registration_open,
            with_waitinglist: self.with_waitinglist,
        }
    }
}

//! Load, mutate, save cycles against the conference event store.
//!
//! Each operation reloads the store on every attempt and retries when the
//! save loses an optimistic-locking race, up to `max_attempts` attempts.

use crate::db::Persistence;
use crate::error::{SocratesError, SocratesResult};
use crate::model::{Resource, SocratesEventStore};
use crate::ops::eventstore_ops::EventStoreGateway;
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
    /// Registration for the resource is switched off.
    Closed,
    Full,
}

enum Change<T> {
    Save(T),
    Skip(T),
}

fn with_retry<P, T, F>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    mut apply: F,
) -> SocratesResult<T>
where
    P: Persistence,
    F: FnMut(&mut SocratesEventStore) -> SocratesResult<Change<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let mut store = gateway.load_or_create()?;
        let outcome = match apply(&mut store)? {
            Change::Skip(outcome) => return Ok(outcome),
            Change::Save(outcome) => outcome,
        };

        match gateway.save_event_store(&mut store) {
            Ok(()) => return Ok(outcome),
            Err(e) if e.is_version_conflict() && attempt < max_attempts => {
                tracing::warn!(attempt, max_attempts, "retrying after version conflict");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn resource_mut<'a>(store: &'a mut SocratesEventStore, name: &str) -> SocratesResult<&'a mut Resource> {
    store
        .resource_named_mut(name)
        .ok_or_else(|| SocratesError::NotFound {
            entity_type: "Resource".into(),
            id: name.to_string(),
        })
}

fn ensure_absent(store: &SocratesEventStore, name: &str) -> SocratesResult<()> {
    if store.resource_named(name).is_some() {
        return Err(SocratesError::AlreadyExists {
            entity_type: "Resource".into(),
            identifier: name.to_string(),
        });
    }
    Ok(())
}

pub fn add_resource<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    name: &str,
    limit: Option<i64>,
) -> SocratesResult<Resource> {
    let name = validation::non_blank(name, "name")?;
    let limit = validation::optional_positive(limit, "limit")?;

    let resource = with_retry(gateway, max_attempts, |store| {
        ensure_absent(store, &name)?;
        let resource = Resource::create(limit);
        store.add_resource(name.clone(), resource.clone());
        Ok(Change::Save(resource))
    })?;
    tracing::info!(resource = %name, ?limit, "resource added");
    Ok(resource)
}

pub fn register_member<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    resource_name: &str,
    member_id: &str,
) -> SocratesResult<RegistrationOutcome> {
    let resource_name = validation::non_blank(resource_name, "resource")?;
    let member_id = validation::non_blank(member_id, "member id")?;

    let outcome = with_retry(gateway, max_attempts, |store| {
        let resource = resource_mut(store, &resource_name)?;
        if resource.is_registered(&member_id) {
            return Ok(Change::Skip(RegistrationOutcome::AlreadyRegistered));
        }
        if !resource.registration_open() {
            return Ok(Change::Skip(RegistrationOutcome::Closed));
        }
        if resource.is_full() {
            return Ok(Change::Skip(RegistrationOutcome::Full));
        }
        resource.add_member_id(member_id.as_str());
        Ok(Change::Save(RegistrationOutcome::Registered))
    })?;
    tracing::info!(resource = %resource_name, member = %member_id, ?outcome, "registration");
    Ok(outcome)
}

/// Returns whether the member was registered before.
pub fn unregister_member<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    resource_name: &str,
    member_id: &str,
) -> SocratesResult<bool> {
    let resource_name = validation::non_blank(resource_name, "resource")?;
    let member_id = validation::non_blank(member_id, "member id")?;

    let removed = with_retry(gateway, max_attempts, |store| {
        let resource = resource_mut(store, &resource_name)?;
        if !resource.is_registered(&member_id) {
            return Ok(Change::Skip(false));
        }
        resource.remove_member_id(&member_id);
        Ok(Change::Save(true))
    })?;
    if removed {
        tracing::info!(resource = %resource_name, member = %member_id, "member unregistered");
    }
    Ok(removed)
}

pub fn set_registration_open<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    resource_name: &str,
    open: bool,
) -> SocratesResult<Resource> {
    let resource_name = validation::non_blank(resource_name, "resource")?;
    with_retry(gateway, max_attempts, |store| {
        let resource = resource_mut(store, &resource_name)?;
        resource.set_registration_open(open);
        Ok(Change::Save(resource.clone()))
    })
}

pub fn set_with_waitinglist<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    resource_name: &str,
    with_waitinglist: bool,
) -> SocratesResult<Resource> {
    let resource_name = validation::non_blank(resource_name, "resource")?;
    with_retry(gateway, max_attempts, |store| {
        let resource = resource_mut(store, &resource_name)?;
        resource.set_with_waitinglist(with_waitinglist);
        Ok(Change::Save(resource.clone()))
    })
}

pub fn set_limit<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    resource_name: &str,
    limit: Option<i64>,
) -> SocratesResult<Resource> {
    let resource_name = validation::non_blank(resource_name, "resource")?;
    let limit = validation::optional_positive(limit, "limit")?;
    with_retry(gateway, max_attempts, |store| {
        let resource = resource_mut(store, &resource_name)?;
        resource.set_limit(limit);
        Ok(Change::Save(resource.clone()))
    })
}

/// Adds `target` as a fresh copy of `source`: same limit, no members,
/// registration open, no waitinglist.
pub fn copy_resource<P: Persistence>(
    gateway: &EventStoreGateway<P>,
    max_attempts: u32,
    source_name: &str,
    target_name: &str,
) -> SocratesResult<Resource> {
    let source_name = validation::non_blank(source_name, "resource")?;
    let target_name = validation::non_blank(target_name, "name")?;
    with_retry(gateway, max_attempts, |store| {
        ensure_absent(store, &target_name)?;
        let copy = Resource::copied_from(resource_mut(store, &source_name)?);
        store.add_resource(target_name.clone(), copy.clone());
        Ok(Change::Save(copy))
    })
}

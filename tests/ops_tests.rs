use std::cell::Cell;

use socrates::db::*;
use socrates::error::{SocratesError, SocratesResult};
use socrates::model::*;
use socrates::ops::registration_ops::*;
use socrates::ops::EventStoreGateway;

fn sqlite_gateway() -> EventStoreGateway<SqlitePersistence> {
    EventStoreGateway::new(SqlitePersistence::new(schema::test_connection()))
}

/// Lets another writer slip in a save right before each of the first
/// `remaining` saves passing through.
struct ConcurrentWriter<'a> {
    inner: &'a InMemoryPersistence,
    remaining: Cell<u32>,
}

impl<'a> ConcurrentWriter<'a> {
    fn new(inner: &'a InMemoryPersistence, interruptions: u32) -> Self {
        Self {
            inner,
            remaining: Cell::new(interruptions),
        }
    }
}

impl Persistence for ConcurrentWriter<'_> {
    fn get_by_id(&self, id: &str) -> SocratesResult<Option<StoredDocument>> {
        self.inner.get_by_id(id)
    }

    fn save_with_version(&self, document: &StoredDocument) -> SocratesResult<u64> {
        if self.remaining.get() > 0 {
            self.remaining.set(self.remaining.get() - 1);
            let other = EventStoreGateway::new(self.inner);
            let mut store = other.load_or_create()?;
            let name = format!("other-{}", store.version());
            store.add_resource(name, Resource::create(None));
            other.save_event_store(&mut store)?;
        }
        self.inner.save_with_version(document)
    }
}

fn seeded(persistence: &InMemoryPersistence) {
    let gateway = EventStoreGateway::new(persistence);
    add_resource(&gateway, 1, "single", Some(2)).unwrap();
}

// ==========================================================================
// GATEWAY TESTS
// ==========================================================================

#[test]
fn gateway_roundtrips_through_sqlite() {
    let gateway = sqlite_gateway();
    let mut store = SocratesEventStore::new();
    let mut single = Resource::create(Some(10));
    single.add_member_id("alice");
    single.set_with_waitinglist(true);
    store.add_resource("single", single);

    gateway.save_event_store(&mut store).unwrap();
    gateway.save_event_store(&mut store).unwrap();
    assert_eq!(store.version(), 2);

    let loaded = gateway.get_event_store().unwrap().unwrap();
    assert_eq!(loaded.version(), 2);
    let single = loaded.resource_named("single").unwrap();
    assert_eq!(single.registered_members(), vec!["alice"]);
    assert_eq!(single.limit(), Some(10));
    assert!(single.with_waitinglist());
}

#[test]
fn gateway_rejects_stale_save_in_sqlite() {
    let gateway = sqlite_gateway();
    gateway.save_event_store(&mut SocratesEventStore::new()).unwrap();

    let mut first = gateway.get_event_store().unwrap().unwrap();
    let mut second = gateway.get_event_store().unwrap().unwrap();
    first.add_resource("single", Resource::create(None));
    gateway.save_event_store(&mut first).unwrap();

    second.add_resource("double", Resource::create(None));
    let err = gateway.save_event_store(&mut second).unwrap_err();
    assert!(matches!(
        err,
        SocratesError::VersionConflict { expected: 1, actual: 2, .. }
    ));

    let stored = gateway.get_event_store().unwrap().unwrap();
    assert_eq!(stored.resource_names(), vec!["single"]);
}

#[test]
fn stored_state_uses_underscore_field_names() {
    let gateway = sqlite_gateway();
    let mut store = SocratesEventStore::new();
    store.add_resource("single", Resource::create(Some(1)));
    gateway.save_event_store(&mut store).unwrap();

    let document = gateway
        .persistence()
        .get_by_id(SOCRATES_EVENT_STORE_ID)
        .unwrap()
        .unwrap();
    let single = &document.state["resources"]["single"];
    assert_eq!(single["_limit"], 1);
    assert_eq!(single["_registrationOpen"], true);
    assert_eq!(document.state["schemaVersion"], SCHEMA_VERSION);
}

// ==========================================================================
// REGISTRATION OPS TESTS
// ==========================================================================

#[test]
fn add_resource_creates_open_resource() {
    let gateway = sqlite_gateway();
    let resource = add_resource(&gateway, 3, "  single  ", Some(5)).unwrap();
    assert!(resource.registration_open());
    assert_eq!(resource.limit(), Some(5));

    let store = gateway.get_event_store().unwrap().unwrap();
    assert!(store.resource_named("single").is_some());
}

#[test]
fn add_resource_rejects_blank_name_and_bad_limit() {
    let gateway = sqlite_gateway();
    assert!(matches!(
        add_resource(&gateway, 3, "   ", None),
        Err(SocratesError::BlankField { .. })
    ));
    assert!(matches!(
        add_resource(&gateway, 3, "single", Some(0)),
        Err(SocratesError::NonPositive { .. })
    ));
}

#[test]
fn add_resource_rejects_duplicate_name() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", None).unwrap();
    assert!(matches!(
        add_resource(&gateway, 3, "single", Some(2)),
        Err(SocratesError::AlreadyExists { .. })
    ));
}

#[test]
fn register_until_full() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", Some(2)).unwrap();

    assert_eq!(register_member(&gateway, 3, "single", "alice").unwrap(), RegistrationOutcome::Registered);
    assert_eq!(
        register_member(&gateway, 3, "single", "alice").unwrap(),
        RegistrationOutcome::AlreadyRegistered
    );
    assert_eq!(register_member(&gateway, 3, "single", "bob").unwrap(), RegistrationOutcome::Registered);
    assert_eq!(register_member(&gateway, 3, "single", "carol").unwrap(), RegistrationOutcome::Full);

    let store = gateway.get_event_store().unwrap().unwrap();
    let single = store.resource_named("single").unwrap();
    assert_eq!(single.registered_members(), vec!["alice", "bob"]);
    assert!(single.registration_open());
}

#[test]
fn register_on_closed_resource_is_refused() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", None).unwrap();
    set_registration_open(&gateway, 3, "single", false).unwrap();

    assert_eq!(register_member(&gateway, 3, "single", "alice").unwrap(), RegistrationOutcome::Closed);
}

#[test]
fn register_on_unknown_resource_fails() {
    let gateway = sqlite_gateway();
    assert!(matches!(
        register_member(&gateway, 3, "nowhere", "alice"),
        Err(SocratesError::NotFound { .. })
    ));
}

#[test]
fn register_rejects_blank_member() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", None).unwrap();
    assert!(matches!(
        register_member(&gateway, 3, "single", "  "),
        Err(SocratesError::BlankField { .. })
    ));
}

#[test]
fn unregister_reports_whether_member_was_registered() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", Some(1)).unwrap();
    register_member(&gateway, 3, "single", "alice").unwrap();
    set_registration_open(&gateway, 3, "single", false).unwrap();

    assert!(unregister_member(&gateway, 3, "single", "alice").unwrap());
    assert!(!unregister_member(&gateway, 3, "single", "alice").unwrap());

    let store = gateway.get_event_store().unwrap().unwrap();
    let single = store.resource_named("single").unwrap();
    assert!(single.registered_members().is_empty());
    assert!(!single.registration_open());
}

#[test]
fn padded_member_id_can_be_unregistered_with_same_input() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", None).unwrap();

    assert_eq!(
        register_member(&gateway, 3, "single", " alice ").unwrap(),
        RegistrationOutcome::Registered
    );
    assert!(unregister_member(&gateway, 3, "single", " alice ").unwrap());

    let store = gateway.get_event_store().unwrap().unwrap();
    assert!(store.resource_named("single").unwrap().registered_members().is_empty());
}

#[test]
fn unregister_rejects_blank_member() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", None).unwrap();
    assert!(matches!(
        unregister_member(&gateway, 3, "single", "   "),
        Err(SocratesError::BlankField { .. })
    ));
}

#[test]
fn padded_resource_names_find_the_trimmed_resource() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, " single ", Some(2)).unwrap();

    assert_eq!(
        register_member(&gateway, 3, "  single", "alice").unwrap(),
        RegistrationOutcome::Registered
    );
    assert!(unregister_member(&gateway, 3, "single  ", "alice").unwrap());
    assert!(!set_registration_open(&gateway, 3, " single ", false).unwrap().registration_open());
    assert!(set_with_waitinglist(&gateway, 3, " single ", true).unwrap().with_waitinglist());
    assert_eq!(set_limit(&gateway, 3, " single ", Some(4)).unwrap().limit(), Some(4));
    assert_eq!(copy_resource(&gateway, 3, " single ", "double").unwrap().limit(), Some(4));
}

#[test]
fn blank_resource_name_is_rejected() {
    let gateway = sqlite_gateway();
    assert!(matches!(
        register_member(&gateway, 3, "  ", "alice"),
        Err(SocratesError::BlankField { .. })
    ));
    assert!(matches!(
        set_limit(&gateway, 3, "", Some(1)),
        Err(SocratesError::BlankField { .. })
    ));
}

#[test]
fn unregister_without_change_does_not_bump_version() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", None).unwrap();
    let before = gateway.get_event_store().unwrap().unwrap().version();

    unregister_member(&gateway, 3, "single", "ghost").unwrap();
    assert_eq!(gateway.get_event_store().unwrap().unwrap().version(), before);
}

#[test]
fn set_limit_and_waitinglist() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", None).unwrap();

    let resource = set_limit(&gateway, 3, "single", Some(4)).unwrap();
    assert_eq!(resource.limit(), Some(4));
    let resource = set_limit(&gateway, 3, "single", None).unwrap();
    assert_eq!(resource.limit(), None);
    assert!(set_limit(&gateway, 3, "single", Some(-2)).is_err());

    let resource = set_with_waitinglist(&gateway, 3, "single", true).unwrap();
    assert!(resource.with_waitinglist());
}

#[test]
fn copy_resource_adds_reset_copy() {
    let gateway = sqlite_gateway();
    add_resource(&gateway, 3, "single", Some(1)).unwrap();
    register_member(&gateway, 3, "single", "alice").unwrap();
    set_registration_open(&gateway, 3, "single", false).unwrap();
    set_with_waitinglist(&gateway, 3, "single", true).unwrap();

    let copy = copy_resource(&gateway, 3, "single", "single-2025").unwrap();
    assert!(copy.registered_members().is_empty());
    assert_eq!(copy.limit(), Some(1));
    assert!(copy.registration_open());
    assert!(!copy.with_waitinglist());

    let store = gateway.get_event_store().unwrap().unwrap();
    assert_eq!(
        store.resource_named("single").unwrap().registered_members(),
        vec!["alice"]
    );
    assert!(matches!(
        copy_resource(&gateway, 3, "single", "single-2025"),
        Err(SocratesError::AlreadyExists { .. })
    ));
}

// ==========================================================================
// OPTIMISTIC RETRY TESTS
// ==========================================================================

#[test]
fn registration_retries_after_concurrent_save() {
    let persistence = InMemoryPersistence::new();
    seeded(&persistence);
    let gateway = EventStoreGateway::new(ConcurrentWriter::new(&persistence, 2));

    let outcome = register_member(&gateway, 3, "single", "alice").unwrap();
    assert_eq!(outcome, RegistrationOutcome::Registered);

    let store = EventStoreGateway::new(&persistence)
        .get_event_store()
        .unwrap()
        .unwrap();
    assert_eq!(store.resource_named("single").unwrap().registered_members(), vec!["alice"]);
    // Both interfering writes survived.
    assert_eq!(store.resource_names().len(), 3);
}

#[test]
fn registration_gives_up_when_attempts_run_out() {
    let persistence = InMemoryPersistence::new();
    seeded(&persistence);
    let gateway = EventStoreGateway::new(ConcurrentWriter::new(&persistence, 1));

    let err = register_member(&gateway, 1, "single", "alice").unwrap_err();
    assert!(err.is_version_conflict());

    let store = EventStoreGateway::new(&persistence)
        .get_event_store()
        .unwrap()
        .unwrap();
    assert!(store.resource_named("single").unwrap().registered_members().is_empty());
}

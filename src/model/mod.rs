pub mod member;
pub mod resource;
pub mod snapshot;
pub mod event_store;

// Re-exports for convenience
pub use member::{MemberId, MemberRegistration};
pub use resource::Resource;
pub use snapshot::{EventStoreState, RegistrationSnapshot, ResourceSnapshot, SCHEMA_VERSION};
pub use event_store::{SocratesEventStore, SOCRATES_EVENT_STORE_ID};

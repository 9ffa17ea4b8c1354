pub mod schema;
pub mod persistence;
pub mod eventstore_repo;
pub mod memory_persistence;

pub use eventstore_repo::SqlitePersistence;
pub use memory_persistence::InMemoryPersistence;
pub use persistence::{Persistence, StoredDocument};

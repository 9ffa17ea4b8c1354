pub mod eventstore_ops;
pub mod registration_ops;

pub use eventstore_ops::EventStoreGateway;
pub use registration_ops::RegistrationOutcome;

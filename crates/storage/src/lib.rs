#![forbid(unsafe_code)]

pub mod attempt_store;
pub mod repository;
pub mod sqlite;

pub use attempt_store::{AttemptStore, RawAttemptEntries};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};

//! JSON-file backed CRUD service for log records.
//!
//! The persistence core (entities, schema validation, the generic repository
//! and the file-backed datastore) is always compiled. The HTTP layer lives
//! behind the `server` feature.

pub mod entity;
pub mod repository;
pub mod schema;
pub mod store;

// Server-side modules (only compiled with server feature)
#[cfg(feature = "server")]
pub mod server;

pub use entity::{Entity, EntityKind, Log, LogDto};
pub use repository::{Repository, RepositoryError};
pub use schema::{FieldError, FieldRule, JsonKind, Schema, ValidationErrors};
pub use store::{Datastore, Document, StoreError};

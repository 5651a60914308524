//! Document record store.
//!
//! Records are JSON documents grouped into named collections. Collections
//! must be registered in a [`CollectionRegistry`] before use; the registry
//! also declares which top-level fields are unique within a collection.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod registry;
pub mod store;

pub use common::RecordId;
pub use document::Document;
pub use error::{RecordStoreError, Result};
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use query::Filter;
pub use record::{Record, Stored};
pub use registry::{CollectionRegistry, CollectionSchema};
pub use store::{RecordStore, RecordStoreExt};

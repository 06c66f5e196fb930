//! # movecodec-registry
//!
//! Schema registry for movecodec.
//!
//! Type definitions arrive as YAML catalogs (the layout metadata a
//! chain module publishes for its on-chain types) and are frozen into
//! an in-memory [`Registry`] that implements the `SchemaResolver`
//! trait from `movecodec-core`. The registry also offers direct
//! serialize/deserialize entry points addressed by type name.

pub mod catalog;
pub mod memory;

pub use catalog::{CatalogParser, TypeEntry};
pub use memory::{Registry, RegistryBuilder};

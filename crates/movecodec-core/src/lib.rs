//! # movecodec-core
//!
//! Schema-driven BCS (Binary Canonical Serialization) engine. A
//! [`Schema`] describes a type's wire layout; [`serialize`] walks it
//! alongside a [`Value`] tree to produce canonical bytes, and
//! [`deserialize`] walks it against a byte cursor with strict
//! canonical-form validation (no trailing bytes, minimal ULEB128
//! encodings, exact fixed widths, bounded recursion).
//!
//! Named schema definitions are resolved through the [`SchemaResolver`]
//! trait; the concrete registry lives in `movecodec-registry`.

pub mod config;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod schema;
pub mod uleb;
pub mod value;

pub use config::CodecConfig;
pub use cursor::Cursor;
pub use decode::{deserialize, deserialize_with};
pub use encode::{serialize, serialize_with};
pub use error::{CodecError, RegistryError};
pub use schema::{EmptyResolver, PrimitiveKind, Schema, SchemaResolver};
pub use value::Value;

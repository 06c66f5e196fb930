//! In-memory `SchemaResolver` implementation.
//!
//! A [`Registry`] is built once from a fixed catalog of type definitions
//! and is read-only afterwards — resolution never mutates the base
//! definitions. Instantiations of generic definitions are memoized in a
//! cache keyed by `(name, type arguments)`.

use crate::catalog::CatalogParser;
use movecodec_core::{
    config::CodecConfig,
    error::{CodecError, RegistryError},
    schema::{Schema, SchemaResolver},
    value::Value,
};
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};

/// A registered schema constructor: a layout body (possibly containing
/// `TypeParam` placeholders) plus its declared parameter count.
#[derive(Debug, Clone, PartialEq)]
struct Constructor {
    params: usize,
    body: Schema,
}

/// Accumulates type definitions, then freezes them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: HashMap<String, Constructor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named schema constructor.
    ///
    /// `params` is the number of type parameters the body may reference
    /// via `Schema::TypeParam` (0 for ordinary types). Registering the
    /// same name twice with a different definition is a programmer
    /// error and fails with `AlreadyExists`; re-registering an identical
    /// definition is accepted as idempotent.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        params: usize,
        body: Schema,
    ) -> Result<&mut Self, RegistryError> {
        let name = name.into();
        let ctor = Constructor { params, body };
        match self.types.get(&name) {
            Some(existing) if *existing != ctor => {
                Err(RegistryError::AlreadyExists { name })
            }
            _ => {
                self.types.insert(name, ctor);
                Ok(self)
            }
        }
    }

    /// Register every type from a YAML catalog document.
    /// Returns the number of types loaded.
    pub fn load_catalog_str(&mut self, yaml: &str) -> Result<usize, RegistryError> {
        let entries = CatalogParser::parse_all(yaml)?;
        let count = entries.len();
        for entry in entries {
            self.register(entry.name, entry.params, entry.schema)?;
        }
        Ok(count)
    }

    /// Register every type from a YAML catalog file.
    pub fn load_catalog_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        self.load_catalog_str(&content)
    }

    /// Freeze the accumulated definitions into an immutable registry.
    pub fn build(self) -> Registry {
        Registry {
            types: Arc::new(self.types),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Thread-safe, read-only schema registry.
///
/// Cheap to clone; clones share the definitions and the instantiation
/// cache.
#[derive(Debug, Clone)]
pub struct Registry {
    types: Arc<HashMap<String, Constructor>>,
    /// Memoized generic instantiations, keyed by (name, type args).
    cache: Arc<RwLock<HashMap<(String, Vec<Schema>), Schema>>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Number of registered type definitions.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    /// Serialize `value` as the registered type `name` applied to
    /// `type_args`.
    pub fn serialize(
        &self,
        name: &str,
        type_args: &[Schema],
        value: &Value,
    ) -> Result<Vec<u8>, CodecError> {
        movecodec_core::serialize(self, &Self::named(name, type_args), value)
    }

    /// Serialize with explicit limits.
    pub fn serialize_with(
        &self,
        name: &str,
        type_args: &[Schema],
        value: &Value,
        config: &CodecConfig,
    ) -> Result<Vec<u8>, CodecError> {
        movecodec_core::serialize_with(self, &Self::named(name, type_args), value, config)
    }

    /// Deserialize `bytes` as the registered type `name` applied to
    /// `type_args`. The input must be consumed exactly.
    pub fn deserialize(
        &self,
        name: &str,
        type_args: &[Schema],
        bytes: &[u8],
    ) -> Result<Value, CodecError> {
        movecodec_core::deserialize(self, &Self::named(name, type_args), bytes)
    }

    /// Deserialize with explicit limits.
    pub fn deserialize_with(
        &self,
        name: &str,
        type_args: &[Schema],
        bytes: &[u8],
        config: &CodecConfig,
    ) -> Result<Value, CodecError> {
        movecodec_core::deserialize_with(self, &Self::named(name, type_args), bytes, config)
    }

    fn named(name: &str, type_args: &[Schema]) -> Schema {
        Schema::Named {
            name: name.to_string(),
            type_args: type_args.to_vec(),
        }
    }
}

impl SchemaResolver for Registry {
    fn resolve(&self, name: &str, type_args: &[Schema]) -> Result<Schema, CodecError> {
        let ctor = self
            .types
            .get(name)
            .ok_or_else(|| CodecError::UnknownSchema {
                name: name.to_string(),
            })?;
        if type_args.len() != ctor.params {
            return Err(CodecError::ArityMismatch {
                name: name.to_string(),
                expected: ctor.params,
                got: type_args.len(),
            });
        }

        // Ordinary types need no substitution and no cache entry.
        if ctor.params == 0 {
            return Ok(ctor.body.clone());
        }

        let key = (name.to_string(), type_args.to_vec());
        if let Some(hit) = self.cache.read().unwrap().get(&key) {
            return Ok(hit.clone());
        }
        let resolved = ctor.body.substitute(type_args)?;
        self.cache
            .write()
            .unwrap()
            .insert(key, resolved.clone());
        Ok(resolved)
    }
}

//! Resource definitions and the library that resolves names to them.
//!
//! A converter refers to resources by name in its definition strings. The
//! library turns those names into [`ResourceDefinition`]s; names it does not
//! know are treated as unparseable and skipped by the ratio parser.

use serde::{Deserialize, Serialize};

use crate::constants::resource_names;

/// Numeric resource identifier, unique within a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// How a resource is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Stored in tanks; governed only by the general elapsed-time clamp.
    Bulk,
    /// Buffered/capacitive delivery with its own, tighter per-tick cap.
    Electric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub id: ResourceId,
    pub name: String,
    pub kind: ResourceKind,
}

impl ResourceDefinition {
    pub fn is_electric(&self) -> bool {
        self.kind == ResourceKind::Electric
    }
}

/// Name-indexed set of known resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceLibrary {
    definitions: Vec<ResourceDefinition>,
}

impl ResourceLibrary {
    /// An empty library; every lookup fails until resources are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library with `ElectricCharge` and the stock bulk resources.
    pub fn stock() -> Self {
        let mut library = Self::new();
        library.register(resource_names::ELECTRIC_CHARGE, ResourceKind::Electric);
        for name in resource_names::BULK {
            library.register(name, ResourceKind::Bulk);
        }
        library
    }

    /// Register a resource, returning its definition. Re-registering a name
    /// returns the existing definition unchanged.
    pub fn register(&mut self, name: &str, kind: ResourceKind) -> ResourceDefinition {
        if let Some(existing) = self.get(name) {
            return existing.clone();
        }
        let definition = ResourceDefinition {
            id: ResourceId(self.definitions.len() as u32),
            name: name.to_string(),
            kind,
        };
        self.definitions.push(definition.clone());
        definition
    }

    /// Look up a resource by exact name.
    pub fn get(&self, name: &str) -> Option<&ResourceDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn by_id(&self, id: ResourceId) -> Option<&ResourceDefinition> {
        self.definitions.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.definitions.iter()
    }
}

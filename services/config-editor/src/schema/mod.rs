//! Schema registry: static metadata for every entity kind
//!
//! The registry is immutable once built. It is the only place kind strings
//! are checked, so every other component resolves kinds through
//! [`SchemaRegistry::describe`].

pub mod property;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use property::{EnumOption, FieldConstraints, PropertyDescriptor, PropertyType, ValueError};

use crate::config::SchemaConfig;
use crate::error::{ConfigEditorError, Result};

/// Property that identifies templates, in place of the kind's key property
pub const TEMPLATE_KEY: &str = "name";

const BUILTIN_SCHEMA: &str = include_str!("builtin.json");

/// Metadata describing one entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDescriptor {
    pub id: String,
    pub display_name: String,
    pub plural_display_name: String,
    pub description: String,
    pub key_property: String,
    pub properties: Vec<PropertyDescriptor>,
    pub default_columns: Vec<String>,
}

impl EntityTypeDescriptor {
    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Property acting as identity for instances or templates of this kind
    pub fn identity_property(&self, is_template: bool) -> &str {
        if is_template {
            TEMPLATE_KEY
        } else {
            &self.key_property
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(ConfigEditorError::Schema(format!(
                    "Kind '{}' declares property '{}' twice",
                    self.id, property.name
                )));
            }
        }

        match self.property(&self.key_property) {
            Some(key) if key.property_type == PropertyType::Shortname => {}
            Some(key) => {
                return Err(ConfigEditorError::Schema(format!(
                    "Key property '{}' of kind '{}' must be a shortname, not '{}'",
                    self.key_property, self.id, key.property_type
                )))
            }
            None => {
                return Err(ConfigEditorError::Schema(format!(
                    "Key property '{}' of kind '{}' is not declared",
                    self.key_property, self.id
                )))
            }
        }

        if let Some(column) = self.default_columns.iter().find(|c| !self.has_property(c)) {
            return Err(ConfigEditorError::Schema(format!(
                "Default column '{}' of kind '{}' is not a declared property",
                column, self.id
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    types: Vec<EntityTypeDescriptor>,
}

/// Immutable registry of entity kinds
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    types: Vec<Arc<EntityTypeDescriptor>>,
}

impl SchemaRegistry {
    /// Build a registry, checking every descriptor invariant
    pub fn new(descriptors: Vec<EntityTypeDescriptor>) -> Result<Self> {
        let mut ids = HashSet::new();
        for descriptor in &descriptors {
            if !ids.insert(descriptor.id.clone()) {
                return Err(ConfigEditorError::Schema(format!(
                    "Kind '{}' is registered twice",
                    descriptor.id
                )));
            }
            descriptor.validate()?;
        }

        tracing::debug!("Schema registry built with {} kinds", descriptors.len());
        Ok(Self {
            types: descriptors.into_iter().map(Arc::new).collect(),
        })
    }

    /// Registry for the monitoring engine's object kinds, from embedded metadata
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SCHEMA)
    }

    /// Parse a registry from its JSON form (`{"types": [...]}`)
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(json)?;
        Self::new(file.types)
    }

    /// Load a registry from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigEditorError::Config(format!("Failed to read schema file {:?}: {}", path, e))
        })?;
        Self::from_json(&content)
    }

    /// Registry named by the configuration: the schema file if one is set, else the built-in one
    pub fn from_config(config: &SchemaConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// Look up the descriptor of a kind
    pub fn describe(&self, kind: &str) -> Result<&Arc<EntityTypeDescriptor>> {
        self.types
            .iter()
            .find(|t| t.id == kind)
            .ok_or_else(|| ConfigEditorError::SchemaNotFound(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t.id == kind)
    }

    /// Registered kind ids, in registration order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|t| t.id.as_str())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<EntityTypeDescriptor>> {
        self.types.iter()
    }
}

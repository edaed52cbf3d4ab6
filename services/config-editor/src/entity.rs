//! Configuration entity: one server record under edit
//!
//! The entity keeps the current attribute values and records every attribute
//! touched since load, so [`ConfigurationEntity::export`] only carries what
//! the user actually changed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigEditorError, Result};
use crate::links::RowIdentity;
use crate::router::ViewTarget;
use crate::schema::{EntityTypeDescriptor, SchemaRegistry, TEMPLATE_KEY};
use crate::values::{join_multi_value, AttributeMap};

/// Key of the metadata envelope inside server records
pub const META_KEY: &str = "meta";

/// Server-computed metadata of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub object_type: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub inherited_attributes: AttributeMap,
}

/// A recorded edit of one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Set(Value),
    Removed,
}

impl Change {
    /// Wire form: the new value, or null for a removal
    pub fn to_value(&self) -> Value {
        match self {
            Change::Set(value) => value.clone(),
            Change::Removed => Value::Null,
        }
    }
}

/// Result of [`ConfigurationEntity::set_attribute`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SetOutcome {
    /// The attribute value actually changed
    pub changed: bool,
    /// The attribute is not declared by the kind's descriptor
    pub unknown_attribute: bool,
}

/// Metadata block of a diff payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffMeta {
    pub object_type: String,
    pub id: Option<Value>,
    pub name: Option<Value>,
}

/// Minimal payload describing an edit, ready to be sent back to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffPayload {
    pub meta: DiffMeta,
    #[serde(flatten)]
    pub changes: BTreeMap<String, Value>,
}

impl DiffPayload {
    /// True when the payload carries no change and there is nothing to submit
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Normalize setter input: absent, null and empty values are removals and
/// lists take the server's comma-joined form
fn normalize(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let joined = join_multi_value(&items);
            if joined.is_empty() {
                None
            } else {
                Some(Value::String(joined))
            }
        }
        other => Some(other),
    }
}

/// One entity record under edit
#[derive(Debug, Clone)]
pub struct ConfigurationEntity {
    descriptor: Arc<EntityTypeDescriptor>,
    attributes: AttributeMap,
    meta: RecordMeta,
    dirty: bool,
    changes: BTreeMap<String, Change>,
    /// View the record was loaded from; edits never move it
    target: ViewTarget,
    /// Identity value as loaded
    loaded_id: Option<Value>,
    /// Address of the record on the server, as loaded
    origin: Option<RowIdentity>,
}

impl ConfigurationEntity {
    pub fn new(
        descriptor: Arc<EntityTypeDescriptor>,
        attributes: AttributeMap,
        meta: RecordMeta,
    ) -> Self {
        let target = ViewTarget::new(
            meta.object_type.clone(),
            attributes.contains_key(TEMPLATE_KEY),
        );
        let loaded_id = attributes
            .get(descriptor.identity_property(target.is_template))
            .cloned();
        let origin = RowIdentity::from_row(&target, &descriptor, &attributes);
        Self {
            descriptor,
            attributes,
            meta,
            dirty: false,
            changes: BTreeMap::new(),
            target,
            loaded_id,
            origin,
        }
    }

    /// Build an entity from a raw server record, splitting out its `meta` envelope
    pub fn from_record(registry: &SchemaRegistry, record: Value) -> Result<Self> {
        let Value::Object(mut attributes) = record else {
            return Err(ConfigEditorError::InvalidRecord(
                "record is not a JSON object".to_string(),
            ));
        };
        let meta = attributes.remove(META_KEY).ok_or_else(|| {
            ConfigEditorError::InvalidRecord("record has no meta envelope".to_string())
        })?;
        let meta: RecordMeta = serde_json::from_value(meta)?;
        let descriptor = Arc::clone(registry.describe(&meta.object_type)?);

        tracing::debug!(
            "Loaded {} record from {:?} with {} attributes",
            meta.object_type,
            meta.filename,
            attributes.len()
        );
        Ok(Self::new(descriptor, attributes, meta))
    }

    /// Current value of an attribute, after edits
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Value inherited from the template chain, independent of edits
    pub fn inherited_attribute(&self, name: &str) -> Option<&Value> {
        self.meta.inherited_attributes.get(name)
    }

    /// Own value if set, otherwise the inherited one
    pub fn effective_attribute(&self, name: &str) -> Option<&Value> {
        self.attribute(name)
            .or_else(|| self.inherited_attribute(name))
    }

    /// Set an attribute; `None`, null and empty values remove it
    pub fn set_attribute(&mut self, name: &str, value: Option<Value>) -> SetOutcome {
        let value = normalize(value);
        let unknown_attribute = name != TEMPLATE_KEY && !self.descriptor.has_property(name);

        if self.attributes.get(name) == value.as_ref() {
            return SetOutcome {
                changed: false,
                unknown_attribute,
            };
        }

        if unknown_attribute {
            tracing::warn!(
                "Attribute '{}' is not part of the {} schema",
                name,
                self.descriptor.id
            );
        }

        match value {
            Some(value) => {
                self.attributes.insert(name.to_string(), value.clone());
                self.changes.insert(name.to_string(), Change::Set(value));
            }
            None => {
                self.attributes.remove(name);
                self.changes.insert(name.to_string(), Change::Removed);
            }
        }
        self.dirty = true;

        SetOutcome {
            changed: true,
            unknown_attribute,
        }
    }

    /// Names of the attributes currently present
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Templates carry a `name` attribute
    pub fn is_template(&self) -> bool {
        self.attributes.contains_key(TEMPLATE_KEY)
    }

    /// Value identifying this record: `name` for templates, the key property otherwise
    pub fn identity(&self) -> Option<&Value> {
        self.attribute(self.descriptor.identity_property(self.is_template()))
    }

    /// Build the diff payload from the recorded changes
    ///
    /// `meta.id` is the identity the record was loaded with, so a renamed
    /// record is still addressed by its old name.
    pub fn export(&self) -> DiffPayload {
        DiffPayload {
            meta: DiffMeta {
                object_type: self.meta.object_type.clone(),
                id: self.loaded_id.clone(),
                name: self.attribute(TEMPLATE_KEY).cloned(),
            },
            changes: self
                .changes
                .iter()
                .map(|(name, change)| (name.clone(), change.to_value()))
                .collect(),
        }
    }

    /// View the record was loaded from, unaffected by edits to `name`
    pub fn target(&self) -> &ViewTarget {
        &self.target
    }

    /// Server address of the record as loaded, unaffected by renames
    pub fn origin(&self) -> Option<&RowIdentity> {
        self.origin.as_ref()
    }

    pub fn object_type(&self) -> &str {
        &self.meta.object_type
    }

    pub fn filename(&self) -> Option<&str> {
        self.meta.filename.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn changes(&self) -> &BTreeMap<String, Change> {
        &self.changes
    }

    pub fn descriptor(&self) -> &EntityTypeDescriptor {
        &self.descriptor
    }
}

/*!
 * Named properties attached to resources.
 *
 * Properties carry the non-translatable values a skeleton may need to
 * re-emit (a `lang` attribute, an encoding declaration, a link target).
 * They exist at three levels: on the resource itself, on its source, and
 * on each of its targets.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::locale::LocaleId;

/// Property holding the document language
pub const LANGUAGE: &str = "language";
/// Property holding the document encoding
pub const ENCODING: &str = "encoding";

/// One named value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Current value
    pub value: String,
    /// Read-only properties are informational and should not be edited
    #[serde(default)]
    pub read_only: bool,
}

impl Property {
    /// Create an editable property
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            read_only: false,
        }
    }

    /// Create a read-only property
    pub fn read_only(name: &str, value: &str) -> Self {
        Self {
            read_only: true,
            ..Self::new(name, value)
        }
    }
}

/// Properties keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTable(BTreeMap<String, Property>);

impl PropertyTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property; returns the previous one
    pub fn set(&mut self, property: Property) -> Option<Property> {
        self.0.insert(property.name.clone(), property)
    }

    /// Look up a property
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.0.get(name)
    }

    /// Look up a property for editing
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.0.get_mut(name)
    }

    /// Remove a property
    pub fn remove(&mut self, name: &str) -> Option<Property> {
        self.0.remove(name)
    }

    /// Property names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Which level of a resource a property lookup addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyScope {
    /// The resource itself
    Resource,
    /// The source language level
    Source,
    /// A target language level, falling back to the source
    Target(LocaleId),
}

/// Properties of a non-text resource at all three levels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySet {
    /// Resource-level properties
    pub resource: PropertyTable,
    /// Source-level properties
    pub source: PropertyTable,
    /// Target-level properties per locale
    pub targets: BTreeMap<LocaleId, PropertyTable>,
}

impl PropertySet {
    /// Properties of one target locale, created on demand
    pub fn target_mut(&mut self, locale: &LocaleId) -> &mut PropertyTable {
        self.targets.entry(locale.clone()).or_default()
    }
}

/// Anything a value placeholder can read properties from
pub trait PropertyHolder {
    /// Resource-level properties
    fn resource_properties(&self) -> &PropertyTable;

    /// Source-level properties
    fn source_properties(&self) -> &PropertyTable;

    /// Target-level properties for one locale
    fn target_properties(&self, locale: &LocaleId) -> Option<&PropertyTable>;

    /// Resolve a property in a scope; target lookups fall back to the source.
    /// The flag tells whether the value came from the source or resource level.
    fn lookup_property(&self, name: &str, scope: &PropertyScope) -> Option<(&Property, bool)> {
        match scope {
            PropertyScope::Resource => self.resource_properties().get(name).map(|p| (p, true)),
            PropertyScope::Source => self.source_properties().get(name).map(|p| (p, true)),
            PropertyScope::Target(locale) => self
                .target_properties(locale)
                .and_then(|t| t.get(name))
                .map(|p| (p, false))
                .or_else(|| self.source_properties().get(name).map(|p| (p, true))),
        }
    }
}

impl PropertyHolder for PropertySet {
    fn resource_properties(&self) -> &PropertyTable {
        &self.resource
    }

    fn source_properties(&self) -> &PropertyTable {
        &self.source
    }

    fn target_properties(&self, locale: &LocaleId) -> Option<&PropertyTable> {
        self.targets.get(locale)
    }
}

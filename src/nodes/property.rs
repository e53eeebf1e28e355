//! Enumerated node properties
//!
//! An enum property keeps three things apart: the persisted identifier
//! (`"MIN"`), the display label (`"Minimum"`) and an explicit integer tag.
//! Documents store the identifier only. Labels are free to change.

use super::interface::NodeData;

/// One legal value of an enumerated property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumItem {
    /// Stable identifier written to documents
    pub identifier: &'static str,
    /// Display label
    pub name: &'static str,
    pub description: &'static str,
    /// Explicit numeric tag, stable across versions
    pub value: i32,
}

impl EnumItem {
    pub const fn new(identifier: &'static str, name: &'static str, value: i32) -> Self {
        Self {
            identifier,
            name,
            description: "",
            value,
        }
    }
}

/// Rust enums that back an enumerated node property
pub trait EnumProperty: Copy + PartialEq + Default + 'static {
    /// Every legal value, in menu order
    const ALL: &'static [Self];

    fn item(&self) -> EnumItem;

    fn identifier(&self) -> &'static str {
        self.item().identifier
    }

    fn label(&self) -> &'static str {
        self.item().name
    }

    fn value(&self) -> i32 {
        self.item().value
    }

    fn from_identifier(identifier: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.identifier() == identifier)
    }

    fn from_value(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.value() == value)
    }

    fn items() -> Vec<EnumItem> {
        Self::ALL.iter().map(|v| v.item()).collect()
    }
}

/// Schema of an enumerated property declared by a node type
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Parameter key on the node instance
    pub identifier: &'static str,
    /// Display name
    pub name: &'static str,
    pub items: Vec<EnumItem>,
    /// Identifier of the value new nodes start with
    pub default: &'static str,
}

impl PropertyDefinition {
    /// Build a definition from an [`EnumProperty`] type
    pub fn from_enum<E: EnumProperty>(identifier: &'static str, name: &'static str) -> Self {
        Self {
            identifier,
            name,
            items: E::items(),
            default: E::default().identifier(),
        }
    }

    /// Look up an item by its identifier
    pub fn item(&self, identifier: &str) -> Option<&EnumItem> {
        self.items.iter().find(|item| item.identifier == identifier)
    }

    /// Value new node instances are initialised with
    pub fn default_value(&self) -> NodeData {
        NodeData::Enum(self.default.to_string())
    }

    /// Whether `value` is one of the legal identifiers
    pub fn accepts(&self, value: &NodeData) -> bool {
        value.as_enum().is_some_and(|identifier| self.item(identifier).is_some())
    }
}

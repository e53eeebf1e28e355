//! The Float Math operation enum
//!
//! Identifiers and tags are persisted in documents and must never change.
//! New operations are appended with fresh identifiers and tags.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::nodes::property::{EnumItem, EnumProperty};

/// Arithmetic operation selected on a Float Math node
///
/// The operation is an opaque tag here. Evaluating it is the graph
/// engine's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloatMathOperation {
    #[default]
    Add,
    Multiply,
    Min,
    Max,
}

impl EnumProperty for FloatMathOperation {
    const ALL: &'static [Self] = &[
        FloatMathOperation::Add,
        FloatMathOperation::Multiply,
        FloatMathOperation::Min,
        FloatMathOperation::Max,
    ];

    fn item(&self) -> EnumItem {
        match self {
            FloatMathOperation::Add => EnumItem::new("ADD", "Add", 1),
            FloatMathOperation::Multiply => EnumItem::new("MULTIPLY", "Multiply", 2),
            FloatMathOperation::Min => EnumItem::new("MIN", "Minimum", 3),
            FloatMathOperation::Max => EnumItem::new("MAX", "Maximum", 4),
        }
    }
}

impl fmt::Display for FloatMathOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Persisted by identifier, never by label
impl Serialize for FloatMathOperation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.identifier())
    }
}

impl<'de> Deserialize<'de> for FloatMathOperation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let identifier = String::deserialize(deserializer)?;
        FloatMathOperation::from_identifier(&identifier).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown float math operation `{}`", identifier))
        })
    }
}
